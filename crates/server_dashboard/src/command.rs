//! The `sd-toggle` admin command.
//!
//! * `sd-toggle` flips the enablement gate
//! * `sd-toggle on` / `sd-toggle off` set it explicitly (case-insensitive)

use crate::gate::EnablementGate;
use tracing::info;

/// Name the host registers the command under.
pub const TOGGLE_COMMAND: &str = "sd-toggle";

pub const ENABLED_MESSAGE: &str = "Enabled ServerDashboard";
pub const DISABLED_MESSAGE: &str = "Disabled ServerDashboard";
pub const USAGE_MESSAGE: &str = "Usage: /sd-toggle [on|off]";

/// What an invocation of `sd-toggle` asks for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToggleAction {
    Toggle,
    Set(bool),
}

impl ToggleAction {
    /// Parses command arguments. Returns `None` for anything other than no
    /// argument, `on` or `off`.
    pub fn parse<S: AsRef<str>>(args: &[S]) -> Option<Self> {
        match args.first() {
            None => Some(Self::Toggle),
            Some(arg) => match arg.as_ref().to_ascii_lowercase().as_str() {
                "on" => Some(Self::Set(true)),
                "off" => Some(Self::Set(false)),
                _ => None,
            },
        }
    }
}

/// Result of running the command, shown to whoever issued it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandOutcome {
    pub enabled: bool,
    pub message: &'static str,
}

/// Runs `sd-toggle` with the given arguments against the gate.
pub fn execute_toggle<S: AsRef<str>>(gate: &EnablementGate, args: &[S]) -> CommandOutcome {
    let enabled = match ToggleAction::parse(args) {
        Some(ToggleAction::Toggle) => gate.toggle(),
        Some(ToggleAction::Set(state)) => {
            gate.set(state);
            state
        }
        None => {
            return CommandOutcome {
                enabled: gate.is_enabled(),
                message: USAGE_MESSAGE,
            }
        }
    };

    info!("🎛️ ServerDashboard {} by admin command", if enabled { "enabled" } else { "disabled" });

    CommandOutcome {
        enabled,
        message: if enabled { ENABLED_MESSAGE } else { DISABLED_MESSAGE },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_arguments() {
        let none: [&str; 0] = [];
        assert_eq!(ToggleAction::parse(&none), Some(ToggleAction::Toggle));
        assert_eq!(ToggleAction::parse(&["ON"]), Some(ToggleAction::Set(true)));
        assert_eq!(ToggleAction::parse(&["Off"]), Some(ToggleAction::Set(false)));
        assert_eq!(ToggleAction::parse(&["maybe"]), None);
    }

    #[test]
    fn test_toggle_without_arguments() {
        let gate = EnablementGate::new();
        let none: [&str; 0] = [];

        let outcome = execute_toggle(&gate, &none);
        assert!(!outcome.enabled);
        assert_eq!(outcome.message, DISABLED_MESSAGE);

        let outcome = execute_toggle(&gate, &none);
        assert!(outcome.enabled);
        assert_eq!(outcome.message, ENABLED_MESSAGE);
        assert!(gate.is_enabled());
    }

    #[test]
    fn test_explicit_on_off() {
        let gate = EnablementGate::new();

        let outcome = execute_toggle(&gate, &["off"]);
        assert_eq!(outcome, CommandOutcome { enabled: false, message: DISABLED_MESSAGE });

        // Setting the same state twice is not a toggle
        let outcome = execute_toggle(&gate, &["OFF"]);
        assert!(!outcome.enabled);

        let outcome = execute_toggle(&gate, &["on".to_string()]);
        assert!(outcome.enabled);
        assert!(gate.is_enabled());
    }

    #[test]
    fn test_unknown_argument_keeps_state() {
        let gate = EnablementGate::with_state(false);
        let outcome = execute_toggle(&gate, &["status"]);

        assert_eq!(outcome.message, USAGE_MESSAGE);
        assert!(!outcome.enabled);
        assert!(!gate.is_enabled());
    }
}
