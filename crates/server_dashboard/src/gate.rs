//! Enablement gate shared by every outbound path.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Process-wide on/off switch for all dashboard traffic.
///
/// Clones share the same flag. Readers see a toggle on their next check,
/// requests already handed to the dispatcher are not recalled.
#[derive(Debug, Clone)]
pub struct EnablementGate {
    enabled: Arc<AtomicBool>,
}

impl EnablementGate {
    /// Creates a gate in the enabled state.
    pub fn new() -> Self {
        Self::with_state(true)
    }

    pub fn with_state(enabled: bool) -> Self {
        Self {
            enabled: Arc::new(AtomicBool::new(enabled)),
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled.load(Ordering::Acquire)
    }

    pub fn set(&self, enabled: bool) {
        self.enabled.store(enabled, Ordering::Release);
    }

    pub fn disable(&self) {
        self.set(false);
    }

    /// Flips the gate and returns the new state.
    pub fn toggle(&self) -> bool {
        !self.enabled.fetch_xor(true, Ordering::AcqRel)
    }
}

impl Default for EnablementGate {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_enabled() {
        assert!(EnablementGate::new().is_enabled());
        assert!(EnablementGate::default().is_enabled());
        assert!(!EnablementGate::with_state(false).is_enabled());
    }

    #[test]
    fn test_toggle_twice_restores_state() {
        for initial in [true, false] {
            let gate = EnablementGate::with_state(initial);
            assert_eq!(gate.toggle(), !initial);
            assert_eq!(gate.toggle(), initial);
            assert_eq!(gate.is_enabled(), initial);
        }
    }

    #[test]
    fn test_clones_share_state() {
        let gate = EnablementGate::new();
        let reader = gate.clone();

        gate.disable();
        assert!(!reader.is_enabled());

        reader.set(true);
        assert!(gate.is_enabled());
    }
}
