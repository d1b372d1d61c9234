//! Operator console.
//!
//! Each stdin line is one command. Player and server commands update the
//! simulated host and are forwarded to the plugin as host events, standing in
//! for the event stream a real server would emit.

use crate::host::SimulatedHost;
use server_dashboard::{DashboardPlugin, HostEvent, TelemetrySource, TOGGLE_COMMAND};

pub const HELP_TEXT: &str = "Commands: sd-toggle [on|off], join <name>, quit <name>, chat <text>, \
transfer <address>, login <name> <device-os>, lowmem, chunks <world> <count>, unload <world>, \
status, stop";

#[derive(Debug, Clone, PartialEq)]
pub enum ConsoleCommand {
    Toggle(Vec<String>),
    Join(String),
    Quit(String),
    Chat(String),
    Transfer(String),
    Login { name: String, device_os: String },
    LowMemory,
    Chunks { world: String, count: usize },
    Unload(String),
    Status,
    Stop,
    Help,
}

impl ConsoleCommand {
    /// Parses one console line. Blank lines give `Ok(None)`; malformed or
    /// unknown commands give a usage message.
    pub fn parse(line: &str) -> Result<Option<Self>, String> {
        let line = line.trim();
        let line = line.strip_prefix('/').unwrap_or(line).trim_start();
        if line.is_empty() {
            return Ok(None);
        }

        let (name, rest) = line
            .split_once(char::is_whitespace)
            .unwrap_or((line, ""));
        let rest = rest.trim();
        let args: Vec<&str> = rest.split_whitespace().collect();

        let command = match name.to_ascii_lowercase().as_str() {
            TOGGLE_COMMAND => Self::Toggle(args.iter().map(|a| a.to_string()).collect()),
            "join" => Self::Join(single_arg(&args, "join <name>")?),
            "quit" => Self::Quit(single_arg(&args, "quit <name>")?),
            "chat" if !rest.is_empty() => Self::Chat(rest.to_string()),
            "chat" => return Err("Usage: chat <text>".to_string()),
            "transfer" => Self::Transfer(single_arg(&args, "transfer <address>")?),
            "login" => match args.as_slice() {
                [name, device_os] => Self::Login {
                    name: name.to_string(),
                    device_os: device_os.to_string(),
                },
                _ => return Err("Usage: login <name> <device-os>".to_string()),
            },
            "lowmem" => Self::LowMemory,
            "chunks" => match args.as_slice() {
                [world, count] => Self::Chunks {
                    world: world.to_string(),
                    count: count
                        .parse()
                        .map_err(|_| format!("Invalid chunk count: {count}"))?,
                },
                _ => return Err("Usage: chunks <world> <count>".to_string()),
            },
            "unload" => Self::Unload(single_arg(&args, "unload <world>")?),
            "status" => Self::Status,
            "stop" => Self::Stop,
            "help" => Self::Help,
            other => return Err(format!("Unknown command: {other}. Type \"help\" for a list")),
        };

        Ok(Some(command))
    }
}

fn single_arg(args: &[&str], usage: &str) -> Result<String, String> {
    match args {
        [value] => Ok(value.to_string()),
        _ => Err(format!("Usage: {usage}")),
    }
}

/// Result of running a console command.
#[derive(Debug, Clone, PartialEq)]
pub enum Reply {
    Message(String),
    Stop,
}

/// Applies a command to the host and plugin.
///
/// `plugin` is `None` when the dashboard failed to start; host state still
/// changes but no event reaches the dashboard.
pub fn execute(
    command: ConsoleCommand,
    host: &SimulatedHost,
    plugin: Option<&DashboardPlugin>,
) -> Reply {
    let forward = |event: HostEvent| plugin.is_some_and(|p| p.handle_event(&event));

    let message = match command {
        ConsoleCommand::Toggle(args) => match plugin {
            Some(plugin) => plugin.handle_command(args.as_slice()).message.to_string(),
            None => "ServerDashboard is not running".to_string(),
        },
        ConsoleCommand::Join(name) => {
            if !host.join(&name) {
                return Reply::Message(format!("{name} is already online"));
            }
            forward(HostEvent::PlayerJoin { name: name.clone() });
            format!("{name} joined the game")
        }
        ConsoleCommand::Quit(name) => {
            if !host.quit(&name) {
                return Reply::Message(format!("{name} is not online"));
            }
            forward(HostEvent::PlayerQuit { name: name.clone() });
            format!("{name} left the game")
        }
        ConsoleCommand::Chat(format) => {
            forward(HostEvent::PlayerChat { format });
            "Chat message sent".to_string()
        }
        ConsoleCommand::Transfer(address) => {
            forward(HostEvent::PlayerTransfer {
                address: address.clone(),
            });
            format!("Transferring to {address}")
        }
        ConsoleCommand::Login { name, device_os } => {
            forward(HostEvent::Login {
                username: name.clone(),
                device_os: device_os.clone(),
            });
            format!("{name} logged in from {device_os}")
        }
        ConsoleCommand::LowMemory => {
            forward(HostEvent::LowMemory);
            "Low memory event raised".to_string()
        }
        ConsoleCommand::Chunks { world, count } => {
            host.set_loaded_chunks(&world, count);
            format!(
                "{world} now has {count} chunks loaded ({} total)",
                host.loaded_chunk_count()
            )
        }
        ConsoleCommand::Unload(world) => {
            if !host.unload_world(&world) {
                return Reply::Message(format!("{world} is not loaded"));
            }
            format!(
                "{world} unloaded ({} chunks still loaded)",
                host.loaded_chunk_count()
            )
        }
        ConsoleCommand::Status => status(host, plugin),
        ConsoleCommand::Stop => return Reply::Stop,
        ConsoleCommand::Help => HELP_TEXT.to_string(),
    };

    Reply::Message(message)
}

fn status(host: &SimulatedHost, plugin: Option<&DashboardPlugin>) -> String {
    let server = format!(
        "players={} tps={:.2} chunks={}",
        host.online_player_count(),
        host.average_tps(),
        host.loaded_chunk_count()
    );

    match plugin {
        Some(plugin) => {
            let stats = plugin.dispatch_stats();
            format!(
                "{server} | dashboard={} webhooks=[{}] submitted={} delivered={} failed={} dropped={}",
                if plugin.gate().is_enabled() { "enabled" } else { "disabled" },
                plugin.registry().names().join(", "),
                stats.submitted,
                stats.delivered,
                stats.failed,
                stats.dropped
            )
        }
        None => format!("{server} | dashboard=not running"),
    }
}
