//! Server Dashboard host entry point.
//!
//! Loads configuration, sets up logging, starts the simulated server and the
//! dashboard plugin, then feeds console lines to both until `stop` or a
//! termination signal.

mod cli;
mod config;
mod console;
mod host;
mod signals;

use anyhow::Context;
use cli::CliArgs;
use config::{AppConfig, LoggingSettings};
use console::{ConsoleCommand, Reply};
use host::SimulatedHost;
use server_dashboard::{DashboardPlugin, EnablementGate, PLUGIN_VERSION};
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::broadcast;
use tracing::{error, info, warn};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Installs the global tracing subscriber. `RUST_LOG` takes precedence over
/// the configured level.
fn setup_logging(config: &LoggingSettings) -> anyhow::Result<()> {
    let log_level = config.level.as_str();
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(log_level));

    let registry = tracing_subscriber::registry().with(filter);

    if config.json_format {
        registry
            .with(
                fmt::layer()
                    .json()
                    .with_file(false)
                    .with_line_number(false)
                    .with_thread_ids(true)
                    .with_thread_names(true),
            )
            .try_init()?;
    } else {
        registry
            .with(
                fmt::layer()
                    .with_ansi(true)
                    .with_file(false)
                    .with_line_number(false)
                    .with_thread_ids(true)
                    .with_thread_names(true),
            )
            .try_init()?;
    }

    info!("🔧 Logging initialized with level: {}", log_level);
    Ok(())
}

struct Application {
    config: AppConfig,
    host: Arc<SimulatedHost>,
}

impl Application {
    async fn new(args: CliArgs) -> anyhow::Result<Self> {
        let mut config = AppConfig::load_from_file(&args.config_path)
            .await
            .with_context(|| format!("Failed to load {}", args.config_path.display()))?;

        if let Some(token) = args.token {
            config.dashboard.token = token;
        }
        if let Some(api_url) = args.api_url {
            config.dashboard.api_url = api_url;
        }
        if let Some(log_level) = args.log_level {
            config.logging.level = log_level;
        }
        if args.json_logs {
            config.logging.json_format = true;
        }

        config
            .validate()
            .map_err(|e| anyhow::anyhow!("Configuration validation failed: {e}"))?;

        setup_logging(&config.logging)?;

        info!(
            "📂 Config: {} | API: {} | Worlds: {}",
            args.config_path.display(),
            config.dashboard.api_url,
            config.host.worlds.len()
        );

        let host = Arc::new(SimulatedHost::new(&config.host));
        Ok(Self { config, host })
    }

    async fn run(self) -> anyhow::Result<()> {
        info!("🌟 Starting Server Dashboard host v{}", PLUGIN_VERSION);

        let (shutdown_sender, _) = broadcast::channel(1);
        let tick_handle = self
            .host
            .clone()
            .spawn_tick_loop(shutdown_sender.subscribe());

        let plugin = DashboardPlugin::start_default(
            self.config.dashboard.clone(),
            EnablementGate::new(),
            self.host.clone(),
        )
        .await
        .inspect_err(|_| warn!("⚠️ Continuing without ServerDashboard"))
        .ok();

        info!("✅ Host is running. Type \"help\" for commands");
        info!("🛑 Press Ctrl+C to gracefully shutdown");

        let mut lines = BufReader::new(tokio::io::stdin()).lines();
        let mut stdin_open = true;
        let signal = signals::wait_for_shutdown_signal();
        tokio::pin!(signal);

        loop {
            tokio::select! {
                result = &mut signal => {
                    if let Err(e) = result {
                        error!("❌ Signal handler failed: {}", e);
                    }
                    break;
                }
                line = lines.next_line(), if stdin_open => match line {
                    Ok(Some(line)) => match ConsoleCommand::parse(&line) {
                        Ok(Some(command)) => {
                            match console::execute(command, &self.host, plugin.as_ref()) {
                                Reply::Message(message) => info!("💬 {}", message),
                                Reply::Stop => break,
                            }
                        }
                        Ok(None) => {}
                        Err(usage) => warn!("{}", usage),
                    },
                    Ok(None) => {
                        info!("Console input closed, waiting for a shutdown signal");
                        stdin_open = false;
                    }
                    Err(e) => {
                        warn!("⚠️ Failed to read console input: {}", e);
                        stdin_open = false;
                    }
                },
            }
        }

        info!("🛑 Shutdown requested, initiating graceful shutdown...");

        if let Some(plugin) = plugin {
            let stats = plugin.shutdown().await;
            info!(
                "📊 Dashboard requests: {} submitted | {} delivered | {} failed | {} dropped",
                stats.submitted, stats.delivered, stats.failed, stats.dropped
            );
        }

        let _ = shutdown_sender.send(());
        if let Err(e) = tick_handle.await {
            warn!("⚠️ Tick loop ended abnormally: {}", e);
        }

        info!("👋 Host shutdown complete");
        Ok(())
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = CliArgs::parse();

    match Application::new(args).await {
        Ok(app) => app.run().await,
        Err(e) => {
            eprintln!("❌ Failed to start host: {e:?}");
            std::process::exit(1);
        }
    }
}
