//! Telemetry Console CLI
//!
//! Command-line interface for the telemetry console:
//! - Watch a telemetry feed from the terminal
//! - Generate a default config file

use anyhow::Context;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

use telemetry_console::client::{dashboard_supervisor, run_supervisor};
use telemetry_console::config::{generate_default_config, Config};
use telemetry_console::logging;
use telemetry_console::ReconnectPolicy;

#[derive(Parser)]
#[command(name = "console-cli")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Terminal client for the telemetry console")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Config file (default: search the standard locations)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Watch a telemetry feed, printing the dashboard whenever it changes
    Watch {
        /// WebSocket endpoint (overrides config)
        #[arg(short, long)]
        endpoint: Option<String>,
        /// Liveness check interval in milliseconds (overrides config)
        #[arg(short, long)]
        interval_ms: Option<u64>,
        /// Back off exponentially between failed attempts
        #[arg(long)]
        backoff: bool,
    },

    /// Generate default config file
    Config {
        /// Output path (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Watch {
            endpoint,
            interval_ms,
            backoff,
        } => {
            let mut config = match &cli.config {
                Some(path) => Config::load_with_env(path)
                    .with_context(|| format!("Loading config from {:?}", path))?,
                None => Config::load_default(),
            };
            logging::init(&config.logging);

            if let Some(endpoint) = endpoint {
                config.client.endpoint = endpoint;
            }
            if let Some(interval_ms) = interval_ms {
                config.client.check_interval_ms = interval_ms;
            }
            if backoff {
                config.client.reconnect = ReconnectPolicy::backoff();
            }

            let (mut supervisor, events) = dashboard_supervisor(&config.client);

            let mut last_line = String::new();
            run_supervisor(
                &mut supervisor,
                events,
                config.client.check_interval(),
                async {
                    let _ = tokio::signal::ctrl_c().await;
                },
                |sup| {
                    let line = sup.sink().render_line();
                    if line != last_line {
                        println!("{}", line);
                        last_line = line;
                    }
                },
            )
            .await;

            let stats = supervisor.stats();
            println!();
            println!("Attempts: {}", stats.attempts);
            println!("Opened:   {}", stats.opens);
            println!("Frames:   {} ({} dropped)", stats.frames_received, stats.frames_dropped);
        }

        Commands::Config { output } => {
            let config = generate_default_config();

            match output {
                Some(path) => {
                    // Create parent directory if needed
                    if let Some(parent) = path.parent() {
                        std::fs::create_dir_all(parent)?;
                    }
                    std::fs::write(&path, &config)
                        .with_context(|| format!("Writing config to {:?}", path))?;
                    println!("Config written to {:?}", path);
                }
                None => {
                    print!("{}", config);
                }
            }
        }
    }

    Ok(())
}
