use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use bfbc2_monitor::config::{Config, LoggingConfig, UpstreamConfig};

mod cli;

#[derive(Parser)]
#[command(
    name = "bfbc2-monitor",
    version,
    about = "Keeps a live Discord status message for a Battlefield: Bad Company 2 server",
    long_about = None
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Log format (text, json)
    #[arg(long, global = true)]
    log_format: Option<String>,

    /// TOML configuration file (environment variables are used otherwise)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the Discord bot (default)
    Run,

    /// Fetch the monitored server once and print its status
    Status {
        /// Server name pattern (defaults to BFBC2_SERVER_NAME)
        #[arg(short, long)]
        server: Option<String>,

        /// Print JSON instead of text
        #[arg(long)]
        json: bool,
    },

    /// Print statistics for the whole server listing
    Overview {
        /// Number of most populated servers to list
        #[arg(short, long, default_value = "5")]
        top: usize,

        /// Print JSON instead of text
        #[arg(long)]
        json: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let file_config = cli
        .config
        .as_deref()
        .map(Config::from_file)
        .transpose()?;

    let mut logging = file_config
        .as_ref()
        .map(|config| config.logging.clone())
        .unwrap_or_else(LoggingConfig::from_env);
    if let Some(format) = cli.log_format {
        logging.format = format;
    }

    // Initialize tracing/logging
    setup_tracing(&logging, cli.verbose)?;

    match cli.command.unwrap_or(Commands::Run) {
        Commands::Run => {
            let config = match file_config {
                Some(config) => config,
                None => Config::from_env().context("Invalid configuration")?,
            };
            tracing::info!(
                server = %config.monitor.server_name,
                interval_secs = config.monitor.update_interval_secs,
                "Starting BFBC2 server monitor"
            );
            cli::run(config).await?;
        }

        Commands::Status { server, json } => {
            let (upstream, configured) = upstream_settings(file_config);
            let pattern = server
                .or(configured)
                .context("No server pattern: pass --server or set BFBC2_SERVER_NAME")?;
            cli::status(upstream, pattern, json).await?;
        }

        Commands::Overview { top, json } => {
            let (upstream, _) = upstream_settings(file_config);
            cli::overview(upstream, top, json).await?;
        }
    }

    Ok(())
}

/// Upstream settings and configured server pattern, without requiring a token
fn upstream_settings(file_config: Option<Config>) -> (UpstreamConfig, Option<String>) {
    match file_config {
        Some(config) => (config.upstream, Some(config.monitor.server_name)),
        None => (
            UpstreamConfig::from_env(),
            std::env::var("BFBC2_SERVER_NAME")
                .ok()
                .filter(|name| !name.trim().is_empty()),
        ),
    }
}

fn setup_tracing(logging: &LoggingConfig, verbose: bool) -> Result<()> {
    let level = if verbose { "debug" } else { logging.level.as_str() };
    let env_filter = tracing_subscriber::EnvFilter::try_new(format!(
        "bfbc2_monitor={level},serenity=warn,warn"
    ))
    .with_context(|| format!("Invalid log level: {level}"))?;

    match logging.format.as_str() {
        "json" => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(tracing_subscriber::fmt::layer().json())
                .init();
        }
        _ => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(tracing_subscriber::fmt::layer().pretty())
                .init();
        }
    }

    Ok(())
}
