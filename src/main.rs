//! TARA Visual Co-Pilot
//!
//! Command-line entry point: page scans, live sessions, configuration and
//! tenant lookups.

mod cli;
mod cmd_agents;
mod cmd_config;
mod cmd_run;
mod cmd_scan;

use clap::Parser;
use tara_config::{Config, ConfigLoader, ConfigValidator, LoggingConfig};
use tracing::{info, warn};
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

use crate::cli::{Cli, Commands};

/// Initialize tracing with console and file output.
///
/// Log files rotate daily under the configured log directory.
fn init_tracing(logging: &LoggingConfig) -> anyhow::Result<()> {
    let log_dir = logging.log_dir();
    std::fs::create_dir_all(&log_dir)?;

    let file_appender = RollingFileAppender::builder()
        .rotation(Rotation::DAILY)
        .filename_prefix("tara")
        .filename_suffix("log")
        .max_log_files(logging.max_files)
        .build(&log_dir)?;
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    // Flushes the file writer on exit.
    static GUARD: std::sync::OnceLock<tracing_appender::non_blocking::WorkerGuard> =
        std::sync::OnceLock::new();
    let _ = GUARD.set(guard);

    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&logging.level));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt::layer().with_target(true).with_writer(std::io::stderr))
        .with(fmt::layer().with_writer(non_blocking).with_ansi(false))
        .init();

    Ok(())
}

fn load_config(cli: &Cli) -> anyhow::Result<Config> {
    let config = ConfigLoader::load_or_default(cli.config.as_deref())?;
    Ok(config)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let config = load_config(&cli)?;
    init_tracing(&config.logging)?;
    info!("TARA co-pilot v{}", env!("CARGO_PKG_VERSION"));

    // `config` reports problems itself.
    if !matches!(cli.command, Commands::Config) {
        let warnings = ConfigValidator::validate(&config).into_result()?;
        for warning in warnings {
            warn!(path = %warning.path, "{}", warning.message);
        }
    }

    match cli.command {
        Commands::Scan { page, format } => cmd_scan::handle_scan(&config, &page, format),
        Commands::Run {
            page,
            ws_url,
            agent_id,
        } => cmd_run::handle_run(&config, &page, ws_url, agent_id).await,
        Commands::Config => cmd_config::handle_config(&config),
        Commands::Agents {
            tenant_id,
            email,
            password,
        } => cmd_agents::handle_agents(&config, &tenant_id, email, password).await,
    }
}
