//! CLI definitions for the TARA co-pilot.

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};

/// TARA Visual Co-Pilot.
#[derive(Parser)]
#[command(name = "tara")]
#[command(about = "Voice-agent page overlay: DOM snapshots, commands and sessions")]
#[command(version)]
pub(crate) struct Cli {
    /// Configuration file path (default: $TARA_CONFIG, then ~/.tara/config.toml)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub(crate) enum Commands {
    /// Scan a page fixture and print the snapshot the backend would receive
    Scan {
        /// Page fixture (JSON)
        #[arg(long)]
        page: PathBuf,

        /// Output format
        #[arg(long, value_enum, default_value_t = OutputFormat::Table)]
        format: OutputFormat,
    },

    /// Run a live session against a page fixture until Ctrl-C
    Run {
        /// Page fixture (JSON)
        #[arg(long)]
        page: PathBuf,

        /// Backend endpoint (overrides the configuration)
        #[arg(long, env = "TARA_WS_URL")]
        ws_url: Option<String>,

        /// Agent to talk to
        #[arg(long, env = "TARA_AGENT_ID")]
        agent_id: Option<String>,
    },

    /// Validate and print the effective configuration
    Config,

    /// List a tenant's agents
    Agents {
        /// Tenant ID
        tenant_id: String,

        /// Log in with this email before listing
        #[arg(long, env = "TARA_EMAIL")]
        email: Option<String>,

        /// Password for --email
        #[arg(long, env = "TARA_PASSWORD", hide_env_values = true)]
        password: Option<String>,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub(crate) enum OutputFormat {
    Table,
    Json,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_scan() {
        let cli = Cli::parse_from(["tara", "scan", "--page", "page.json", "--format", "json"]);
        match cli.command {
            Commands::Scan { page, format } => {
                assert_eq!(page, PathBuf::from("page.json"));
                assert_eq!(format, OutputFormat::Json);
            }
            _ => panic!("expected scan"),
        }
    }

    #[test]
    fn test_parse_global_config() {
        let cli = Cli::parse_from(["tara", "config", "-c", "/etc/tara.toml"]);
        assert_eq!(cli.config, Some(PathBuf::from("/etc/tara.toml")));
        assert!(matches!(cli.command, Commands::Config));
    }
}
