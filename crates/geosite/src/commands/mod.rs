//! CLI command implementations.

pub(crate) mod resolve;
pub(crate) mod serve;

use std::path::PathBuf;

use clap::Args;
use geosite_config::{CliSettings, Config};

use crate::error::CliError;

pub(crate) use resolve::ResolveArgs;
pub(crate) use serve::ServeArgs;

/// Configuration arguments shared by all commands.
#[derive(Args)]
pub(crate) struct ConfigArgs {
    /// Path to configuration file (default: auto-discover geosite.toml).
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Per-domain template directory (overrides config).
    #[arg(short, long, env = "GEOSITE_DOMAINS_DIR")]
    domains_dir: Option<PathBuf>,

    /// `SQLite` geo database (overrides config).
    #[arg(long, env = "GEOSITE_DATABASE")]
    database: Option<PathBuf>,
}

impl ConfigArgs {
    /// Load configuration with these arguments and extra server overrides applied.
    pub(crate) fn load(
        self,
        host: Option<String>,
        port: Option<u16>,
    ) -> Result<Config, CliError> {
        let cli_settings = CliSettings {
            host,
            port,
            domains_dir: self.domains_dir,
            database: self.database,
        };
        Ok(Config::load(self.config.as_deref(), Some(&cli_settings))?)
    }
}
