//! `geosite serve` command implementation.

use clap::Args;
use geosite_server::{run_server, server_config_from_geosite_config};

use super::ConfigArgs;
use crate::error::CliError;
use crate::output::Output;

/// Arguments for the serve command.
#[derive(Args)]
pub(crate) struct ServeArgs {
    #[command(flatten)]
    config: ConfigArgs,

    /// Host to bind to (overrides config).
    #[arg(long)]
    host: Option<String>,

    /// Port to bind to (overrides config).
    #[arg(short, long)]
    port: Option<u16>,

    /// Enable verbose output (request and cache logs).
    #[arg(short, long)]
    pub verbose: bool,
}

impl ServeArgs {
    /// Execute the serve command.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration fails, the geo data cannot be loaded
    /// or the server fails to start.
    pub(crate) async fn execute(self, version: &str) -> Result<(), CliError> {
        let output = Output::new();
        let config = self.config.load(self.host, self.port)?;

        output.highlight(&format!(
            "Starting server on {}:{}",
            config.server.host, config.server.port
        ));
        output.info(&format!(
            "Domains directory: {}",
            config.site_resolved.domains_dir.display()
        ));
        output.info(&format!(
            "Geo database: {}",
            config.geo_resolved.database.display()
        ));
        if !config.site_resolved.domains_dir.is_dir() {
            output.warning("Domains directory does not exist; every page will be not-found");
        }

        let server_config = server_config_from_geosite_config(&config, version.to_owned());
        run_server(server_config).await?;

        Ok(())
    }
}
