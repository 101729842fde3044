//! `geosite resolve` command implementation.

use std::sync::Arc;

use clap::Args;
use geosite_server::{build_site, load_geo_index, server_config_from_geosite_config};
use geosite_site::{PageRequest, PageStatus};

use super::ConfigArgs;
use crate::error::CliError;
use crate::output::Output;

/// Arguments for the resolve command.
#[derive(Args)]
pub(crate) struct ResolveArgs {
    /// Host to resolve (e.g. plumbing-austin-tx.example.com).
    host: String,

    /// Named page instead of the host's home page.
    #[arg(long)]
    page: Option<String>,

    /// Request scheme for canonical URLs (default: configured link scheme).
    #[arg(long)]
    scheme: Option<String>,

    #[command(flatten)]
    config: ConfigArgs,

    /// Enable verbose output.
    #[arg(short, long)]
    pub verbose: bool,
}

impl ResolveArgs {
    /// Build the request described by the arguments.
    fn request(&self) -> PageRequest {
        PageRequest {
            host: self.host.clone(),
            page: self.page.clone(),
            scheme: self.scheme.clone(),
        }
    }

    /// Execute the resolve command.
    ///
    /// Prints the page body (or the not-found body) to stdout.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration or geo data cannot be loaded, and
    /// [`CliError::NotFound`] when the request resolves to the not-found page.
    pub(crate) async fn execute(self, version: &str) -> Result<(), CliError> {
        let output = Output::new();
        let request = self.request();
        let config = self.config.load(None, None)?;

        let server_config = server_config_from_geosite_config(&config, version.to_owned());
        let geo = Arc::new(load_geo_index(&server_config).await?);
        let site = build_site(&server_config, geo);

        let response = site.respond(&request);
        tracing::debug!(host = %request.host, status = ?response.status, "Resolved request");
        output.body(&response.body);

        match response.status {
            PageStatus::Ok => Ok(()),
            PageStatus::NotFound => Err(CliError::NotFound(request.host)),
        }
    }
}

#[cfg(test)]
mod tests {
    use clap::Parser;
    use pretty_assertions::assert_eq;

    use super::*;

    #[derive(Parser)]
    struct TestCli {
        #[command(flatten)]
        args: ResolveArgs,
    }

    #[test]
    fn test_request_from_args() {
        let cli = TestCli::parse_from([
            "geosite",
            "plumbing-austin-tx.example.com",
            "--page",
            "about",
            "--scheme",
            "http",
        ]);

        assert_eq!(
            cli.args.request(),
            PageRequest::new("plumbing-austin-tx.example.com")
                .with_page("about")
                .with_scheme("http")
        );
        assert!(!cli.args.verbose);
    }
}
