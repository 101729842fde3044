//! Configuration management for geosite.
//!
//! Parses `geosite.toml` configuration files with serde and provides
//! auto-discovery of config files in parent directories.
//!
//! CLI settings can be applied during load via [`CliSettings`].
//!
//! ## Environment Variable Expansion
//!
//! String configuration values support environment variable expansion:
//!
//! - `${VAR}` - expands to the value of VAR, errors if unset
//! - `${VAR:-default}` - expands to VAR if set, otherwise uses default
//!
//! Expanded fields:
//! - `server.host`
//! - `site.domains_dir`
//! - `site.link_scheme`
//! - `geo.database`
//! - `placeholders.fallback`

mod expand;

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::Deserialize;

/// CLI settings that override configuration file values.
///
/// All fields are optional. Only non-None values override the loaded config.
#[derive(Debug, Default)]
pub struct CliSettings {
    /// Override server host.
    pub host: Option<String>,
    /// Override server port.
    pub port: Option<u16>,
    /// Override the per-domain template tree root.
    pub domains_dir: Option<PathBuf>,
    /// Override the geo database path.
    pub database: Option<PathBuf>,
}

/// Configuration filename to search for.
const CONFIG_FILENAME: &str = "geosite.toml";

/// Application configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Server configuration.
    pub server: ServerConfig,
    /// Site configuration (paths are relative strings from TOML).
    site: SiteConfigRaw,
    /// Geo source configuration (paths are relative strings from TOML).
    geo: GeoConfigRaw,
    /// Placeholder substitution configuration.
    pub placeholders: PlaceholdersConfig,

    /// Resolved site configuration (set after loading).
    #[serde(skip)]
    pub site_resolved: SiteSettings,
    /// Resolved geo configuration (set after loading).
    #[serde(skip)]
    pub geo_resolved: GeoSettings,
    /// Path to the config file (set after loading).
    #[serde(skip)]
    pub config_path: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self::default_with_base(Path::new("."))
    }
}

/// Server configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Server host address.
    pub host: String,
    /// Server port.
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_owned(),
            port: 8001,
        }
    }
}

/// Raw site configuration as parsed from TOML.
#[derive(Debug, Deserialize, Default)]
#[serde(default)]
struct SiteConfigRaw {
    domains_dir: Option<String>,
    config_file: Option<String>,
    root_labels: Option<usize>,
    link_scheme: Option<String>,
    service_field: Option<String>,
}

/// Resolved site configuration with absolute paths.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SiteSettings {
    /// Root of the per-domain template/config tree.
    pub domains_dir: PathBuf,
    /// Name of the per-domain configuration file.
    pub config_file: String,
    /// Number of trailing host labels that form the root domain.
    pub root_labels: usize,
    /// Scheme of generated state and city links.
    pub link_scheme: String,
    /// Domain configuration key holding the service name.
    pub service_field: String,
}

impl Default for SiteSettings {
    fn default() -> Self {
        Self {
            domains_dir: PathBuf::from("domains"),
            config_file: "required.json".to_owned(),
            root_labels: 2,
            link_scheme: "https".to_owned(),
            service_field: "main-service".to_owned(),
        }
    }
}

/// Raw geo configuration as parsed from TOML.
#[derive(Debug, Deserialize, Default)]
#[serde(default)]
struct GeoConfigRaw {
    database: Option<String>,
}

/// Resolved geo source configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeoSettings {
    /// `SQLite` file with a `Cities` table.
    pub database: PathBuf,
}

impl Default for GeoSettings {
    fn default() -> Self {
        Self {
            database: PathBuf::from("newcities.db"),
        }
    }
}

/// Placeholder substitution configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct PlaceholdersConfig {
    /// Literal used when a context value is missing.
    pub fallback: String,
    /// Extra tokens, each mapped to the token whose value it takes.
    pub aliases: BTreeMap<String, String>,
}

impl Default for PlaceholdersConfig {
    fn default() -> Self {
        Self {
            fallback: "N/A".to_owned(),
            aliases: BTreeMap::new(),
        }
    }
}

/// Configuration error.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// File not found.
    #[error("Configuration file not found: {}", .0.display())]
    NotFound(PathBuf),
    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    /// TOML parsing error.
    #[error("TOML parse error: {0}")]
    Parse(#[from] toml::de::Error),
    /// Validation error.
    #[error("Configuration error: {0}")]
    Validation(String),
    /// Environment variable error during expansion.
    #[error("Environment variable error in {field}: {message}")]
    EnvVar {
        /// Config field path (e.g., "`geo.database`").
        field: String,
        /// Error message (e.g., "${`GEO_DB`} not set").
        message: String,
    },
}

/// Require a string field to be non-empty.
fn require_non_empty(value: &str, field: &str) -> Result<(), ConfigError> {
    if value.is_empty() {
        return Err(ConfigError::Validation(format!("{field} cannot be empty")));
    }
    Ok(())
}

/// Require a `[Token]`-shaped string.
fn require_bracketed(value: &str, field: &str) -> Result<(), ConfigError> {
    if value.len() < 3 || !value.starts_with('[') || !value.ends_with(']') {
        return Err(ConfigError::Validation(format!(
            "{field} entry '{value}' must be a bracketed token like [Name]"
        )));
    }
    Ok(())
}

impl Config {
    /// Load configuration from file with optional CLI settings.
    ///
    /// If `config_path` is provided, loads from that file.
    /// Otherwise, searches for `geosite.toml` in current directory and parents.
    ///
    /// CLI settings are applied after loading and path resolution, allowing CLI
    /// arguments to take precedence over config file values.
    ///
    /// # Errors
    ///
    /// Returns error if explicit `config_path` doesn't exist or parsing fails.
    pub fn load(
        config_path: Option<&Path>,
        cli_settings: Option<&CliSettings>,
    ) -> Result<Self, ConfigError> {
        let mut config = if let Some(path) = config_path {
            if !path.exists() {
                return Err(ConfigError::NotFound(path.to_path_buf()));
            }
            Self::load_from_file(path)?
        } else if let Some(discovered) = Self::discover_config() {
            Self::load_from_file(&discovered)?
        } else {
            Self::default_with_cwd()
        };

        if let Some(settings) = cli_settings {
            config.apply_cli_settings(settings);
        }

        Ok(config)
    }

    /// Apply CLI settings to the configuration.
    fn apply_cli_settings(&mut self, settings: &CliSettings) {
        if let Some(host) = &settings.host {
            self.server.host.clone_from(host);
        }
        if let Some(port) = settings.port {
            self.server.port = port;
        }
        if let Some(domains_dir) = &settings.domains_dir {
            self.site_resolved.domains_dir.clone_from(domains_dir);
        }
        if let Some(database) = &settings.database {
            self.geo_resolved.database.clone_from(database);
        }
    }

    /// Search for config file in current directory and parents.
    fn discover_config() -> Option<PathBuf> {
        let mut current = std::env::current_dir().ok()?;
        loop {
            let candidate = current.join(CONFIG_FILENAME);
            if candidate.exists() {
                return Some(candidate);
            }
            if !current.pop() {
                return None;
            }
        }
    }

    /// Create default config with paths relative to current working directory.
    fn default_with_cwd() -> Self {
        let cwd = std::env::current_dir().unwrap_or_default();
        Self::default_with_base(&cwd)
    }

    /// Create default config with paths relative to given base directory.
    fn default_with_base(base: &Path) -> Self {
        let site = SiteSettings::default();
        let geo = GeoSettings::default();
        Self {
            server: ServerConfig::default(),
            site: SiteConfigRaw::default(),
            geo: GeoConfigRaw::default(),
            placeholders: PlaceholdersConfig::default(),
            site_resolved: SiteSettings {
                domains_dir: base.join(site.domains_dir),
                ..site
            },
            geo_resolved: GeoSettings {
                database: base.join(geo.database),
            },
            config_path: None,
        }
    }

    /// Load configuration from a specific file.
    fn load_from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        let mut config: Self = toml::from_str(&content)?;

        // Expand before paths are joined to the config directory
        config.expand_env_vars()?;

        let config_dir = path.parent().unwrap_or(Path::new("."));
        config.resolve(config_dir);
        config.config_path = Some(path.to_path_buf());

        config.validate()?;

        Ok(config)
    }

    /// Validate configuration values.
    ///
    /// Called automatically after loading from file.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Validation` if any validation fails.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.validate_server()?;
        self.validate_site()?;
        self.validate_placeholders()?;
        Ok(())
    }

    fn validate_server(&self) -> Result<(), ConfigError> {
        require_non_empty(&self.server.host, "server.host")?;

        if self.server.port == 0 {
            return Err(ConfigError::Validation(
                "server.port cannot be 0".to_owned(),
            ));
        }

        Ok(())
    }

    fn validate_site(&self) -> Result<(), ConfigError> {
        let site = &self.site_resolved;
        require_non_empty(&site.config_file, "site.config_file")?;
        require_non_empty(&site.service_field, "site.service_field")?;

        if site.root_labels == 0 {
            return Err(ConfigError::Validation(
                "site.root_labels must be at least 1".to_owned(),
            ));
        }
        if site.link_scheme != "http" && site.link_scheme != "https" {
            return Err(ConfigError::Validation(format!(
                "site.link_scheme must be http or https, got '{}'",
                site.link_scheme
            )));
        }

        Ok(())
    }

    fn validate_placeholders(&self) -> Result<(), ConfigError> {
        for (alias, target) in &self.placeholders.aliases {
            require_bracketed(alias, "placeholders.aliases")?;
            require_bracketed(target, "placeholders.aliases")?;
        }
        Ok(())
    }

    /// Expand environment variable references in configuration strings.
    fn expand_env_vars(&mut self) -> Result<(), ConfigError> {
        self.server.host = expand::expand_env(&self.server.host, "server.host")?;

        if let Some(ref dir) = self.site.domains_dir {
            self.site.domains_dir = Some(expand::expand_env(dir, "site.domains_dir")?);
        }
        if let Some(ref scheme) = self.site.link_scheme {
            self.site.link_scheme = Some(expand::expand_env(scheme, "site.link_scheme")?);
        }
        if let Some(ref database) = self.geo.database {
            self.geo.database = Some(expand::expand_env(database, "geo.database")?);
        }
        self.placeholders.fallback =
            expand::expand_env(&self.placeholders.fallback, "placeholders.fallback")?;

        Ok(())
    }

    /// Fill the resolved sections, joining relative paths to the config directory.
    fn resolve(&mut self, config_dir: &Path) {
        let defaults = SiteSettings::default();
        let resolve = |path: Option<&str>, default: &Path| {
            config_dir.join(path.map_or_else(|| default.to_path_buf(), PathBuf::from))
        };

        self.site_resolved = SiteSettings {
            domains_dir: resolve(self.site.domains_dir.as_deref(), &defaults.domains_dir),
            config_file: self
                .site
                .config_file
                .clone()
                .unwrap_or(defaults.config_file),
            root_labels: self.site.root_labels.unwrap_or(defaults.root_labels),
            link_scheme: self
                .site
                .link_scheme
                .clone()
                .unwrap_or(defaults.link_scheme),
            service_field: self
                .site
                .service_field
                .clone()
                .unwrap_or(defaults.service_field),
        };

        self.geo_resolved = GeoSettings {
            database: resolve(
                self.geo.database.as_deref(),
                &GeoSettings::default().database,
            ),
        };
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default_with_base(Path::new("/test"));
        assert_eq!(config.server.host, "127.0.0.1");
        assert_eq!(config.server.port, 8001);
        assert_eq!(
            config.site_resolved.domains_dir,
            PathBuf::from("/test/domains")
        );
        assert_eq!(config.site_resolved.config_file, "required.json");
        assert_eq!(config.site_resolved.root_labels, 2);
        assert_eq!(config.site_resolved.link_scheme, "https");
        assert_eq!(
            config.geo_resolved.database,
            PathBuf::from("/test/newcities.db")
        );
        assert_eq!(config.placeholders.fallback, "N/A");
        assert!(config.placeholders.aliases.is_empty());
    }

    #[test]
    fn test_parse_minimal_config() {
        let config: Config = toml::from_str("").unwrap();
        assert_eq!(config.server.host, "127.0.0.1");
        assert_eq!(config.server.port, 8001);
    }

    #[test]
    fn test_parse_full_config() {
        let toml = r#"
[server]
host = "0.0.0.0"
port = 9000

[site]
domains_dir = "sites"
config_file = "site.json"
root_labels = 3
link_scheme = "http"
service_field = "service"

[geo]
database = "data/cities.db"

[placeholders]
fallback = ""

[placeholders.aliases]
"[Business]" = "[Company Name]"
"[Tel]" = "[Phone]"
"#;
        let mut config: Config = toml::from_str(toml).unwrap();
        config.resolve(Path::new("/project"));

        assert_eq!(config.server.host, "0.0.0.0");
        assert_eq!(config.server.port, 9000);
        assert_eq!(
            config.site_resolved,
            SiteSettings {
                domains_dir: PathBuf::from("/project/sites"),
                config_file: "site.json".to_owned(),
                root_labels: 3,
                link_scheme: "http".to_owned(),
                service_field: "service".to_owned(),
            }
        );
        assert_eq!(
            config.geo_resolved.database,
            PathBuf::from("/project/data/cities.db")
        );
        assert_eq!(config.placeholders.fallback, "");
        assert_eq!(
            config.placeholders.aliases.get("[Business]").map(String::as_str),
            Some("[Company Name]")
        );
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_absolute_paths_kept() {
        let toml = r#"
[geo]
database = "/var/lib/geo.db"
"#;
        let mut config: Config = toml::from_str(toml).unwrap();
        config.resolve(Path::new("/project"));

        assert_eq!(config.geo_resolved.database, PathBuf::from("/var/lib/geo.db"));
        assert_eq!(
            config.site_resolved.domains_dir,
            PathBuf::from("/project/domains")
        );
    }

    #[test]
    fn test_apply_cli_settings() {
        let mut config = Config::default_with_base(Path::new("/test"));
        let overrides = CliSettings {
            port: Some(9000),
            database: Some(PathBuf::from("/data/geo.db")),
            ..Default::default()
        };

        config.apply_cli_settings(&overrides);

        assert_eq!(config.server.port, 9000);
        assert_eq!(config.server.host, "127.0.0.1"); // Unchanged
        assert_eq!(config.geo_resolved.database, PathBuf::from("/data/geo.db"));
        assert_eq!(
            config.site_resolved.domains_dir,
            PathBuf::from("/test/domains")
        );
    }

    #[test]
    fn test_apply_cli_settings_empty() {
        let mut config = Config::default_with_base(Path::new("/test"));

        config.apply_cli_settings(&CliSettings::default());

        assert_eq!(config.server.host, "127.0.0.1");
        assert_eq!(config.server.port, 8001);
    }

    #[test]
    fn test_expand_env_vars() {
        // SAFETY: test runs single-threaded per test function
        unsafe {
            std::env::set_var("GEOSITE_TEST_CONFIG_DB", "/srv/cities.db");
            std::env::remove_var("GEOSITE_TEST_CONFIG_HOST");
        }

        let toml = r#"
[server]
host = "${GEOSITE_TEST_CONFIG_HOST:-0.0.0.0}"

[geo]
database = "${GEOSITE_TEST_CONFIG_DB}"
"#;
        let mut config: Config = toml::from_str(toml).unwrap();
        config.expand_env_vars().unwrap();
        config.resolve(Path::new("/project"));

        assert_eq!(config.server.host, "0.0.0.0");
        assert_eq!(config.geo_resolved.database, PathBuf::from("/srv/cities.db"));

        unsafe {
            std::env::remove_var("GEOSITE_TEST_CONFIG_DB");
        }
    }

    #[test]
    fn test_expand_env_vars_missing_required_var() {
        // SAFETY: test runs single-threaded per test function
        unsafe {
            std::env::remove_var("GEOSITE_TEST_CONFIG_MISSING");
        }

        let toml = r#"
[site]
domains_dir = "${GEOSITE_TEST_CONFIG_MISSING}"
"#;
        let mut config: Config = toml::from_str(toml).unwrap();
        let err = config.expand_env_vars().unwrap_err();

        assert!(matches!(err, ConfigError::EnvVar { .. }));
        assert!(err.to_string().contains("site.domains_dir"));
    }

    // Validation tests

    /// Assert that validation fails with expected substrings in the error message.
    fn assert_validation_error(config: &Config, expected_substrings: &[&str]) {
        let err = config.validate().unwrap_err();
        assert!(
            matches!(err, ConfigError::Validation(_)),
            "Expected ConfigError::Validation, got {err:?}"
        );
        let msg = err.to_string();
        for s in expected_substrings {
            assert!(
                msg.contains(s),
                "Expected error to contain '{s}', got: {msg}"
            );
        }
    }

    #[test]
    fn test_validate_default_config_passes() {
        let config = Config::default_with_base(Path::new("/test"));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_server() {
        let mut config = Config::default_with_base(Path::new("/test"));
        config.server.host = String::new();
        assert_validation_error(&config, &["server.host", "empty"]);

        let mut config = Config::default_with_base(Path::new("/test"));
        config.server.port = 0;
        assert_validation_error(&config, &["server.port"]);
    }

    #[test]
    fn test_validate_root_labels() {
        let mut config = Config::default_with_base(Path::new("/test"));
        config.site_resolved.root_labels = 0;
        assert_validation_error(&config, &["site.root_labels"]);
    }

    #[test]
    fn test_validate_link_scheme() {
        let mut config = Config::default_with_base(Path::new("/test"));
        config.site_resolved.link_scheme = "ftp".to_owned();
        assert_validation_error(&config, &["site.link_scheme", "ftp"]);
    }

    #[test]
    fn test_validate_alias_tokens() {
        let mut config = Config::default_with_base(Path::new("/test"));
        config
            .placeholders
            .aliases
            .insert("Business".to_owned(), "[Company Name]".to_owned());
        assert_validation_error(&config, &["placeholders.aliases", "Business"]);

        let mut config = Config::default_with_base(Path::new("/test"));
        config
            .placeholders
            .aliases
            .insert("[Business]".to_owned(), "[]".to_owned());
        assert_validation_error(&config, &["placeholders.aliases", "[]"]);
    }

    #[test]
    fn test_load_explicit_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("geosite.toml");
        std::fs::write(
            &path,
            "[site]\ndomains_dir = \"sites\"\n\n[geo]\ndatabase = \"geo.db\"\n",
        )
        .unwrap();

        let config = Config::load(
            Some(&path),
            Some(&CliSettings {
                host: Some("0.0.0.0".to_owned()),
                ..Default::default()
            }),
        )
        .unwrap();

        assert_eq!(config.config_path.as_deref(), Some(path.as_path()));
        assert_eq!(config.site_resolved.domains_dir, dir.path().join("sites"));
        assert_eq!(config.geo_resolved.database, dir.path().join("geo.db"));
        assert_eq!(config.server.host, "0.0.0.0");
    }

    #[test]
    fn test_load_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing.toml");

        let err = Config::load(Some(&path), None).unwrap_err();

        assert!(matches!(err, ConfigError::NotFound(_)));
    }

    #[test]
    fn test_load_invalid_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("geosite.toml");
        std::fs::write(&path, "[site]\nlink_scheme = \"gopher\"\n").unwrap();

        let err = Config::load(Some(&path), None).unwrap_err();

        assert!(matches!(err, ConfigError::Validation(_)));
    }
}
