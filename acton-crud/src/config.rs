//! Layered service and resource settings
//!
//! Sources, from strongest to weakest:
//! 1. Environment variables (prefix: `ACTON_`, sections split on `__`)
//! 2. `./config.toml`
//! 3. `~/.config/acton-crud/{service_name}/config.toml`
//! 4. `/etc/acton-crud/{service_name}/config.toml`
//! 5. Built-in defaults
//!
//! ```toml
//! [service]
//! name = "books-api"
//! port = 8080
//!
//! [resources]
//! max_per_page = 50
//! expose_internal_errors = false
//! ```
//!
//! `ACTON_RESOURCES__MAX_PER_PAGE=50` sets the same value from the environment.

use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::error::Result;
use crate::filter::{DEFAULT_PER_PAGE, MAX_PER_PAGE};

/// Everything a resource server reads at startup
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub service: ServiceConfig,

    /// Resource endpoint behaviour
    #[serde(default)]
    pub resources: ResourcesConfig,
}

/// Process-wide settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServiceConfig {
    /// Also selects the config directory
    pub name: String,

    #[serde(default = "default_port")]
    pub port: u16,

    /// Log level (trace, debug, info, warn, error) or a full filter directive
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Requests running longer get `408`
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,

    /// Free-form deployment label, logged at startup
    #[serde(default = "default_environment")]
    pub environment: String,
}

impl ServiceConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

/// Settings shared by every resource endpoint
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourcesConfig {
    /// Page size used when a list request names a page but no size
    #[serde(default = "default_per_page")]
    pub default_per_page: u32,

    /// Upper bound on the requested page size
    #[serde(default = "default_max_per_page")]
    pub max_per_page: u32,

    /// Return raw internal error messages to clients instead of a reference id
    #[serde(default)]
    pub expose_internal_errors: bool,
}

impl Default for ResourcesConfig {
    fn default() -> Self {
        Self {
            default_per_page: default_per_page(),
            max_per_page: default_max_per_page(),
            expose_internal_errors: false,
        }
    }
}

fn default_port() -> u16 {
    8080
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_timeout() -> u64 {
    30
}

fn default_environment() -> String {
    "dev".to_string()
}

fn default_per_page() -> u32 {
    DEFAULT_PER_PAGE
}

fn default_max_per_page() -> u32 {
    MAX_PER_PAGE
}

impl Config {
    /// Load every source, naming the service after the running binary
    pub fn load() -> Result<Self> {
        let service_name = std::env::current_exe()
            .ok()
            .and_then(|p| p.file_stem().map(|s| s.to_string_lossy().into_owned()))
            .unwrap_or_else(|| "acton-crud".to_string());

        Self::load_for_service(&service_name)
    }

    /// Load every source for the named service
    pub fn load_for_service(service_name: &str) -> Result<Self> {
        let config_paths = Self::find_config_paths(service_name);

        tracing::debug!(candidates = ?config_paths, "looking for config files");

        let mut defaults = Config::default();
        defaults.service.name = service_name.to_string();

        let mut figment = Figment::new().merge(Serialized::defaults(defaults));

        // Lowest priority first so higher priority files override
        for path in config_paths.iter().rev() {
            if path.exists() {
                tracing::info!(path = %path.display(), "reading config file");
                figment = figment.merge(Toml::file(path));
            }
        }

        figment = figment.merge(Env::prefixed("ACTON_").split("__"));

        Ok(figment.extract()?)
    }

    /// Defaults, then one file, then the environment
    pub fn load_from(path: impl AsRef<Path>) -> Result<Self> {
        let config = Figment::new()
            .merge(Serialized::defaults(Config::default()))
            .merge(Toml::file(path.as_ref()))
            .merge(Env::prefixed("ACTON_").split("__"))
            .extract()?;

        Ok(config)
    }

    // Strongest first
    fn find_config_paths(service_name: &str) -> Vec<PathBuf> {
        let mut paths = vec![PathBuf::from("config.toml")];

        let xdg_dirs = xdg::BaseDirectories::with_prefix("acton-crud");
        if let Ok(path) = xdg_dirs.place_config_file(Path::new(service_name).join("config.toml")) {
            paths.push(path);
        }

        paths.push(
            PathBuf::from("/etc/acton-crud")
                .join(service_name)
                .join("config.toml"),
        );

        paths
    }

    /// Address to bind the HTTP listener to
    pub fn bind_address(&self) -> String {
        format!("0.0.0.0:{}", self.service.port)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            service: ServiceConfig {
                name: "acton-crud".to_string(),
                port: default_port(),
                log_level: default_log_level(),
                timeout_secs: default_timeout(),
                environment: default_environment(),
            },
            resources: ResourcesConfig::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn defaults_match_query_limits() {
        let config = Config::default();
        assert_eq!(config.service.port, 8080);
        assert_eq!(config.service.log_level, "info");
        assert_eq!(config.service.timeout(), Duration::from_secs(30));
        assert_eq!(config.resources.default_per_page, DEFAULT_PER_PAGE);
        assert_eq!(config.resources.max_per_page, MAX_PER_PAGE);
        assert!(!config.resources.expose_internal_errors);
    }

    #[test]
    fn test_load_from_file_overrides_defaults() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            r#"
[service]
name = "books-api"
port = 9090

[resources]
max_per_page = 25
expose_internal_errors = true
"#
        )
        .unwrap();

        let config = Config::load_from(file.path()).unwrap();
        assert_eq!(config.service.name, "books-api");
        assert_eq!(config.service.port, 9090);
        assert_eq!(config.service.log_level, "info");
        assert_eq!(config.resources.max_per_page, 25);
        assert_eq!(config.resources.default_per_page, DEFAULT_PER_PAGE);
        assert!(config.resources.expose_internal_errors);
    }

    #[test]
    fn test_missing_file_uses_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::load_from(dir.path().join("absent.toml")).unwrap();
        assert_eq!(config.service.name, "acton-crud");
    }

    #[test]
    fn test_invalid_value_is_config_error() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[service]\nport = \"eighty\"").unwrap();

        let err = Config::load_from(file.path()).unwrap_err();
        assert!(matches!(err, crate::error::Error::Config(_)));
    }

    #[test]
    fn test_bind_address() {
        let config = Config::default();
        assert_eq!(config.bind_address(), "0.0.0.0:8080");
    }
}
