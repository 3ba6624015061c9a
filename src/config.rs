use crate::changes::{DEFAULT_PROJECT_PREFIXES, TicketMatcher};
use crate::log_debug;

use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Project configuration filename, looked up in the working directory
pub const PROJECT_CONFIG_FILENAME: &str = ".release-announcer.toml";

/// Errors raised while loading the configuration
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("Invalid config file {path}: {source}. Please check it for syntax errors.")]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },
    #[error("Config must list at least one ticket prefix")]
    NoTicketPrefixes,
}

/// Configuration for the announcer
#[derive(Deserialize, Serialize, Clone, Debug, PartialEq, Eq)]
#[serde(default)]
pub struct Config {
    /// Product name used in the announcement text
    pub product_name: String,
    /// Project keys recognised as ticket references
    pub ticket_prefixes: Vec<String>,
    /// Base URL of the Jira REST API
    pub jira_url: String,
    /// Prefix of the human-facing ticket links
    pub ticket_browse_url: String,
    /// Base URL of the GitHub web interface, used for PR links
    pub github_web_url: String,
    /// Network and execution settings
    pub performance: PerformanceConfig,
}

/// Network and execution configuration
#[derive(Deserialize, Serialize, Clone, Debug, PartialEq, Eq)]
#[serde(default)]
pub struct PerformanceConfig {
    /// Maximum number of ticket lookups in flight at once
    pub max_concurrent_lookups: usize,
    /// Timeout for every outbound HTTP request, in seconds
    pub request_timeout_seconds: u64,
    /// Retries for GitHub reads after the first attempt
    pub retry_attempts: usize,
    /// Whether to include HTTP library logs in the log output
    pub verbose_logging: bool,
}

impl Default for PerformanceConfig {
    fn default() -> Self {
        Self {
            max_concurrent_lookups: 5,
            request_timeout_seconds: 30,
            retry_attempts: 2,
            verbose_logging: false,
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            product_name: "FEv2".to_string(),
            ticket_prefixes: DEFAULT_PROJECT_PREFIXES
                .iter()
                .map(ToString::to_string)
                .collect(),
            jira_url: "https://purch1.atlassian.net".to_string(),
            ticket_browse_url: "https://myvouchercodes.atlassian.net/browse/".to_string(),
            github_web_url: "https://github.com".to_string(),
            performance: PerformanceConfig::default(),
        }
    }
}

impl Config {
    /// Loads the configuration.
    ///
    /// An explicit `path` must exist. Without one, the project config in the
    /// working directory is used when present, and the defaults otherwise.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let config = match path {
            Some(path) => Self::from_file(path)?,
            None => {
                let project_path = Path::new(PROJECT_CONFIG_FILENAME);
                if project_path.exists() {
                    Self::from_file(project_path)?
                } else {
                    log_debug!("No project configuration found, using defaults");
                    Self::default()
                }
            }
        };

        config.validate()?;
        log_debug!("Configuration loaded: {:?}", config);
        Ok(config)
    }

    /// Reads a TOML configuration file; missing keys keep their defaults
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;

        toml::from_str(&content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.ticket_prefixes.iter().all(|prefix| prefix.trim().is_empty()) {
            return Err(ConfigError::NoTicketPrefixes);
        }
        Ok(())
    }

    /// Ticket matcher for the configured project prefixes
    pub fn ticket_matcher(&self) -> Result<TicketMatcher> {
        TicketMatcher::new(&self.ticket_prefixes)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.performance.request_timeout_seconds.max(1))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn write_config(content: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().expect("Failed to create temp file");
        file.write_all(content.as_bytes())
            .expect("Failed to write config");
        file
    }

    #[test]
    fn test_partial_file_keeps_defaults() {
        let file = write_config(
            r#"
product_name = "Storefront"

[performance]
max_concurrent_lookups = 2
"#,
        );

        let config = Config::load(Some(file.path())).expect("Failed to load config");
        assert_eq!(config.product_name, "Storefront");
        assert_eq!(config.performance.max_concurrent_lookups, 2);
        assert_eq!(config.performance.request_timeout_seconds, 30);
        assert_eq!(config.ticket_prefixes, Config::default().ticket_prefixes);
    }

    #[test]
    fn test_custom_prefixes_drive_the_matcher() {
        let file = write_config(r#"ticket_prefixes = ["CORE", "web"]"#);
        let config = Config::load(Some(file.path())).expect("Failed to load config");
        let matcher = config.ticket_matcher().expect("Failed to build matcher");

        assert_eq!(
            matcher.first_key("web 12").map(|key| key.to_string()),
            Some("WEB-12".to_string())
        );
        assert!(matcher.first_key("FR-1").is_none());
    }

    #[test]
    fn test_empty_prefix_list_is_rejected() {
        let file = write_config("ticket_prefixes = []");
        assert!(matches!(
            Config::load(Some(file.path())),
            Err(ConfigError::NoTicketPrefixes)
        ));
    }

    #[test]
    fn test_invalid_toml_is_reported() {
        let file = write_config("product_name = ");
        assert!(matches!(
            Config::load(Some(file.path())),
            Err(ConfigError::Parse { .. })
        ));
    }

    #[test]
    fn test_missing_explicit_file_is_an_error() {
        let result = Config::load(Some(Path::new("/nonexistent/release-announcer.toml")));
        assert!(matches!(result, Err(ConfigError::Read { .. })));
    }
}
