//! Service configuration
//!
//! JSON file, every field optional:
//!
//! ```json
//! {
//!   "templates_dir": "./stored_queries",
//!   "query_timeout_ms": 30000,
//!   "include_builtin_templates": true,
//!   "log_level": "info"
//! }
//! ```

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use super::errors::{CliError, CliResult};
use crate::observability::Severity;

/// Configuration file structure
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServiceConfig {
    /// Directory of stored query definitions (optional)
    #[serde(default)]
    pub templates_dir: Option<String>,

    /// Execution deadline in milliseconds (optional, default 30000)
    #[serde(default = "default_query_timeout_ms")]
    pub query_timeout_ms: u64,

    /// Register the compiled-in stored queries (optional, default true)
    #[serde(default = "default_include_builtin")]
    pub include_builtin_templates: bool,

    /// Minimum log severity (optional, default "info")
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

fn default_query_timeout_ms() -> u64 {
    30_000
}
fn default_include_builtin() -> bool {
    true
}
fn default_log_level() -> String {
    "info".to_string()
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            templates_dir: None,
            query_timeout_ms: default_query_timeout_ms(),
            include_builtin_templates: default_include_builtin(),
            log_level: default_log_level(),
        }
    }
}

impl ServiceConfig {
    /// Load configuration from file
    pub fn load(path: &Path) -> CliResult<Self> {
        let content = fs::read_to_string(path)
            .map_err(|e| CliError::config_error(format!("Failed to read config: {}", e)))?;

        Self::parse(&content)
    }

    /// Parse and validate configuration JSON
    pub fn parse(content: &str) -> CliResult<Self> {
        let config: ServiceConfig = serde_json::from_str(content)
            .map_err(|e| CliError::config_error(format!("Invalid config JSON: {}", e)))?;

        config.validate()?;

        Ok(config)
    }

    fn validate(&self) -> CliResult<()> {
        if self.query_timeout_ms == 0 {
            return Err(CliError::config_error("query_timeout_ms must be > 0"));
        }

        if Severity::parse(&self.log_level).is_none() {
            return Err(CliError::config_error(format!(
                "Invalid log_level: '{}'",
                self.log_level
            )));
        }

        if !self.include_builtin_templates && self.templates_dir.is_none() {
            return Err(CliError::config_error(
                "templates_dir is required when include_builtin_templates is false",
            ));
        }

        Ok(())
    }

    pub fn query_timeout(&self) -> Duration {
        Duration::from_millis(self.query_timeout_ms)
    }

    pub fn templates_path(&self) -> Option<PathBuf> {
        self.templates_dir.as_ref().map(PathBuf::from)
    }

    pub fn severity(&self) -> Severity {
        Severity::parse(&self.log_level).unwrap_or(Severity::Info)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_defaults() {
        let config = ServiceConfig::parse("{}").unwrap();
        assert_eq!(config, ServiceConfig::default());
        assert_eq!(config.query_timeout(), Duration::from_secs(30));
        assert!(config.include_builtin_templates);
        assert_eq!(config.severity(), Severity::Info);
    }

    #[test]
    fn test_zero_timeout_rejected() {
        let err = ServiceConfig::parse(r#"{"query_timeout_ms": 0}"#).unwrap_err();
        assert!(err.message().contains("query_timeout_ms"));
    }

    #[test]
    fn test_invalid_log_level_rejected() {
        assert!(ServiceConfig::parse(r#"{"log_level": "loud"}"#).is_err());
    }

    #[test]
    fn test_no_templates_rejected() {
        assert!(ServiceConfig::parse(r#"{"include_builtin_templates": false}"#).is_err());
    }

    #[test]
    fn test_load_from_file() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("storedq.json");
        fs::write(
            &path,
            r#"{"templates_dir": "/srv/stored_queries", "query_timeout_ms": 500}"#,
        )
        .unwrap();

        let config = ServiceConfig::load(&path).unwrap();
        assert_eq!(config.templates_path(), Some(PathBuf::from("/srv/stored_queries")));
        assert_eq!(config.query_timeout(), Duration::from_millis(500));
    }

    #[test]
    fn test_missing_file() {
        let temp_dir = TempDir::new().unwrap();
        let err = ServiceConfig::load(&temp_dir.path().join("absent.json")).unwrap_err();
        assert!(err.message().contains("Failed to read config"));
    }
}
