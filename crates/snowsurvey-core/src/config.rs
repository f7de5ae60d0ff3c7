//! Configuration schema (snowsurvey.toml)

use serde::{Deserialize, Serialize};

/// Connection settings for the warehouse session
///
/// The password is usually left out of the file and supplied through the
/// environment (`SNOWSURVEY_PASSWORD`, falling back to `SNOWFLAKE_PASSWORD`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConnectionConfig {
    /// Account identifier, e.g. `abc-xy12345`
    #[serde(default)]
    pub account: String,

    /// User name
    #[serde(default)]
    pub user: String,

    /// Password; prefer the environment over the file
    #[serde(default)]
    pub password: Option<String>,

    /// Role to assume
    #[serde(default)]
    pub role: Option<String>,

    /// Warehouse to run metadata statements on
    #[serde(default)]
    pub warehouse: Option<String>,
}

impl Default for ConnectionConfig {
    fn default() -> Self {
        Self {
            account: String::new(),
            user: String::new(),
            password: None,
            role: None,
            warehouse: None,
        }
    }
}

impl ConnectionConfig {
    /// Fill unset fields from the environment.
    ///
    /// Each field reads `SNOWSURVEY_<FIELD>` first and the conventional
    /// `SNOWFLAKE_<FIELD>` second, so existing connector environments work
    /// unchanged.
    pub fn with_env_fallbacks(mut self) -> Self {
        fn env_pair(primary: &str, fallback: &str) -> Option<String> {
            std::env::var(primary)
                .or_else(|_| std::env::var(fallback))
                .ok()
                .filter(|v| !v.is_empty())
        }

        if self.account.is_empty() {
            if let Some(v) = env_pair("SNOWSURVEY_ACCOUNT", "SNOWFLAKE_ACCOUNT") {
                self.account = v;
            }
        }
        if self.user.is_empty() {
            if let Some(v) = env_pair("SNOWSURVEY_USER", "SNOWFLAKE_USER") {
                self.user = v;
            }
        }
        if self.password.is_none() {
            self.password = env_pair("SNOWSURVEY_PASSWORD", "SNOWFLAKE_PASSWORD");
        }
        if self.role.is_none() {
            self.role = env_pair("SNOWSURVEY_ROLE", "SNOWFLAKE_ROLE");
        }
        if self.warehouse.is_none() {
            self.warehouse = env_pair("SNOWSURVEY_WAREHOUSE", "SNOWFLAKE_WAREHOUSE");
        }
        self
    }
}

/// Harvest behavior settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HarvestConfig {
    /// Databases skipped by the definitions crawl
    #[serde(default = "default_exclude_databases")]
    pub exclude_databases: Vec<String>,

    /// Row cap for per-table sample data
    #[serde(default = "default_sample_rows")]
    pub sample_rows: usize,
}

fn default_exclude_databases() -> Vec<String> {
    vec!["SNOWFLAKE_SAMPLE_DATA".to_string()]
}

fn default_sample_rows() -> usize {
    10
}

impl Default for HarvestConfig {
    fn default() -> Self {
        Self {
            exclude_databases: default_exclude_databases(),
            sample_rows: default_sample_rows(),
        }
    }
}

impl HarvestConfig {
    /// True when the definitions crawl should skip this database.
    /// Comparison is case-insensitive, matching how the warehouse folds names.
    pub fn is_database_excluded(&self, name: &str) -> bool {
        self.exclude_databases
            .iter()
            .any(|e| e.eq_ignore_ascii_case(name))
    }
}

/// Main configuration structure
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct Config {
    /// Warehouse connection settings
    #[serde(default)]
    pub connection: ConnectionConfig,

    /// Harvest behavior
    #[serde(default)]
    pub harvest: HarvestConfig,
}

impl Config {
    /// Load config from TOML file
    pub fn from_file(path: &std::path::Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)
            .map_err(|e| ConfigError::IoError(e.to_string()))?;
        Self::from_toml(&contents)
    }

    /// Load config from TOML string
    pub fn from_toml(toml: &str) -> Result<Self, ConfigError> {
        toml::from_str(toml).map_err(|e| ConfigError::ParseError(e.to_string()))
    }

    /// Save config to TOML file
    pub fn save_to_file(&self, path: &std::path::Path) -> Result<(), ConfigError> {
        let toml = toml::to_string_pretty(self)
            .map_err(|e| ConfigError::SerializeError(e.to_string()))?;
        std::fs::write(path, toml).map_err(|e| ConfigError::IoError(e.to_string()))?;
        Ok(())
    }
}

/// Config error types
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    IoError(String),

    #[error("Parse error: {0}")]
    ParseError(String),

    #[error("Serialize error: {0}")]
    SerializeError(String),
}
