use crate::shared::infrastructure::entity_store::config::{ConfigError, StoreConfig};

pub const TABLE_NAME_VAR: &str = "TABLES_TABLE_NAME";
pub const LOG_FILTER_VAR: &str = "RUST_LOG";

const DEFAULT_TABLE_NAME: &str = "entitytablesplayground";
const DEFAULT_LOG_FILTER: &str = "info,entity_tables=debug";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShellConfig {
    pub table_name: String,
    pub log_filter: String,
    pub store: StoreConfig,
}

impl ShellConfig {
    /// Loads `.env` when present, then reads the process environment.
    pub fn load() -> Result<Self, ConfigError> {
        tolerate_missing_dotenv(dotenvy::dotenv())?;
        Self::from_lookup(|var| std::env::var(var).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        Ok(Self {
            table_name: lookup(TABLE_NAME_VAR)
                .filter(|name| !name.trim().is_empty())
                .map(|name| name.to_lowercase())
                .unwrap_or_else(|| DEFAULT_TABLE_NAME.to_string()),
            log_filter: lookup(LOG_FILTER_VAR).unwrap_or_else(|| DEFAULT_LOG_FILTER.to_string()),
            store: StoreConfig::from_lookup(&lookup)?,
        })
    }
}

/// A missing .env file is fine, the variables may come from the shell.
/// Any other failure, such as a malformed line, is reported.
fn tolerate_missing_dotenv<T>(result: dotenvy::Result<T>) -> Result<(), ConfigError> {
    match result {
        Ok(_) => Ok(()),
        Err(error) if error.not_found() => Ok(()),
        Err(error) => Err(ConfigError::Dotenv(error.to_string())),
    }
}
