// Store settings read from the environment.

use crate::shared::core::primitives::DEFAULT_MAX_BATCH_SIZE;
use thiserror::Error;

pub const MAX_BATCH_SIZE_VAR: &str = "TABLES_MAX_BATCH_SIZE";

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{var} must be a positive integer, got {value:?}")]
    InvalidNumber { var: &'static str, value: String },

    #[error("failed to load .env: {0}")]
    Dotenv(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreConfig {
    pub max_batch_size: usize,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            max_batch_size: DEFAULT_MAX_BATCH_SIZE,
        }
    }
}

impl StoreConfig {
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let max_batch_size = match lookup(MAX_BATCH_SIZE_VAR) {
            Some(value) => parse_positive(MAX_BATCH_SIZE_VAR, &value)?,
            None => DEFAULT_MAX_BATCH_SIZE,
        };
        Ok(Self { max_batch_size })
    }
}

fn parse_positive(var: &'static str, value: &str) -> Result<usize, ConfigError> {
    match value.trim().parse::<usize>() {
        Ok(n) if n > 0 => Ok(n),
        _ => Err(ConfigError::InvalidNumber {
            var,
            value: value.to_string(),
        }),
    }
}
