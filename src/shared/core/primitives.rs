// Key and property name rules shared by every table operation.
//
// Limits follow the hosted table service: keys up to 1 KiB of characters,
// no path or query separators, no control characters.

use thiserror::Error;

pub const MAX_KEY_LENGTH: usize = 1024;
pub const MAX_PROPERTY_NAME_LENGTH: usize = 255;
pub const DEFAULT_MAX_BATCH_SIZE: usize = 100;

/// System property names that callers cannot set as ordinary properties.
pub const RESERVED_PROPERTY_NAMES: [&str; 4] = ["PartitionKey", "RowKey", "Timestamp", "ETag"];

const FORBIDDEN_KEY_CHARS: [char; 4] = ['/', '\\', '#', '?'];

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum InvalidKeyError {
    #[error("{field} exceeds {max} characters")]
    TooLong { field: &'static str, max: usize },

    #[error("{field} contains forbidden character {character:?}")]
    ForbiddenCharacter { field: &'static str, character: char },

    #[error("property name must not be empty")]
    EmptyPropertyName,

    #[error("property name {0:?} is reserved")]
    ReservedPropertyName(String),
}

pub fn validate_key(field: &'static str, key: &str) -> Result<(), InvalidKeyError> {
    if key.chars().count() > MAX_KEY_LENGTH {
        return Err(InvalidKeyError::TooLong {
            field,
            max: MAX_KEY_LENGTH,
        });
    }
    match key
        .chars()
        .find(|c| FORBIDDEN_KEY_CHARS.contains(c) || c.is_control())
    {
        Some(character) => Err(InvalidKeyError::ForbiddenCharacter { field, character }),
        None => Ok(()),
    }
}

pub fn validate_property_name(name: &str) -> Result<(), InvalidKeyError> {
    if name.is_empty() {
        return Err(InvalidKeyError::EmptyPropertyName);
    }
    if RESERVED_PROPERTY_NAMES.contains(&name) {
        return Err(InvalidKeyError::ReservedPropertyName(name.to_string()));
    }
    if name.chars().count() > MAX_PROPERTY_NAME_LENGTH {
        return Err(InvalidKeyError::TooLong {
            field: "property name",
            max: MAX_PROPERTY_NAME_LENGTH,
        });
    }
    Ok(())
}
