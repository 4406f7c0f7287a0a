// Version tokens.
//
// An ETag is opaque to callers. The generator combines the write time with a
// store-wide sequence number so two writes in the same clock tick still get
// distinct tokens, and no token is ever handed out twice.

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

const WILDCARD: &str = "*";

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ETag(String);

impl ETag {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    /// Matches whatever version is currently stored.
    pub fn any() -> Self {
        Self(WILDCARD.to_string())
    }

    pub fn is_any(&self) -> bool {
        self.0 == WILDCARD
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// True when a write guarded by `self` may proceed over `current`.
    pub fn matches(&self, current: &ETag) -> bool {
        self.is_any() || self == current
    }
}

impl fmt::Display for ETag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Default)]
pub struct ETagGenerator {
    sequence: AtomicU64,
}

impl ETagGenerator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn next(&self, written_at: DateTime<Utc>) -> ETag {
        let sequence = self.sequence.fetch_add(1, Ordering::Relaxed) + 1;
        ETag(format!(
            "W/\"datetime'{}'.{sequence}\"",
            written_at.to_rfc3339_opts(SecondsFormat::Nanos, true)
        ))
    }
}
