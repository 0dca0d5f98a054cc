//! Request correlation id sent with every command to the PBX
//!
//! Rendered as the current Unix time in nanoseconds. Uniqueness is
//! best-effort: two commands built within the same nanosecond share an id.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Correlation id for a PBX request (`src` / `id` on the wire)
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RequestId(String);

impl RequestId {
    /// Create an id from the current wall clock
    pub fn now() -> Self {
        let nanos = chrono::Utc::now()
            .timestamp_nanos_opt()
            .unwrap_or_default();
        Self(nanos.to_string())
    }

    /// Create an id from an explicit value
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    /// Get the id as a string slice
    #[inline]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RequestId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
