//! Correlation types for capture tracking
//!
//! Every capture gets its own [`RequestId`] so that log lines emitted by the
//! fetcher, the writer and the reconciler can be tied back to one run, even
//! when many sources are captured in parallel.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique identifier for a single capture run
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RequestId(String);

impl RequestId {
    /// Generate a new random RequestId using UUIDv7
    pub fn new() -> Self {
        Self(Uuid::now_v7().to_string())
    }

    /// Get the string representation
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Create from an existing string (for deserialization)
    pub fn from_string(s: String) -> Self {
        Self(s)
    }
}

impl Default for RequestId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for RequestId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Context carried through one capture for correlation
#[derive(Debug, Clone)]
pub struct RequestContext {
    pub request_id: RequestId,
    pub source_id: Option<String>,
}

impl RequestContext {
    /// Create a new context with a fresh RequestId
    pub fn new() -> Self {
        Self {
            request_id: RequestId::new(),
            source_id: None,
        }
    }

    /// Create a context scoped to one source
    pub fn for_source(source_id: impl Into<String>) -> Self {
        Self {
            request_id: RequestId::new(),
            source_id: Some(source_id.into()),
        }
    }
}

impl Default for RequestContext {
    fn default() -> Self {
        Self::new()
    }
}
