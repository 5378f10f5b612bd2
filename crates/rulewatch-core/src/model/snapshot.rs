use serde::{Deserialize, Serialize};

/// Outcome status recorded on a snapshot
///
/// `Http` holds the status code of any completed HTTP exchange, successful
/// or not. `Unknown` marks a transport failure where no status line was
/// obtained.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FetchStatus {
    Http(u16),
    Unknown,
}

impl FetchStatus {
    /// Build from the nullable column value
    pub fn from_code(code: Option<u16>) -> Self {
        code.map_or(FetchStatus::Unknown, FetchStatus::Http)
    }

    /// The numeric status, absent for transport failures
    pub fn code(&self) -> Option<u16> {
        match self {
            FetchStatus::Http(code) => Some(*code),
            FetchStatus::Unknown => None,
        }
    }

    /// Whether the status is in the 2xx range
    pub fn is_success(&self) -> bool {
        matches!(self, FetchStatus::Http(code) if (200..300).contains(code))
    }
}

impl std::fmt::Display for FetchStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FetchStatus::Http(code) => write!(f, "{}", code),
            FetchStatus::Unknown => write!(f, "unknown"),
        }
    }
}

/// One fetch attempt for a source
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Snapshot {
    /// UUIDv7, so ids sort by creation time
    pub snapshot_id: String,
    pub source_id: String,
    /// The URL that was fetched, as it was at capture time
    pub source_url: String,
    /// Milliseconds since the Unix epoch, strictly increasing per source
    pub captured_at: i64,
    pub status: FetchStatus,
    /// SHA-256 of the fetched body; only set when content was obtained
    pub content_digest: Option<String>,
}

impl Snapshot {
    /// Generate a fresh snapshot id
    pub fn new_id() -> String {
        uuid::Uuid::now_v7().to_string()
    }

    /// Capture time as a UTC datetime
    pub fn captured_at_utc(&self) -> Option<chrono::DateTime<chrono::Utc>> {
        chrono::DateTime::from_timestamp_millis(self.captured_at)
    }
}
