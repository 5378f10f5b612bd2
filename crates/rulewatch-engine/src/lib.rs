//! rulewatch Engine - capture orchestration
//!
//! Coordinates the HTTP fetcher, the normalizer in `rulewatch-core` and the
//! transactional commit in `rulewatch-store`, one source at a time or many
//! in parallel.

pub mod capture;
pub mod config;
pub mod fetch;

pub use capture::{
    capture_all, capture_snapshot, CaptureOutcome, CaptureReport, CaptureSettings, SourceCapture,
};
pub use config::RuleWatchConfig;
pub use fetch::{ContentFetcher, FetchOutcome, HttpFetcher, TransportErrorKind};
