//! Snapshot persistence layer.
//!
//! ## Responsibilities
//!
//! - Create ledger entries in the snapshots table with per-source
//!   monotonic capture times
//! - Atomic commit of snapshot, rule records and reconciliation
//!
//! ## Non-Responsibilities
//!
//! - Fetching and normalizing content (handled by `rulewatch-engine` and
//!   `rulewatch-core`)
//! - Reading history (see [`crate::queries`])

pub mod persist;

// Re-export primary types
pub use persist::{
    commit_capture, insert_snapshot, latest_snapshot_id, CaptureCommit, CaptureContent,
    CommitResult,
};
