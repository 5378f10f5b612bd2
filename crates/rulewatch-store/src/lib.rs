//! rulewatch Store - SQLite persistence for snapshots and rule records
//!
//! Provides:
//! - Connection management and migrations with checksums
//! - The snapshot ledger and the transactional capture commit
//! - The batched rule writer and the reconciliation applier
//! - Read queries over snapshots and live rules

pub mod db;
pub mod errors;
pub mod migrations;
pub mod queries;
pub mod rules;
pub mod snapshot;

// Re-export key types
pub use errors::Result;
pub use snapshot::{commit_capture, CaptureCommit, CaptureContent, CommitResult};
