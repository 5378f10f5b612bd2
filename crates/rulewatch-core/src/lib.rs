//! rulewatch Core - domain kernel for rule list change tracking
//!
//! This crate provides the pieces of a capture that do not touch the
//! network or the database:
//! - Source, Snapshot and RuleRecord models
//! - The rule normalizer (line splitting, linting, in-batch dedup)
//! - The reconciliation planner (removed / duplicate / added)
//! - The static source discovery mapping
//! - The structured error and logging facilities

pub mod digest;
pub mod discovery;
pub mod errors;
pub mod logging_facility;
pub mod model;
pub mod normalize;
pub mod reconcile;

// Re-export commonly used types
pub use errors::{ExError, ExErrorKind, Result, RuleWatchError};
pub use model::{FetchStatus, RuleRecord, Snapshot, Source};
pub use normalize::{normalize_rules, NormalizeStats, NormalizedRules};
pub use reconcile::{plan_reconciliation, LiveRecord, ReconcilePlan};
