//! Domain models: sources, snapshots and rule records

pub mod rule_record;
pub mod snapshot;
pub mod source;

pub use rule_record::RuleRecord;
pub use snapshot::{FetchStatus, Snapshot};
pub use source::Source;
