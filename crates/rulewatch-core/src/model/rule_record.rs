use serde::{Deserialize, Serialize};

/// The validity interval of one rule for one source
///
/// A record is live while `removed_by` is `None`. At most one live record
/// exists per `(source_id, rule)`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RuleRecord {
    pub id: i64,
    pub source_id: String,
    pub rule: String,
    pub added_by: String,
    pub removed_by: Option<String>,
}

impl RuleRecord {
    pub fn is_live(&self) -> bool {
        self.removed_by.is_none()
    }
}
