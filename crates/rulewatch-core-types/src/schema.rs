//! Names shared by the logging macros and the code that reads their events

// Field keys read back from captured events
pub const FIELD_OP: &str = "op";
pub const FIELD_EVENT: &str = "event";
pub const FIELD_DURATION_MS: &str = "duration_ms";
pub const FIELD_SOURCE_ID: &str = "source_id";
pub const FIELD_SNAPSHOT_ID: &str = "snapshot_id";
pub const FIELD_ERR_CODE: &str = "err_code";

// Operation phases
pub const EVENT_START: &str = "start";
pub const EVENT_END: &str = "end";
pub const EVENT_END_ERROR: &str = "end_error";

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_names_are_distinct() {
        assert_ne!(EVENT_START, EVENT_END);
        assert_ne!(EVENT_START, EVENT_END_ERROR);
        assert_ne!(EVENT_END, EVENT_END_ERROR);
    }

    #[test]
    fn test_field_keys_are_distinct() {
        let fields = [
            FIELD_OP,
            FIELD_EVENT,
            FIELD_DURATION_MS,
            FIELD_SOURCE_ID,
            FIELD_SNAPSHOT_ID,
            FIELD_ERR_CODE,
        ];
        let unique: std::collections::HashSet<_> = fields.iter().collect();
        assert_eq!(unique.len(), fields.len());
    }
}
