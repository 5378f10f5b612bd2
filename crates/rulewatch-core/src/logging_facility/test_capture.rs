//! In-memory event capture for logging assertions
//!
//! [`init_test_capture`] installs a global subscriber that records every
//! event. Tests in one binary share it, so assertions filter on an op name
//! or an id unique to the test.

use rulewatch_core_types::schema::{
    FIELD_DURATION_MS, FIELD_ERR_CODE, FIELD_EVENT, FIELD_OP, FIELD_SNAPSHOT_ID, FIELD_SOURCE_ID,
};
use std::collections::BTreeMap;
use std::fmt;
use std::sync::{Arc, Mutex, OnceLock};
use tracing::field::{Field, Visit};
use tracing::{Event, Level, Subscriber};
use tracing_subscriber::layer::{Context, SubscriberExt};
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::Layer;

type EventLog = Arc<Mutex<Vec<CapturedEvent>>>;

/// One recorded event, fields rendered as strings
#[derive(Clone, Debug)]
pub struct CapturedEvent {
    pub level: Level,
    pub fields: BTreeMap<String, String>,
}

impl CapturedEvent {
    pub fn field(&self, name: &str) -> Option<&str> {
        self.fields.get(name).map(String::as_str)
    }

    pub fn op(&self) -> Option<&str> {
        self.field(FIELD_OP)
    }

    pub fn event(&self) -> Option<&str> {
        self.field(FIELD_EVENT)
    }

    /// True for the `event` phase of operation `op`
    pub fn is(&self, op: &str, event: &str) -> bool {
        self.op() == Some(op) && self.event() == Some(event)
    }

    pub fn source_id(&self) -> Option<&str> {
        self.field(FIELD_SOURCE_ID)
    }

    pub fn snapshot_id(&self) -> Option<&str> {
        self.field(FIELD_SNAPSHOT_ID)
    }

    pub fn err_code(&self) -> Option<&str> {
        self.field(FIELD_ERR_CODE)
    }

    pub fn duration_ms(&self) -> Option<u64> {
        self.field(FIELD_DURATION_MS).and_then(|d| d.parse().ok())
    }
}

/// Strings are kept verbatim; everything else goes through `Debug`, which
/// prints integers and booleans plainly.
struct FieldRecorder<'a>(&'a mut BTreeMap<String, String>);

impl Visit for FieldRecorder<'_> {
    fn record_str(&mut self, field: &Field, value: &str) {
        self.0.insert(field.name().to_string(), value.to_string());
    }

    fn record_debug(&mut self, field: &Field, value: &dyn fmt::Debug) {
        self.0.insert(field.name().to_string(), format!("{:?}", value));
    }
}

struct CaptureLayer {
    log: EventLog,
}

impl<S: Subscriber> Layer<S> for CaptureLayer {
    fn on_event(&self, event: &Event<'_>, _ctx: Context<'_, S>) {
        let mut fields = BTreeMap::new();
        event.record(&mut FieldRecorder(&mut fields));
        if let Ok(mut log) = self.log.lock() {
            log.push(CapturedEvent {
                level: *event.metadata().level(),
                fields,
            });
        }
    }
}

/// Read handle on the captured events
#[derive(Clone)]
pub struct TestCapture {
    log: EventLog,
}

impl TestCapture {
    /// Snapshot of everything captured so far
    pub fn events(&self) -> Vec<CapturedEvent> {
        self.log.lock().map(|log| log.clone()).unwrap_or_default()
    }

    pub fn count_events<F>(&self, predicate: F) -> usize
    where
        F: Fn(&CapturedEvent) -> bool,
    {
        self.log
            .lock()
            .map(|log| log.iter().filter(|e| predicate(e)).count())
            .unwrap_or(0)
    }

    /// # Panics
    ///
    /// Panics if no `event` phase of `op` was captured.
    pub fn assert_event_exists(&self, op: &str, event: &str) {
        assert!(
            self.count_events(|e| e.is(op, event)) > 0,
            "no {} event captured for op {}",
            event,
            op
        );
    }
}

static CAPTURE: OnceLock<TestCapture> = OnceLock::new();

/// Install the capture subscriber on first call and return its handle
///
/// ```
/// use rulewatch_core::logging_facility::test_capture::init_test_capture;
/// use rulewatch_core::log_op_start;
///
/// let capture = init_test_capture();
/// log_op_start!("doc_example_op");
/// capture.assert_event_exists("doc_example_op", "start");
/// ```
pub fn init_test_capture() -> TestCapture {
    CAPTURE
        .get_or_init(|| {
            let log = EventLog::default();
            tracing_subscriber::registry()
                .with(CaptureLayer { log: log.clone() })
                .init();
            TestCapture { log }
        })
        .clone()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_typed_accessors_read_fields() {
        let fields: BTreeMap<String, String> = [
            ("op", "capture_snapshot"),
            ("event", "end"),
            ("source_id", "easylist"),
            ("duration_ms", "17"),
        ]
        .into_iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();
        let event = CapturedEvent {
            level: Level::INFO,
            fields,
        };

        assert!(event.is("capture_snapshot", "end"));
        assert!(!event.is("capture_snapshot", "start"));
        assert_eq!(event.source_id(), Some("easylist"));
        assert_eq!(event.duration_ms(), Some(17));
        assert_eq!(event.snapshot_id(), None);
        assert_eq!(event.err_code(), None);
    }
}
