//! Operation logging macros
//!
//! An operation logs one `start` event and then exactly one of `end` or
//! `end_error`. The closing macros take the [`Instant`](std::time::Instant)
//! the operation started at and derive `duration_ms` from it, so call sites
//! never compute durations themselves.
//!
//! Extra fields use ordinary `tracing` syntax (`name = value`, `%display`,
//! `?debug`).

#[doc(hidden)]
#[macro_export]
macro_rules! __log_op_event {
    ($level:ident, $op:expr, $event:expr $(, $($field:tt)*)?) => {
        tracing::$level!(
            component = module_path!(),
            op = $op,
            event = $event
            $(, $($field)*)?
        )
    };
}

/// Log the start of an operation
///
/// ```
/// # use rulewatch_core::log_op_start;
/// log_op_start!("capture_snapshot");
/// log_op_start!("capture_snapshot", source_id = "easylist");
/// ```
#[macro_export]
macro_rules! log_op_start {
    ($op:expr $(, $($field:tt)*)?) => {
        $crate::__log_op_event!(
            info,
            $op,
            $crate::logging_facility::schema::EVENT_START
            $(, $($field)*)?
        )
    };
}

/// Log the successful end of an operation
///
/// ```
/// # use rulewatch_core::log_op_end;
/// let started = std::time::Instant::now();
/// log_op_end!("capture_snapshot", started, rules_added = 3);
/// ```
#[macro_export]
macro_rules! log_op_end {
    ($op:expr, $started:expr $(, $($field:tt)*)?) => {
        $crate::__log_op_event!(
            info,
            $op,
            $crate::logging_facility::schema::EVENT_END,
            duration_ms = $crate::logging_facility::elapsed_ms($started)
            $(, $($field)*)?
        )
    };
}

/// Log a failed operation
///
/// The error may be anything convertible into
/// [`ExError`](crate::errors::ExError); its kind, code and message become
/// `err_kind`, `err_code` and `err_message`.
///
/// ```
/// # use rulewatch_core::{log_op_error, errors::{ExError, ExErrorKind}};
/// let started = std::time::Instant::now();
/// let err = ExError::new(ExErrorKind::Persistence);
/// log_op_error!("capture_snapshot", err, started, source_id = "easylist");
/// ```
#[macro_export]
macro_rules! log_op_error {
    ($op:expr, $err:expr, $started:expr $(, $($field:tt)*)?) => {{
        let ex_err: $crate::errors::ExError = $err.into();
        $crate::__log_op_event!(
            error,
            $op,
            $crate::logging_facility::schema::EVENT_END_ERROR,
            duration_ms = $crate::logging_facility::elapsed_ms($started),
            err_kind = ?ex_err.kind(),
            err_code = ex_err.code(),
            err_message = ex_err.message()
            $(, $($field)*)?
        )
    }};
}
