//! Snapshot capture orchestration.
//!
//! ## Pipeline (per source, strictly sequential):
//! 1. Take the requested capture time
//! 2. Fetch, raced against the timeout and the cancellation token
//! 3. On success: normalize the body and digest it
//! 4. Commit snapshot, rule batches and reconciliation in one transaction
//!    on a blocking worker
//!
//! Cancellation during the fetch persists nothing. A timeout is a fetch
//! outcome like any other and is recorded.

use crate::config::RuleWatchConfig;
use crate::fetch::{ContentFetcher, FetchOutcome};
use futures::stream::{self, StreamExt};
use rulewatch_core::digest::content_digest;
use rulewatch_core::errors::{ExError, ExErrorKind};
use rulewatch_core::model::{FetchStatus, Source};
use rulewatch_core::normalize::normalize_rules;
use rulewatch_core::{log_op_end, log_op_error, log_op_start};
use rulewatch_core_types::RequestContext;
use rulewatch_store::db::open_ready;
use rulewatch_store::{commit_capture, CaptureCommit, CaptureContent, CommitResult};
use std::path::PathBuf;
use std::time::{Duration, Instant};
use tokio_util::sync::CancellationToken;
use tracing::Instrument;

/// What happened to a capture that was recorded
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CaptureOutcome {
    /// Content was fetched and the live set reconciled
    Reconciled,
    /// Non-2xx status recorded; live set untouched
    HttpFailure,
    /// No status obtained; live set untouched
    TransportFailure,
}

/// Summary of one recorded capture
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CaptureReport {
    pub snapshot_id: String,
    pub source_id: String,
    pub captured_at: i64,
    pub status: FetchStatus,
    pub outcome: CaptureOutcome,
    /// Distinct rules in the fetched content
    pub rules_observed: usize,
    pub added: usize,
    pub removed: usize,
    pub unchanged: usize,
}

impl CaptureReport {
    fn from_commit(result: CommitResult, outcome: CaptureOutcome, rules_observed: usize) -> Self {
        let (added, removed, unchanged) = result
            .plan
            .as_ref()
            .map_or((0, 0, 0), |p| (p.added.len(), p.removed.len(), p.unchanged()));
        Self {
            snapshot_id: result.snapshot.snapshot_id,
            source_id: result.snapshot.source_id,
            captured_at: result.snapshot.captured_at,
            status: result.snapshot.status,
            outcome,
            rules_observed,
            added,
            removed,
            unchanged,
        }
    }
}

/// Settings shared by every capture of a run
#[derive(Debug, Clone)]
pub struct CaptureSettings {
    pub db_path: PathBuf,
    pub fetch_timeout: Duration,
    pub batch_size: usize,
    pub concurrency: usize,
}

impl CaptureSettings {
    pub fn from_config(config: &RuleWatchConfig) -> Self {
        Self {
            db_path: config.database.path.clone(),
            fetch_timeout: config.fetch.timeout(),
            batch_size: config.capture.batch_size,
            concurrency: config.capture.concurrency,
        }
    }
}

/// Result of one source within [`capture_all`]
#[derive(Debug)]
pub struct SourceCapture {
    pub source_id: String,
    pub result: Result<CaptureReport, ExError>,
}

/// Capture one source.
///
/// Fetch failures are recorded and returned as a report; only cancellation
/// and persistence problems are errors.
///
/// # Errors
///
/// - `Cancelled` if the token fires before the fetch completes
/// - `Persistence`, `InvalidInput` or `InvariantViolation` from the commit
/// - `Internal` if the commit worker panics
pub async fn capture_snapshot<F>(
    fetcher: &F,
    source: &Source,
    settings: &CaptureSettings,
    cancel: &CancellationToken,
) -> Result<CaptureReport, ExError>
where
    F: ContentFetcher + ?Sized,
{
    let ctx = RequestContext::for_source(&source.id);
    let span = tracing::info_span!(
        "capture",
        source_id = %source.id,
        request_id = %ctx.request_id
    );

    async {
        let start = Instant::now();
        log_op_start!("capture_snapshot", source_id = %source.id, url = %source.url);

        match run_capture(fetcher, source, settings, cancel).await {
            Ok(report) => {
                log_op_end!(
                    "capture_snapshot",
                    start,
                    source_id = %report.source_id,
                    snapshot_id = %report.snapshot_id,
                    http_status = %report.status,
                    rules_observed = report.rules_observed,
                    rules_added = report.added,
                    rules_removed = report.removed,
                    rules_unchanged = report.unchanged
                );
                Ok(report)
            }
            Err(err) => {
                let err = err.with_request_id(ctx.request_id.clone());
                log_op_error!(
                    "capture_snapshot",
                    err.clone(),
                    start,
                    source_id = %source.id
                );
                Err(err)
            }
        }
    }
    .instrument(span)
    .await
}

async fn run_capture<F>(
    fetcher: &F,
    source: &Source,
    settings: &CaptureSettings,
    cancel: &CancellationToken,
) -> Result<CaptureReport, ExError>
where
    F: ContentFetcher + ?Sized,
{
    let requested_at = chrono::Utc::now().timestamp_millis();

    let outcome = tokio::select! {
        biased;
        _ = cancel.cancelled() => {
            return Err(ExError::new(ExErrorKind::Cancelled)
                .with_op("capture_snapshot")
                .with_source_id(source.id.clone())
                .with_message("capture cancelled during fetch"));
        }
        fetched = tokio::time::timeout(settings.fetch_timeout, fetcher.fetch(&source.url)) => {
            fetched.unwrap_or_else(|_| {
                FetchOutcome::timeout(format!(
                    "no response within {}s",
                    settings.fetch_timeout.as_secs_f64()
                ))
            })
        }
    };

    let status = outcome.status();
    let (content, capture_outcome, rules_observed) = match outcome {
        FetchOutcome::Success { body, .. } => {
            let normalized = normalize_rules(&body);
            tracing::debug!(
                lines = normalized.stats.lines,
                dropped = normalized.stats.dropped,
                duplicates = normalized.stats.duplicates,
                rules = normalized.len(),
                "Normalized content"
            );
            let observed = normalized.len();
            let content = CaptureContent {
                content_digest: content_digest(&body),
                rules: normalized.rules,
            };
            (Some(content), CaptureOutcome::Reconciled, observed)
        }
        FetchOutcome::HttpFailure { status } => {
            tracing::warn!(http_status = status, "Fetch returned failure status");
            (None, CaptureOutcome::HttpFailure, 0)
        }
        FetchOutcome::TransportFailure { kind, message } => {
            tracing::warn!(kind = %kind, error = %message, "Fetch failed before a response");
            (None, CaptureOutcome::TransportFailure, 0)
        }
    };

    let commit = CaptureCommit {
        source_id: source.id.clone(),
        source_url: source.url.to_string(),
        requested_at,
        status,
        content,
        batch_size: settings.batch_size,
    };

    let db_path = settings.db_path.clone();
    let result = tokio::task::spawn_blocking(move || {
        let mut conn = open_ready(&db_path)?;
        commit_capture(&mut conn, commit)
    })
    .await
    .map_err(|e| {
        ExError::new(ExErrorKind::Internal)
            .with_op("capture_snapshot")
            .with_source_id(source.id.clone())
            .with_message(format!("commit worker failed: {}", e))
    })??;

    Ok(CaptureReport::from_commit(
        result,
        capture_outcome,
        rules_observed,
    ))
}

/// Capture many sources with bounded parallelism.
///
/// The database is migrated once up front; each capture then commits on
/// its own connection. Results come back in completion order, one per
/// source, and one source's error never affects another's.
///
/// # Errors
///
/// Only a failure to open or migrate the database fails the whole run.
pub async fn capture_all<F>(
    fetcher: &F,
    sources: Vec<Source>,
    settings: &CaptureSettings,
    cancel: &CancellationToken,
) -> Result<Vec<SourceCapture>, ExError>
where
    F: ContentFetcher + ?Sized,
{
    let start = Instant::now();
    log_op_start!("capture_all", sources = sources.len(), concurrency = settings.concurrency);

    let db_path = settings.db_path.clone();
    let prepared = tokio::task::spawn_blocking(move || open_ready(&db_path).map(|_| ()))
        .await
        .map_err(|e| {
            ExError::new(ExErrorKind::Internal)
                .with_op("capture_all")
                .with_message(format!("migration worker failed: {}", e))
        })
        .and_then(|r| r);
    if let Err(err) = prepared {
        log_op_error!("capture_all", err.clone(), start);
        return Err(err);
    }

    let results: Vec<SourceCapture> = stream::iter(sources)
        .map(|source| async move {
            let result = capture_snapshot(fetcher, &source, settings, cancel).await;
            SourceCapture {
                source_id: source.id,
                result,
            }
        })
        .buffer_unordered(settings.concurrency.max(1))
        .collect()
        .await;

    let failed = results.iter().filter(|r| r.result.is_err()).count();
    log_op_end!(
        "capture_all",
        start,
        captured = results.len() - failed,
        failed = failed
    );

    Ok(results)
}
