//! Snapshot persistence operations.
//!
//! [`commit_capture`] is the single write path of a capture: snapshot row,
//! rule records, reconciliation and invariant check, committed together or
//! not at all.

use crate::errors::{persistence, Result};
use crate::rules::{reconcile_snapshot, validate_batch_size, verify_live_invariant, write_rule_batches};
use rulewatch_core::errors::{ExError, ExErrorKind};
use rulewatch_core::model::{FetchStatus, Snapshot};
use rulewatch_core::reconcile::ReconcilePlan;
use rusqlite::{Connection, OptionalExtension, Transaction, TransactionBehavior};
use std::collections::BTreeSet;

/// Content obtained by a successful fetch, already normalized
#[derive(Debug, Clone, Default)]
pub struct CaptureContent {
    pub rules: BTreeSet<String>,
    pub content_digest: String,
}

/// Everything needed to persist one capture
#[derive(Debug, Clone)]
pub struct CaptureCommit {
    pub source_id: String,
    pub source_url: String,
    /// Requested capture time in Unix milliseconds
    pub requested_at: i64,
    pub status: FetchStatus,
    /// `None` when the fetch failed; reconciliation is skipped
    pub content: Option<CaptureContent>,
    pub batch_size: usize,
}

/// Result of a committed capture
#[derive(Debug, Clone)]
pub struct CommitResult {
    pub snapshot: Snapshot,
    /// Records inserted before reconciliation
    pub rules_written: usize,
    /// `None` when reconciliation was skipped
    pub plan: Option<ReconcilePlan>,
}

/// Insert a snapshot row, assigning a capture time later than any earlier
/// snapshot of the same source.
///
/// # Errors
///
/// `Persistence` if the insert fails.
pub fn insert_snapshot(
    tx: &Transaction,
    source_id: &str,
    source_url: &str,
    requested_at: i64,
    status: FetchStatus,
    content_digest: Option<String>,
) -> Result<Snapshot> {
    let last: Option<i64> = tx
        .query_row(
            "SELECT MAX(captured_at) FROM snapshots WHERE source_id = ?1",
            [source_id],
            |row| row.get(0),
        )
        .map_err(|e| persistence("insert_snapshot", e))?;

    let captured_at = match last {
        Some(last) if last >= requested_at => last + 1,
        _ => requested_at,
    };

    let snapshot = Snapshot {
        snapshot_id: Snapshot::new_id(),
        source_id: source_id.to_string(),
        source_url: source_url.to_string(),
        captured_at,
        status,
        content_digest,
    };

    tx.execute(
        r#"
        INSERT INTO snapshots (
            snapshot_id,
            source_id,
            source_url,
            captured_at,
            http_status,
            content_digest
        ) VALUES (?1, ?2, ?3, ?4, ?5, ?6)
        "#,
        rusqlite::params![
            snapshot.snapshot_id,
            snapshot.source_id,
            snapshot.source_url,
            snapshot.captured_at,
            snapshot.status.code(),
            snapshot.content_digest,
        ],
    )
    .map_err(|e| persistence("insert_snapshot", e).with_source_id(source_id))?;

    tracing::debug!(
        snapshot_id = %snapshot.snapshot_id,
        source_id = %snapshot.source_id,
        captured_at = snapshot.captured_at,
        status = %snapshot.status,
        "Created snapshot ledger entry"
    );

    Ok(snapshot)
}

/// Commit a capture atomically.
///
/// 1. Insert the snapshot with its status
/// 2. If content was fetched: write rule batches, reconcile, verify the
///    live invariant
/// 3. Commit
///
/// The transaction is opened `IMMEDIATE` so concurrent captures queue on
/// the write lock instead of failing on upgrade. Any error drops the
/// transaction, which rolls everything back.
///
/// # Errors
///
/// - `InvalidInput`: content supplied with a non-2xx status, or bad batch size
/// - `InvariantViolation`: reconciliation left duplicate live records
/// - `Persistence`: any database failure
pub fn commit_capture(conn: &mut Connection, commit: CaptureCommit) -> Result<CommitResult> {
    if commit.content.is_some() && !commit.status.is_success() {
        return Err(ExError::new(ExErrorKind::InvalidInput)
            .with_op("commit_capture")
            .with_source_id(commit.source_id)
            .with_message(format!(
                "content supplied for non-success status {}",
                commit.status
            )));
    }
    validate_batch_size(commit.batch_size)?;

    let tx = conn
        .transaction_with_behavior(TransactionBehavior::Immediate)
        .map_err(|e| persistence("commit_capture", e).with_source_id(commit.source_id.clone()))?;

    let digest = commit.content.as_ref().map(|c| c.content_digest.clone());
    let snapshot = insert_snapshot(
        &tx,
        &commit.source_id,
        &commit.source_url,
        commit.requested_at,
        commit.status,
        digest,
    )?;

    let (rules_written, plan) = match &commit.content {
        Some(content) => {
            let written = write_rule_batches(&tx, &snapshot, &content.rules, commit.batch_size)?;
            let plan = reconcile_snapshot(&tx, &snapshot, commit.batch_size)?;
            verify_live_invariant(&tx, &snapshot.source_id)
                .map_err(|e| e.with_snapshot_id(snapshot.snapshot_id.clone()))?;
            (written, Some(plan))
        }
        None => (0, None),
    };

    tx.commit().map_err(|e| {
        persistence("commit_capture", e)
            .with_source_id(snapshot.source_id.clone())
            .with_snapshot_id(snapshot.snapshot_id.clone())
    })?;

    Ok(CommitResult {
        snapshot,
        rules_written,
        plan,
    })
}

/// Latest snapshot id for a source, if any
///
/// # Errors
///
/// `Persistence` if the query fails.
pub fn latest_snapshot_id(conn: &Connection, source_id: &str) -> Result<Option<String>> {
    conn.query_row(
        "SELECT snapshot_id FROM snapshots WHERE source_id = ?1
         ORDER BY captured_at DESC LIMIT 1",
        [source_id],
        |row| row.get(0),
    )
    .optional()
    .map_err(|e| persistence("latest_snapshot_id", e))
}
