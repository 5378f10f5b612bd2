//! Batched rule writer
//!
//! Inserts one live record per rule of a capture, `added_by` the capture's
//! snapshot. Rules go in as multi-row `INSERT`s of at most `batch_size`
//! rows; the final table contents do not depend on the batch size.

use crate::errors::{persistence, Result};
use crate::rules::placeholders;
use rulewatch_core::errors::{ExError, RuleWatchError};
use rulewatch_core::model::Snapshot;
use rusqlite::{params_from_iter, Transaction};
use std::collections::BTreeSet;

pub const DEFAULT_BATCH_SIZE: usize = 1000;

/// Three bound parameters per row must stay under SQLite's limit of 32766
pub const MAX_BATCH_SIZE: usize = 10_000;

/// Reject batch sizes the writer cannot use
///
/// # Errors
///
/// `InvalidInput` when `batch_size` is zero or above [`MAX_BATCH_SIZE`].
pub fn validate_batch_size(batch_size: usize) -> Result<()> {
    if batch_size == 0 || batch_size > MAX_BATCH_SIZE {
        return Err(ExError::from(RuleWatchError::InvalidBatchSize {
            size: batch_size,
            max: MAX_BATCH_SIZE,
        }));
    }
    Ok(())
}

fn insert_sql(rows: usize) -> String {
    let row = placeholders(3);
    let mut sql = String::from("INSERT INTO rule_records (source_id, rule, added_by) VALUES ");
    for i in 0..rows {
        if i > 0 {
            sql.push(',');
        }
        sql.push_str(&row);
    }
    sql
}

/// Insert every rule as a live record added by `snapshot`
///
/// Returns the number of records written.
///
/// # Errors
///
/// - `InvalidInput` for an unusable batch size
/// - `Persistence` if an insert fails; the caller's transaction should be
///   rolled back
pub fn write_rule_batches(
    tx: &Transaction,
    snapshot: &Snapshot,
    rules: &BTreeSet<String>,
    batch_size: usize,
) -> Result<usize> {
    validate_batch_size(batch_size)?;

    let rules: Vec<&str> = rules.iter().map(String::as_str).collect();
    let mut written = 0;

    for (batch_no, batch) in rules.chunks(batch_size).enumerate() {
        let mut stmt = tx
            .prepare_cached(&insert_sql(batch.len()))
            .map_err(|e| persistence("write_rule_batches", e))?;

        let params = batch.iter().flat_map(|rule| {
            [
                snapshot.source_id.as_str(),
                *rule,
                snapshot.snapshot_id.as_str(),
            ]
        });
        written += stmt
            .execute(params_from_iter(params))
            .map_err(|e| {
                persistence("write_rule_batches", e).with_snapshot_id(snapshot.snapshot_id.clone())
            })?;

        tracing::trace!(
            snapshot_id = %snapshot.snapshot_id,
            batch = batch_no,
            rows = batch.len(),
            "Wrote rule batch"
        );
    }

    tracing::debug!(
        snapshot_id = %snapshot.snapshot_id,
        source_id = %snapshot.source_id,
        written,
        batch_size,
        "Wrote rule records"
    );

    Ok(written)
}
