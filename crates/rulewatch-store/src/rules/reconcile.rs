//! Applying reconciliation to the rule_records table
//!
//! Reconciliation of snapshot S for source X is two indexed reads:
//! - live records of X not added by S (`idx_rule_records_live`)
//! - records added by S (`idx_rule_records_added_by`)
//!
//! followed by the planner from `rulewatch-core` and two batched writes:
//! `removed_by = S` for removed records and a delete of duplicate
//! continuations. Everything runs inside the capture's transaction.

use crate::errors::{persistence, Result};
use crate::rules::placeholders;
use rulewatch_core::errors::{ExError, RuleWatchError};
use rulewatch_core::model::Snapshot;
use rulewatch_core::reconcile::{plan_reconciliation, LiveRecord, ReconcilePlan};
use rusqlite::{params_from_iter, Connection, Transaction};

fn collect_records(
    conn: &Connection,
    op: &str,
    sql: &str,
    params: &[&str],
) -> Result<Vec<LiveRecord>> {
    let mut stmt = conn.prepare_cached(sql).map_err(|e| persistence(op, e))?;
    let records = stmt
        .query_map(params_from_iter(params.iter()), |row| {
            Ok(LiveRecord {
                id: row.get(0)?,
                rule: row.get(1)?,
            })
        })
        .map_err(|e| persistence(op, e))?
        .collect::<std::result::Result<Vec<_>, _>>()
        .map_err(|e| persistence(op, e))?;
    Ok(records)
}

/// Live records of a source, excluding those added by `snapshot_id`
///
/// # Errors
///
/// `Persistence` if the query fails.
pub fn load_previously_live(
    conn: &Connection,
    source_id: &str,
    snapshot_id: &str,
) -> Result<Vec<LiveRecord>> {
    collect_records(
        conn,
        "load_previously_live",
        "SELECT id, rule FROM rule_records
         WHERE source_id = ?1 AND removed_by IS NULL AND added_by != ?2
         ORDER BY id",
        &[source_id, snapshot_id],
    )
}

/// Records inserted by one snapshot
///
/// # Errors
///
/// `Persistence` if the query fails.
pub fn load_added_by(conn: &Connection, snapshot_id: &str) -> Result<Vec<LiveRecord>> {
    collect_records(
        conn,
        "load_added_by",
        "SELECT id, rule FROM rule_records WHERE added_by = ?1 ORDER BY id",
        &[snapshot_id],
    )
}

/// Run `sql_prefix (id, id, ...)` over `ids` in chunks of `batch_size`
fn execute_for_ids(
    tx: &Transaction,
    op: &str,
    sql_prefix: &str,
    leading: Option<&str>,
    ids: &[i64],
    batch_size: usize,
) -> Result<usize> {
    let mut affected = 0;
    for chunk in ids.chunks(batch_size.max(1)) {
        let sql = format!("{}{}", sql_prefix, placeholders(chunk.len()));
        let mut stmt = tx.prepare_cached(&sql).map_err(|e| persistence(op, e))?;

        let mut values: Vec<rusqlite::types::Value> = Vec::with_capacity(chunk.len() + 1);
        if let Some(value) = leading {
            values.push(rusqlite::types::Value::Text(value.to_string()));
        }
        values.extend(chunk.iter().map(|id| rusqlite::types::Value::Integer(*id)));

        affected += stmt
            .execute(params_from_iter(values))
            .map_err(|e| persistence(op, e))?;
    }
    Ok(affected)
}

/// Mark removed records and delete duplicate continuations
///
/// # Errors
///
/// `Persistence` if an update or delete fails.
pub fn apply_reconciliation(
    tx: &Transaction,
    snapshot_id: &str,
    plan: &ReconcilePlan,
    batch_size: usize,
) -> Result<()> {
    let removed = execute_for_ids(
        tx,
        "mark_removed",
        "UPDATE rule_records SET removed_by = ? WHERE removed_by IS NULL AND id IN ",
        Some(snapshot_id),
        &plan.removed,
        batch_size,
    )?;

    let deleted = execute_for_ids(
        tx,
        "delete_duplicates",
        "DELETE FROM rule_records WHERE id IN ",
        None,
        &plan.duplicates,
        batch_size,
    )?;

    tracing::debug!(
        snapshot_id = %snapshot_id,
        removed,
        deleted,
        added = plan.added.len(),
        "Applied reconciliation"
    );

    Ok(())
}

/// Reconcile the records of a freshly written snapshot against history
///
/// # Errors
///
/// `Persistence` if any read or write fails.
pub fn reconcile_snapshot(
    tx: &Transaction,
    snapshot: &Snapshot,
    batch_size: usize,
) -> Result<ReconcilePlan> {
    let previously_live = load_previously_live(tx, &snapshot.source_id, &snapshot.snapshot_id)?;
    let new_records = load_added_by(tx, &snapshot.snapshot_id)?;

    let plan = plan_reconciliation(&previously_live, &new_records);
    apply_reconciliation(tx, &snapshot.snapshot_id, &plan, batch_size)?;

    Ok(plan)
}

/// Check that no rule of a source has more than one live record
///
/// # Errors
///
/// - `InvariantViolation` naming the first offending rule
/// - `Persistence` if the check query fails
pub fn verify_live_invariant(conn: &Connection, source_id: &str) -> Result<()> {
    let mut stmt = conn
        .prepare_cached(
            "SELECT rule, COUNT(*) FROM rule_records
             WHERE source_id = ?1 AND removed_by IS NULL
             GROUP BY rule HAVING COUNT(*) > 1
             LIMIT 1",
        )
        .map_err(|e| persistence("verify_live_invariant", e))?;

    let mut rows = stmt
        .query([source_id])
        .map_err(|e| persistence("verify_live_invariant", e))?;

    if let Some(row) = rows
        .next()
        .map_err(|e| persistence("verify_live_invariant", e))?
    {
        let rule: String = row.get(0).map_err(|e| persistence("verify_live_invariant", e))?;
        let live_count: i64 = row.get(1).map_err(|e| persistence("verify_live_invariant", e))?;
        return Err(ExError::from(RuleWatchError::LiveInvariantViolated {
            source_id: source_id.to_string(),
            rule,
            live_count: live_count as usize,
        }));
    }

    Ok(())
}
