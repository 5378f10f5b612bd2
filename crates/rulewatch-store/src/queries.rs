//! Read-only queries over the snapshot ledger and rule records.
//!
//! Nothing here mutates state; every function is safe to call while
//! captures are committing on other connections.

use crate::errors::{persistence, Result};
use rulewatch_core::errors::RuleWatchError;
use rulewatch_core::model::{FetchStatus, RuleRecord, Snapshot};
use rusqlite::{Connection, OptionalExtension, Row};

const SNAPSHOT_COLUMNS: &str =
    "snapshot_id, source_id, source_url, captured_at, http_status, content_digest";

const RECORD_COLUMNS: &str = "id, source_id, rule, added_by, removed_by";

fn snapshot_from_row(row: &Row<'_>) -> rusqlite::Result<Snapshot> {
    Ok(Snapshot {
        snapshot_id: row.get(0)?,
        source_id: row.get(1)?,
        source_url: row.get(2)?,
        captured_at: row.get(3)?,
        status: FetchStatus::from_code(row.get::<_, Option<u16>>(4)?),
        content_digest: row.get(5)?,
    })
}

fn record_from_row(row: &Row<'_>) -> rusqlite::Result<RuleRecord> {
    Ok(RuleRecord {
        id: row.get(0)?,
        source_id: row.get(1)?,
        rule: row.get(2)?,
        added_by: row.get(3)?,
        removed_by: row.get(4)?,
    })
}

fn query_records(conn: &Connection, op: &str, sql: &str, param: &str) -> Result<Vec<RuleRecord>> {
    let mut stmt = conn.prepare_cached(sql).map_err(|e| persistence(op, e))?;
    let records = stmt
        .query_map([param], record_from_row)
        .map_err(|e| persistence(op, e))?
        .collect::<std::result::Result<Vec<_>, _>>()
        .map_err(|e| persistence(op, e))?;
    Ok(records)
}

/// Fetch one snapshot by id.
///
/// # Errors
///
/// - `NotFound` if no snapshot has this id
/// - `Persistence` if the query fails
pub fn fetch_snapshot(conn: &Connection, snapshot_id: &str) -> Result<Snapshot> {
    let sql = format!(
        "SELECT {} FROM snapshots WHERE snapshot_id = ?1",
        SNAPSHOT_COLUMNS
    );
    conn.query_row(&sql, [snapshot_id], snapshot_from_row)
        .optional()
        .map_err(|e| persistence("fetch_snapshot", e))?
        .ok_or_else(|| {
            RuleWatchError::SnapshotNotFound {
                snapshot_id: snapshot_id.to_string(),
            }
            .into()
        })
}

/// All snapshots of a source, oldest first.
///
/// # Errors
///
/// `Persistence` if the query fails.
pub fn list_snapshots(conn: &Connection, source_id: &str) -> Result<Vec<Snapshot>> {
    let sql = format!(
        "SELECT {} FROM snapshots WHERE source_id = ?1 ORDER BY captured_at",
        SNAPSHOT_COLUMNS
    );
    let mut stmt = conn
        .prepare_cached(&sql)
        .map_err(|e| persistence("list_snapshots", e))?;
    let snapshots = stmt
        .query_map([source_id], snapshot_from_row)
        .map_err(|e| persistence("list_snapshots", e))?
        .collect::<std::result::Result<Vec<_>, _>>()
        .map_err(|e| persistence("list_snapshots", e))?;
    Ok(snapshots)
}

/// Live records of a source, ordered by rule text.
///
/// # Errors
///
/// `Persistence` if the query fails.
pub fn live_rules(conn: &Connection, source_id: &str) -> Result<Vec<RuleRecord>> {
    query_records(
        conn,
        "live_rules",
        &format!(
            "SELECT {} FROM rule_records WHERE source_id = ?1 AND removed_by IS NULL ORDER BY rule",
            RECORD_COLUMNS
        ),
        source_id,
    )
}

/// Records whose interval starts at a snapshot, ordered by rule text.
///
/// # Errors
///
/// `Persistence` if the query fails.
pub fn records_added_by(conn: &Connection, snapshot_id: &str) -> Result<Vec<RuleRecord>> {
    query_records(
        conn,
        "records_added_by",
        &format!(
            "SELECT {} FROM rule_records WHERE added_by = ?1 ORDER BY rule",
            RECORD_COLUMNS
        ),
        snapshot_id,
    )
}

/// Records whose interval ends at a snapshot, ordered by rule text.
///
/// # Errors
///
/// `Persistence` if the query fails.
pub fn records_removed_by(conn: &Connection, snapshot_id: &str) -> Result<Vec<RuleRecord>> {
    query_records(
        conn,
        "records_removed_by",
        &format!(
            "SELECT {} FROM rule_records WHERE removed_by = ?1 ORDER BY rule",
            RECORD_COLUMNS
        ),
        snapshot_id,
    )
}

/// Every interval a rule has had on a source, oldest first.
///
/// # Errors
///
/// `Persistence` if the query fails.
pub fn rule_history(conn: &Connection, source_id: &str, rule: &str) -> Result<Vec<RuleRecord>> {
    let sql = format!(
        "SELECT {} FROM rule_records WHERE source_id = ?1 AND rule = ?2 ORDER BY id",
        RECORD_COLUMNS
    );
    let mut stmt = conn
        .prepare_cached(&sql)
        .map_err(|e| persistence("rule_history", e))?;
    let records = stmt
        .query_map([source_id, rule], record_from_row)
        .map_err(|e| persistence("rule_history", e))?
        .collect::<std::result::Result<Vec<_>, _>>()
        .map_err(|e| persistence("rule_history", e))?;
    Ok(records)
}

/// Number of snapshots recorded for a source.
///
/// # Errors
///
/// `Persistence` if the query fails.
pub fn count_snapshots(conn: &Connection, source_id: &str) -> Result<usize> {
    let count: i64 = conn
        .query_row(
            "SELECT COUNT(*) FROM snapshots WHERE source_id = ?1",
            [source_id],
            |row| row.get(0),
        )
        .map_err(|e| persistence("count_snapshots", e))?;
    Ok(count as usize)
}
