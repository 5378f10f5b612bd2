//! Snapshot listing command

use clap::Args;
use rulewatch_engine::RuleWatchConfig;
use rulewatch_store::db::open_ready;
use rulewatch_store::queries::list_snapshots;

#[derive(Debug, Args)]
pub struct SnapshotsArgs {
    #[arg(long)]
    pub source: String,
}

pub fn execute(args: SnapshotsArgs, config: &RuleWatchConfig) -> anyhow::Result<()> {
    let conn = open_ready(&config.database.path)?;

    for snapshot in list_snapshots(&conn, &args.source)? {
        let captured_at = snapshot
            .captured_at_utc()
            .map(|t| t.to_rfc3339())
            .unwrap_or_else(|| snapshot.captured_at.to_string());
        println!(
            "{}\t{}\t{}\t{}",
            snapshot.snapshot_id,
            captured_at,
            snapshot.status,
            snapshot.content_digest.as_deref().unwrap_or("-")
        );
    }
    Ok(())
}
