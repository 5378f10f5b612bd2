//! Live rule listing command

use clap::Args;
use rulewatch_engine::RuleWatchConfig;
use rulewatch_store::db::open_ready;
use rulewatch_store::queries::live_rules;

#[derive(Debug, Args)]
pub struct LiveArgs {
    #[arg(long)]
    pub source: String,
}

pub fn execute(args: LiveArgs, config: &RuleWatchConfig) -> anyhow::Result<()> {
    let conn = open_ready(&config.database.path)?;

    for record in live_rules(&conn, &args.source)? {
        println!("{}", record.rule);
    }
    Ok(())
}
