//! Capture command

use crate::sources::{load_seed_file, load_sources_file};
use clap::{ArgGroup, Args};
use rulewatch_engine::capture::{capture_all, CaptureSettings};
use rulewatch_engine::fetch::HttpFetcher;
use rulewatch_engine::RuleWatchConfig;
use std::path::PathBuf;
use tokio_util::sync::CancellationToken;

#[derive(Debug, Args)]
#[command(group(ArgGroup::new("input").required(true).args(["sources", "seed"])))]
pub struct CaptureArgs {
    /// TOML file of [[sources]] tables with id and url
    #[arg(long)]
    pub sources: Option<PathBuf>,

    /// JSON payload of the lists seed endpoint
    #[arg(long)]
    pub seed: Option<PathBuf>,
}

pub async fn execute(args: CaptureArgs, config: &RuleWatchConfig) -> anyhow::Result<()> {
    let sources = match (&args.sources, &args.seed) {
        (Some(path), _) => load_sources_file(path)?,
        (None, Some(path)) => load_seed_file(path)?,
        (None, None) => anyhow::bail!("Must specify either --sources or --seed"),
    };

    let fetcher = HttpFetcher::new(&config.fetch)?;
    let settings = CaptureSettings::from_config(config);

    let cancel = CancellationToken::new();
    let on_signal = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::warn!("Interrupted, cancelling in-flight captures");
            on_signal.cancel();
        }
    });

    let results = capture_all(&fetcher, sources, &settings, &cancel).await?;

    let mut failed = 0;
    for capture in &results {
        match &capture.result {
            Ok(report) => println!(
                "{}\t{}\t{}\t+{} -{} ={}",
                report.source_id,
                report.snapshot_id,
                report.status,
                report.added,
                report.removed,
                report.unchanged
            ),
            Err(e) => {
                failed += 1;
                println!("{}\terror\t{}", capture.source_id, e);
            }
        }
    }

    if failed > 0 {
        anyhow::bail!("{} of {} captures failed", failed, results.len());
    }
    Ok(())
}
