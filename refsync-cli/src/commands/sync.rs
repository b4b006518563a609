//! `refsync sync`: reconcile every published record against the reference API.

use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::Args;
use serde_json::json;

use refsync_core::{FileRecordStore, RecordId};
use refsync_sync::{
    run_sync, HttpReferenceApi, ProgressSink, RunOutcome, RunSummary, SyncConfig,
    DEFAULT_BATCH_SIZE,
};

/// Arguments for `refsync sync`.
#[derive(Args, Debug)]
pub struct SyncArgs {
    /// Number of records to process per page.
    #[arg(
        long = "batch-size",
        alias = "batch_size",
        default_value_t = DEFAULT_BATCH_SIZE as u64,
        value_parser = clap::value_parser!(u64).range(1..),
    )]
    pub batch_size: u64,

    /// Reference API base URL. Defaults to $THIRD_PARTY_BASE_URL.
    #[arg(long, value_name = "URL")]
    pub base_url: Option<String>,

    /// Resolve every record but persist no renames and unpublish nothing.
    #[arg(long)]
    pub dry_run: bool,

    /// Emit the run summary as JSON instead of progress lines.
    #[arg(long)]
    pub json: bool,
}

impl SyncArgs {
    pub fn run(self) -> Result<()> {
        let home: PathBuf = dirs::home_dir().context("could not determine home directory")?;
        let store = FileRecordStore::at(&home);

        let mut config = SyncConfig::from_env()
            .with_batch_size(usize::try_from(self.batch_size).context("batch size too large")?)
            .with_dry_run(self.dry_run);
        if let Some(url) = self.base_url {
            config = config.with_base_url(url);
        }

        let api = HttpReferenceApi::default();
        let console = ConsoleProgress { quiet: self.json };
        let outcome = run_sync(&store, &api, console, config).context("sync run failed")?;

        let summary = match outcome {
            RunOutcome::Skipped(reason) => {
                if self.json {
                    let payload = json!({ "skipped": true, "reason": reason.message() });
                    println!(
                        "{}",
                        serde_json::to_string_pretty(&payload)
                            .context("failed to serialize skip JSON")?
                    );
                }
                return Ok(());
            }
            RunOutcome::Finished(summary) => summary,
        };

        if self.json {
            println!(
                "{}",
                serde_json::to_string_pretty(&summary).context("failed to serialize summary JSON")?
            );
        } else {
            print_summary(&summary);
        }

        if !summary.success {
            bail!(
                "batch processing failed: {}",
                summary.error.as_deref().unwrap_or("unknown error")
            );
        }
        Ok(())
    }
}

/// Prints status lines and per-page progress to stdout.
struct ConsoleProgress {
    quiet: bool,
}

impl ProgressSink for ConsoleProgress {
    fn message(&mut self, text: &str) {
        if !self.quiet {
            println!("{text}");
        }
    }

    fn progress(&mut self, fraction: f64, message: &str) {
        if !self.quiet {
            println!("{message} ({:.0}%)", fraction * 100.0);
        }
    }
}

fn print_summary(summary: &RunSummary) {
    let prefix = if summary.dry_run { "[dry-run] " } else { "" };
    let mark = if summary.success { "✓" } else { "✗" };

    println!(
        "{prefix}{mark} {} of {} records checked in {} page(s) ({} updated, {} unpublished, {} skipped, {} failed)",
        summary.records_seen,
        summary.total_records,
        summary.pages_processed,
        summary.updated.len(),
        summary.retired.len(),
        summary.skipped,
        summary.failed,
    );
    print_ids("✎", &summary.updated);
    print_ids("✗", &summary.retired);
}

fn print_ids(marker: &str, ids: &[RecordId]) {
    for id in ids {
        println!("  {marker}  {id}");
    }
}
