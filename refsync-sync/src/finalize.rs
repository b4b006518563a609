//! End-of-run retirement and summary.

use serde::Serialize;

use refsync_core::{RecordId, RecordStatus, RecordStore};

use crate::context::RunContext;

/// Result of a finished run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RunSummary {
    pub success: bool,
    pub dry_run: bool,
    pub total_records: usize,
    pub total_pages: usize,
    pub pages_processed: usize,
    pub records_seen: usize,
    /// Ids rewritten during the pass.
    pub updated: Vec<RecordId>,
    /// Ids queued for retirement. Empty when the run failed.
    pub retired: Vec<RecordId>,
    /// How many queued records were actually found and unpublished.
    pub unpublished: usize,
    pub skipped: usize,
    pub failed: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

fn join_ids(ids: &[RecordId]) -> String {
    ids.iter()
        .map(RecordId::as_str)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Retire queued records and summarise the run.
///
/// Drains both result sets out of `ctx`. On `success == false` nothing is
/// retired; updates already applied during the pass are still reported.
/// Records that vanished since they were queued are skipped. A failure to
/// load or save during retirement is logged and does not stop the others.
pub fn finalize(
    store: &impl RecordStore,
    success: bool,
    ctx: &mut RunContext,
    dry_run: bool,
) -> RunSummary {
    let updated: Vec<RecordId> = std::mem::take(&mut ctx.updated_ids).into_iter().collect();
    let queued: Vec<RecordId> = std::mem::take(&mut ctx.retire_ids).into_iter().collect();

    let mut summary = RunSummary {
        success,
        dry_run,
        total_records: ctx.total_records,
        total_pages: ctx.total_pages,
        pages_processed: ctx.page_index,
        records_seen: ctx.records_seen,
        updated,
        retired: Vec::new(),
        unpublished: 0,
        skipped: ctx.skipped,
        failed: ctx.failed,
        error: None,
    };

    if !success {
        tracing::error!("An error occurred during the batch processing.");
        return summary;
    }

    tracing::info!("Channel/Category updates batch completed.");

    if !queued.is_empty() {
        summary.unpublished = if dry_run {
            tracing::info!("[dry-run] would unpublish: {}", join_ids(&queued));
            0
        } else {
            retire(store, &queued)
        };
        tracing::info!("Unpublished entities: {}", join_ids(&queued));
        summary.retired = queued;
    }

    if !summary.updated.is_empty() {
        tracing::info!("Updated entity ids: {}", join_ids(&summary.updated));
    }

    summary
}

fn retire(store: &impl RecordStore, ids: &[RecordId]) -> usize {
    let records = match store.load_multiple(ids) {
        Ok(records) => records,
        Err(err) => {
            tracing::error!("Unable to load entities queued for unpublishing: {err}");
            return 0;
        }
    };

    let mut unpublished = 0;
    for mut record in records {
        record.status = RecordStatus::Unpublished;
        match store.save(&record) {
            Ok(()) => unpublished += 1,
            Err(err) => tracing::error!("Unable to unpublish entity {}: {err}", record.id),
        }
    }
    unpublished
}
