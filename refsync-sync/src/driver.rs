//! Batch driver: pages through published records and reconciles each one.
//!
//! ```text
//! NotStarted ──begin──▶ Paging ──page…page──▶ Draining ──drain──▶ Done
//!      │                   │ (run-level error)     ▲
//!      │                   └───────────────────────┘
//!      └── precondition failed ───────────────────────────────▶ Done
//! ```
//!
//! Each record runs parse → resolve → reconcile inside its own error
//! boundary. Only a failing page query aborts the run, in which case the
//! finalizer retires nothing.
//!
//! Retirement is deferred to the finalizer, so the published set (and
//! therefore every page offset) stays fixed while paging.

use refsync_core::{RecordId, RecordStore};

use crate::config::SyncConfig;
use crate::context::{ProgressSink, RunContext};
use crate::error::SyncError;
use crate::finalize::{finalize, RunSummary};
use crate::parser;
use crate::reconcile::{reconcile, ReconcileOutcome};
use crate::resolver::{resolve, ReferenceApi};

pub const STARTED_MESSAGE: &str = "Update Channel/Category started.";
pub const COMPLETED_MESSAGE: &str = "Update Channel/Category Completed.";

/// Lifecycle of a [`BatchDriver`]. `Done` is terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DriverState {
    NotStarted,
    Paging,
    Draining,
    Done,
}

/// Why a run stopped before paging.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Precondition {
    NoPublishedRecords,
    MissingBaseUrl,
}

impl Precondition {
    pub fn message(self) -> &'static str {
        match self {
            Precondition::NoPublishedRecords => "No published entity exists.",
            Precondition::MissingBaseUrl => "Third Party base url is missing.",
        }
    }
}

/// Result of [`BatchDriver::begin`].
#[derive(Debug)]
pub enum Start {
    Ready(RunContext),
    Skipped(Precondition),
}

/// Result of a complete run.
#[derive(Debug)]
pub enum RunOutcome {
    /// Preconditions failed; nothing was read beyond the record count.
    Skipped(Precondition),
    /// Paging ran (successfully or not) and the finalizer produced a summary.
    Finished(RunSummary),
}

/// What happened to one record inside the page loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordOutcome {
    /// Could not be loaded; counted as seen, in no result bucket.
    Skipped,
    /// Reference missing or malformed; queued for retirement.
    Unparseable,
    Reconciled(ReconcileOutcome),
}

/// Drives one run over a record store.
///
/// A driver is single-use: once `Done`, create a new one for the next run.
pub struct BatchDriver<S, A, P> {
    store: S,
    api: A,
    progress: P,
    config: SyncConfig,
    state: DriverState,
}

impl<S, A, P> BatchDriver<S, A, P>
where
    S: RecordStore,
    A: ReferenceApi,
    P: ProgressSink,
{
    pub fn new(store: S, api: A, progress: P, config: SyncConfig) -> Self {
        Self {
            store,
            api,
            progress,
            config,
            state: DriverState::NotStarted,
        }
    }

    pub fn state(&self) -> DriverState {
        self.state
    }

    /// Run every stage to completion.
    ///
    /// `Err` is only returned when the run could not start (record count
    /// failed, zero batch size) or the driver was reused. Paging failures end
    /// up in [`RunSummary::error`] with `success == false`.
    pub fn run(&mut self) -> Result<RunOutcome, SyncError> {
        let mut ctx = match self.begin()? {
            Start::Ready(ctx) => ctx,
            Start::Skipped(reason) => return Ok(RunOutcome::Skipped(reason)),
        };

        let mut paged = Ok(());
        while self.state == DriverState::Paging {
            if let Err(err) = self.page(&mut ctx) {
                paged = Err(err);
                break;
            }
        }

        Ok(RunOutcome::Finished(self.drain(paged, &mut ctx)?))
    }

    /// `NotStarted → Paging`, or straight to `Done` if a precondition fails.
    pub fn begin(&mut self) -> Result<Start, SyncError> {
        self.expect_state(DriverState::NotStarted)?;
        if self.config.batch_size == 0 {
            return Err(SyncError::InvalidBatchSize(0));
        }

        let total = self.store.count_published()?;
        let precondition = if total == 0 {
            Some(Precondition::NoPublishedRecords)
        } else if self.config.base_url().is_none() {
            Some(Precondition::MissingBaseUrl)
        } else {
            None
        };
        if let Some(reason) = precondition {
            tracing::info!("{}", reason.message());
            self.progress.message(reason.message());
            self.state = DriverState::Done;
            return Ok(Start::Skipped(reason));
        }

        let ctx = RunContext::new(total, self.config.batch_size)?;
        tracing::info!("{STARTED_MESSAGE}");
        self.progress.message(STARTED_MESSAGE);
        tracing::debug!(
            "{} published records in {} page(s) of {}",
            ctx.total_records,
            ctx.total_pages,
            ctx.page_size
        );
        self.state = DriverState::Paging;
        Ok(Start::Ready(ctx))
    }

    /// Process the next page. Moves to `Draining` after the last one.
    ///
    /// An `Err` here is a run-level failure: the page query itself failed.
    pub fn page(&mut self, ctx: &mut RunContext) -> Result<(), SyncError> {
        self.expect_state(DriverState::Paging)?;

        let ids = self.store.query_published(ctx.offset(), ctx.page_size)?;
        for id in &ids {
            match self.process_record(id, ctx) {
                Ok(RecordOutcome::Skipped) => ctx.skipped += 1,
                Ok(_) => {}
                Err(err) => {
                    tracing::error!("Error processing entity ID {id}: {err}");
                    ctx.failed += 1;
                }
            }
            ctx.records_seen += 1;
        }

        ctx.page_index += 1;
        self.progress.progress(ctx.progress(), &ctx.progress_message());
        if !ctx.pages_remaining() {
            self.state = DriverState::Draining;
        }
        Ok(())
    }

    /// Hand the context to the finalizer: `Paging | Draining → Done`.
    ///
    /// The run counts as successful only if every page was processed.
    pub fn drain(
        &mut self,
        paged: Result<(), SyncError>,
        ctx: &mut RunContext,
    ) -> Result<RunSummary, SyncError> {
        if !matches!(self.state, DriverState::Paging | DriverState::Draining) {
            return Err(SyncError::InvalidState {
                expected: DriverState::Draining,
                actual: self.state,
            });
        }
        self.state = DriverState::Draining;

        let error = match paged {
            Err(err) => Some(err.to_string()),
            Ok(()) if ctx.pages_remaining() => Some(format!(
                "run stopped after page {} of {}",
                ctx.page_index, ctx.total_pages
            )),
            Ok(()) => None,
        };
        let mut summary = finalize(&self.store, error.is_none(), ctx, self.config.dry_run);
        summary.error = error;

        if summary.success {
            tracing::info!("{COMPLETED_MESSAGE}");
            self.progress.message(COMPLETED_MESSAGE);
        }
        self.state = DriverState::Done;
        Ok(summary)
    }

    /// One record's error boundary: load, select field, parse, resolve, reconcile.
    fn process_record(
        &self,
        id: &RecordId,
        ctx: &mut RunContext,
    ) -> Result<RecordOutcome, SyncError> {
        let mut record = match self.store.load(id) {
            Ok(Some(record)) => record,
            Ok(None) => {
                tracing::info!("Unable to load the entity id: {id}.");
                return Ok(RecordOutcome::Skipped);
            }
            Err(err) => {
                tracing::info!("Unable to load the entity id: {id}. ({err})");
                return Ok(RecordOutcome::Skipped);
            }
        };

        let Some((kind, value)) = record.reference() else {
            tracing::error!("Failed to parse UUID from value: <empty> for the entity id: {id}");
            ctx.retire_ids.insert(id.clone());
            return Ok(RecordOutcome::Unparseable);
        };
        let Some(parsed) = parser::parse(value) else {
            tracing::error!("Failed to parse UUID from value: {value} for the entity id: {id}");
            ctx.retire_ids.insert(id.clone());
            return Ok(RecordOutcome::Unparseable);
        };

        let base_url = self.config.base_url().unwrap_or_default();
        let api_ref = resolve(&self.api, base_url, &parsed.identifier, kind)?;
        let outcome = reconcile(
            &self.store,
            &mut record,
            kind,
            &parsed,
            api_ref.as_ref(),
            ctx,
            self.config.dry_run,
        )?;
        Ok(RecordOutcome::Reconciled(outcome))
    }

    fn expect_state(&self, expected: DriverState) -> Result<(), SyncError> {
        if self.state == expected {
            Ok(())
        } else {
            Err(SyncError::InvalidState {
                expected,
                actual: self.state,
            })
        }
    }
}

/// Run one complete sync over `store`.
///
/// This is the entry point used by the CLI; a scheduler can call it the same
/// way. Each call builds a fresh driver and a fresh [`RunContext`].
pub fn run_sync<S, A, P>(
    store: S,
    api: A,
    progress: P,
    config: SyncConfig,
) -> Result<RunOutcome, SyncError>
where
    S: RecordStore,
    A: ReferenceApi,
    P: ProgressSink,
{
    BatchDriver::new(store, api, progress, config).run()
}
