//! Per-run state and the progress sink.

use std::collections::BTreeSet;

use refsync_core::RecordId;

use crate::error::SyncError;

/// Progress and accumulated results of one batch run.
///
/// Owned by the caller and passed by `&mut` through every stage. A context
/// belongs to exactly one run; start a new run with a new context.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunContext {
    pub page_index: usize,
    pub page_size: usize,
    pub records_seen: usize,
    pub total_pages: usize,
    pub total_records: usize,
    /// Records whose reference was rewritten during the pass.
    pub updated_ids: BTreeSet<RecordId>,
    /// Records to unpublish once the pass completes.
    pub retire_ids: BTreeSet<RecordId>,
    /// Records that could not be loaded.
    pub skipped: usize,
    /// Records whose resolve or persist step failed.
    pub failed: usize,
}

impl RunContext {
    /// `total_pages = ceil(total_records / page_size)`.
    pub fn new(total_records: usize, page_size: usize) -> Result<Self, SyncError> {
        if page_size == 0 {
            return Err(SyncError::InvalidBatchSize(page_size));
        }
        Ok(Self {
            page_index: 0,
            page_size,
            records_seen: 0,
            total_pages: total_records.div_ceil(page_size),
            total_records,
            updated_ids: BTreeSet::new(),
            retire_ids: BTreeSet::new(),
            skipped: 0,
            failed: 0,
        })
    }

    /// Offset of the page about to be fetched.
    pub fn offset(&self) -> usize {
        self.page_index * self.page_size
    }

    pub fn pages_remaining(&self) -> bool {
        self.page_index < self.total_pages
    }

    /// Fraction of records seen, in `0.0..=1.0` for a non-empty run.
    pub fn progress(&self) -> f64 {
        if self.total_records == 0 {
            return 1.0;
        }
        self.records_seen as f64 / self.total_records as f64
    }

    pub fn progress_message(&self) -> String {
        format!("Processed {} of {}", self.records_seen, self.total_records)
    }
}

/// Destination for plain, human-facing run output.
///
/// Leveled diagnostics go through the `log` facade; this sink carries the
/// operator-facing lines and per-page progress.
pub trait ProgressSink {
    /// A standalone status line (run start / stop, precondition failures).
    fn message(&mut self, text: &str);

    /// Called after every page with the completed fraction.
    fn progress(&mut self, fraction: f64, message: &str);
}

impl<T: ProgressSink + ?Sized> ProgressSink for &mut T {
    fn message(&mut self, text: &str) {
        (**self).message(text)
    }

    fn progress(&mut self, fraction: f64, message: &str) {
        (**self).progress(fraction, message)
    }
}

/// Discards everything.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoProgress;

impl ProgressSink for NoProgress {
    fn message(&mut self, _text: &str) {}

    fn progress(&mut self, _fraction: f64, _message: &str) {}
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn total_pages_rounds_up() {
        assert_eq!(RunContext::new(53, 25).unwrap().total_pages, 3);
        assert_eq!(RunContext::new(50, 25).unwrap().total_pages, 2);
        assert_eq!(RunContext::new(1, 25).unwrap().total_pages, 1);
        assert_eq!(RunContext::new(0, 25).unwrap().total_pages, 0);
    }

    #[test]
    fn zero_page_size_is_rejected() {
        let err = RunContext::new(10, 0).unwrap_err();
        assert!(matches!(err, SyncError::InvalidBatchSize(0)));
    }

    #[test]
    fn offsets_follow_page_index() {
        let mut ctx = RunContext::new(53, 25).unwrap();
        let mut offsets = Vec::new();
        while ctx.pages_remaining() {
            offsets.push(ctx.offset());
            ctx.page_index += 1;
        }
        assert_eq!(offsets, vec![0, 25, 50]);
    }

    #[test]
    fn progress_reports_fraction_and_message() {
        let mut ctx = RunContext::new(4, 2).unwrap();
        ctx.records_seen = 2;
        assert!((ctx.progress() - 0.5).abs() < f64::EPSILON);
        assert_eq!(ctx.progress_message(), "Processed 2 of 4");
    }
}
