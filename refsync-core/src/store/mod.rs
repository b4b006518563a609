//! Record persistence seam.
//!
//! The sync pipeline only talks to [`RecordStore`]. Two implementations ship
//! with the crate:
//! - [`FileRecordStore`]: one YAML file per record under `~/.refsync/records/`
//! - [`MemoryRecordStore`]: process-local map, for embedding and tests

use crate::error::StoreError;
use crate::types::{Record, RecordId};

pub mod file;
pub mod memory;

pub use file::FileRecordStore;
pub use memory::MemoryRecordStore;

/// Operations the sync pipeline needs from the host's record storage.
///
/// All calls are blocking. Implementations must return `query_published`
/// pages ordered by `created` descending with a stable tie-break, so that
/// consecutive offsets never repeat or skip a record while the published set
/// is unchanged.
pub trait RecordStore {
    /// Number of records whose status is published.
    fn count_published(&self) -> Result<usize, StoreError>;

    /// One page of published record ids, newest first.
    fn query_published(&self, offset: usize, limit: usize) -> Result<Vec<RecordId>, StoreError>;

    /// Load a record by id. `Ok(None)` when no such record exists.
    fn load(&self, id: &RecordId) -> Result<Option<Record>, StoreError>;

    /// Persist a record, replacing any previous version.
    fn save(&self, record: &Record) -> Result<(), StoreError>;

    /// Load every id that still exists.
    ///
    /// Missing ids are skipped. An id whose load fails is logged and skipped
    /// too, so one bad record does not hold back the others.
    fn load_multiple(&self, ids: &[RecordId]) -> Result<Vec<Record>, StoreError> {
        let mut records = Vec::with_capacity(ids.len());
        for id in ids {
            match self.load(id) {
                Ok(Some(record)) => records.push(record),
                Ok(None) => {}
                Err(err) => tracing::error!("Unable to load the entity id: {id}. ({err})"),
            }
        }
        Ok(records)
    }
}

impl<T: RecordStore + ?Sized> RecordStore for &T {
    fn count_published(&self) -> Result<usize, StoreError> {
        (**self).count_published()
    }

    fn query_published(&self, offset: usize, limit: usize) -> Result<Vec<RecordId>, StoreError> {
        (**self).query_published(offset, limit)
    }

    fn load(&self, id: &RecordId) -> Result<Option<Record>, StoreError> {
        (**self).load(id)
    }

    fn save(&self, record: &Record) -> Result<(), StoreError> {
        (**self).save(record)
    }

    fn load_multiple(&self, ids: &[RecordId]) -> Result<Vec<Record>, StoreError> {
        (**self).load_multiple(ids)
    }
}

/// Sort newest first; equal timestamps fall back to ascending id.
pub(crate) fn order_newest_first(records: &mut [Record]) {
    records.sort_by(|a, b| b.created.cmp(&a.created).then_with(|| a.id.cmp(&b.id)));
}

/// Select `limit` published ids starting at `offset` from an unordered set.
pub(crate) fn page_of_published(
    records: impl IntoIterator<Item = Record>,
    offset: usize,
    limit: usize,
) -> Vec<RecordId> {
    let mut published: Vec<Record> = records.into_iter().filter(Record::is_published).collect();
    order_newest_first(&mut published);
    published
        .into_iter()
        .skip(offset)
        .take(limit)
        .map(|r| r.id)
        .collect()
}
