//! In-memory record store.

use std::cell::RefCell;
use std::collections::BTreeMap;

use crate::error::StoreError;
use crate::store::{page_of_published, RecordStore};
use crate::types::{Record, RecordId};

/// A [`RecordStore`] over a process-local map.
///
/// Single-threaded by construction (`RefCell`), matching the blocking,
/// one-run-at-a-time sync pipeline.
#[derive(Debug, Default)]
pub struct MemoryRecordStore {
    records: RefCell<BTreeMap<RecordId, Record>>,
    saves: RefCell<Vec<RecordId>>,
}

impl MemoryRecordStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_records(records: impl IntoIterator<Item = Record>) -> Self {
        let store = Self::new();
        for record in records {
            store.insert(record);
        }
        store
    }

    /// Insert without counting as a save.
    pub fn insert(&self, record: Record) {
        self.records.borrow_mut().insert(record.id.clone(), record);
    }

    pub fn remove(&self, id: &RecordId) -> Option<Record> {
        self.records.borrow_mut().remove(id)
    }

    pub fn get(&self, id: &RecordId) -> Option<Record> {
        self.records.borrow().get(id).cloned()
    }

    pub fn len(&self) -> usize {
        self.records.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.borrow().is_empty()
    }

    /// Ids passed to [`RecordStore::save`], in call order.
    pub fn saved_ids(&self) -> Vec<RecordId> {
        self.saves.borrow().clone()
    }
}

impl RecordStore for MemoryRecordStore {
    fn count_published(&self) -> Result<usize, StoreError> {
        Ok(self
            .records
            .borrow()
            .values()
            .filter(|r| r.is_published())
            .count())
    }

    fn query_published(&self, offset: usize, limit: usize) -> Result<Vec<RecordId>, StoreError> {
        let snapshot: Vec<Record> = self.records.borrow().values().cloned().collect();
        Ok(page_of_published(snapshot, offset, limit))
    }

    fn load(&self, id: &RecordId) -> Result<Option<Record>, StoreError> {
        Ok(self.get(id))
    }

    fn save(&self, record: &Record) -> Result<(), StoreError> {
        self.saves.borrow_mut().push(record.id.clone());
        self.insert(record.clone());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::RecordStatus;
    use chrono::{Duration, Utc};

    #[test]
    fn load_multiple_skips_missing_ids() {
        let now = Utc::now();
        let store = MemoryRecordStore::with_records([Record {
            id: RecordId::from("1"),
            status: RecordStatus::Published,
            created: now,
            channel: Some("A (id: 1)".to_string()),
            category: None,
        }]);
        let found = store
            .load_multiple(&[RecordId::from("1"), RecordId::from("2")])
            .expect("load_multiple");
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].id, RecordId::from("1"));
    }

    #[test]
    fn equal_timestamps_tie_break_by_id() {
        let now = Utc::now();
        let mk = |id: &str, created| Record {
            id: RecordId::from(id),
            status: RecordStatus::Published,
            created,
            channel: None,
            category: Some("X (id: 0)".to_string()),
        };
        let store = MemoryRecordStore::with_records([
            mk("b", now),
            mk("a", now),
            mk("c", now - Duration::seconds(1)),
        ]);
        let ids = store.query_published(0, 3).expect("query");
        assert_eq!(
            ids,
            vec![RecordId::from("a"), RecordId::from("b"), RecordId::from("c")]
        );
    }

    #[test]
    fn saves_are_recorded_but_inserts_are_not() {
        let store = MemoryRecordStore::new();
        let r = Record {
            id: RecordId::from("x"),
            status: RecordStatus::Published,
            created: Utc::now(),
            channel: None,
            category: None,
        };
        store.insert(r.clone());
        assert!(store.saved_ids().is_empty());
        store.save(&r).expect("save");
        assert_eq!(store.saved_ids(), vec![RecordId::from("x")]);
    }
}
