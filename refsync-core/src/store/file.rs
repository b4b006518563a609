//! File-backed record store.
//!
//! # Storage layout
//!
//! ```text
//! ~/.refsync/
//!   records/            (mode 0700, created on first save)
//!     <record_id>.yaml  (one file per record, mode 0600)
//! ```
//!
//! # API pattern
//!
//! Path helpers take an explicit home (`fn_at(home: &Path, …)`); only
//! [`FileRecordStore::open`] derives it from `dirs::home_dir()`.
//!
//! Tests must NEVER call `open`; always use [`FileRecordStore::at`].

use std::path::{Path, PathBuf};

use crate::error::StoreError;
use crate::store::{page_of_published, RecordStore};
use crate::types::{Record, RecordId};

// ---------------------------------------------------------------------------
// 1. Path helpers
// ---------------------------------------------------------------------------

/// `<home>/.refsync/records/`: pure, no I/O.
pub fn records_dir_at(home: &Path) -> PathBuf {
    home.join(".refsync").join("records")
}

/// `<home>/.refsync/records/<id>.yaml`: validates the id, no I/O.
pub fn record_path_at(home: &Path, id: &RecordId) -> Result<PathBuf, StoreError> {
    record_path_in(&records_dir_at(home), id)
}

fn record_path_in(dir: &Path, id: &RecordId) -> Result<PathBuf, StoreError> {
    validate_id(id)?;
    Ok(dir.join(format!("{}.yaml", id.0)))
}

/// Ids become file stems, so only a conservative character set is accepted.
pub fn validate_id(id: &RecordId) -> Result<(), StoreError> {
    let valid = !id.0.is_empty()
        && id
            .0
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');
    if valid {
        Ok(())
    } else {
        Err(StoreError::InvalidId(id.0.clone()))
    }
}

// ---------------------------------------------------------------------------
// 2. Store
// ---------------------------------------------------------------------------

/// A [`RecordStore`] backed by one YAML file per record.
#[derive(Debug, Clone)]
pub struct FileRecordStore {
    dir: PathBuf,
}

impl FileRecordStore {
    /// Store rooted at `<home>/.refsync/records/`.
    pub fn at(home: &Path) -> Self {
        Self {
            dir: records_dir_at(home),
        }
    }

    /// Store rooted at the current user's home directory.
    pub fn open() -> Result<Self, StoreError> {
        Ok(Self::at(&home()?))
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Every readable record on disk, in file-name order.
    ///
    /// Leftover `.yaml.tmp` files from an interrupted save are ignored. A
    /// record file that fails to parse is logged and skipped so one damaged
    /// file cannot hide the rest; [`RecordStore::load`] still reports it.
    pub fn list_all(&self) -> Result<Vec<Record>, StoreError> {
        if !self.dir.exists() {
            return Ok(vec![]);
        }
        let mut entries: Vec<_> = std::fs::read_dir(&self.dir)?
            .filter_map(|e| e.ok())
            .filter(|e| e.file_type().map(|t| t.is_file()).unwrap_or(false))
            .collect();
        entries.sort_by_key(|e| e.file_name());

        let mut records = Vec::with_capacity(entries.len());
        for entry in entries {
            let fname = entry.file_name();
            if !fname.to_string_lossy().ends_with(".yaml") {
                continue;
            }
            match read_record(&entry.path()) {
                Ok(record) => records.push(record),
                Err(err @ StoreError::Parse { .. }) => {
                    tracing::error!("Skipping unreadable record: {err}");
                }
                Err(err) => return Err(err),
            }
        }
        Ok(records)
    }
}

impl RecordStore for FileRecordStore {
    fn count_published(&self) -> Result<usize, StoreError> {
        Ok(self.list_all()?.iter().filter(|r| r.is_published()).count())
    }

    fn query_published(&self, offset: usize, limit: usize) -> Result<Vec<RecordId>, StoreError> {
        Ok(page_of_published(self.list_all()?, offset, limit))
    }

    fn load(&self, id: &RecordId) -> Result<Option<Record>, StoreError> {
        let path = record_path_in(&self.dir, id)?;
        if !path.exists() {
            return Ok(None);
        }
        read_record(&path).map(Some)
    }

    /// Atomically save a record.
    ///
    /// Write flow: serialize → `.yaml.tmp` sibling → `chmod 0600` → `rename`.
    fn save(&self, record: &Record) -> Result<(), StoreError> {
        let path = record_path_in(&self.dir, &record.id)?;
        if !self.dir.exists() {
            std::fs::create_dir_all(&self.dir)?;
            set_dir_permissions(&self.dir)?;
        }
        let tmp_path = path.with_file_name(format!("{}.yaml.tmp", record.id.0));

        let yaml = serde_yaml::to_string(record)?;
        std::fs::write(&tmp_path, yaml)?;
        set_file_permissions(&tmp_path)?;
        std::fs::rename(&tmp_path, &path)?;
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Private helpers
// ---------------------------------------------------------------------------

fn read_record(path: &Path) -> Result<Record, StoreError> {
    let contents = std::fs::read_to_string(path)?;
    serde_yaml::from_str(&contents).map_err(|e| StoreError::Parse {
        path: path.to_path_buf(),
        source: e,
    })
}

fn home() -> Result<PathBuf, StoreError> {
    dirs::home_dir().ok_or(StoreError::HomeNotFound)
}

#[cfg(unix)]
fn set_dir_permissions(path: &Path) -> Result<(), StoreError> {
    use std::os::unix::fs::PermissionsExt;
    std::fs::set_permissions(path, std::fs::Permissions::from_mode(0o700))?;
    Ok(())
}
#[cfg(not(unix))]
fn set_dir_permissions(_path: &Path) -> Result<(), StoreError> {
    Ok(())
}

#[cfg(unix)]
fn set_file_permissions(path: &Path) -> Result<(), StoreError> {
    use std::os::unix::fs::PermissionsExt;
    std::fs::set_permissions(path, std::fs::Permissions::from_mode(0o600))?;
    Ok(())
}
#[cfg(not(unix))]
fn set_file_permissions(_path: &Path) -> Result<(), StoreError> {
    Ok(())
}

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::RecordStatus;
    use chrono::{TimeZone, Utc};
    use tempfile::TempDir;

    fn make_home() -> TempDir {
        TempDir::new().expect("tempdir")
    }

    fn record(id: &str, minute: u32) -> Record {
        Record {
            id: RecordId::from(id),
            status: RecordStatus::Published,
            created: Utc.with_ymd_and_hms(2024, 5, 1, 12, minute, 0).unwrap(),
            channel: Some(format!("Channel {id} (id: {id}-aa)")),
            category: None,
        }
    }

    #[test]
    fn record_path_is_correct() {
        let home = make_home();
        let path = record_path_at(home.path(), &RecordId::from("42")).expect("path");
        assert!(path.ends_with(".refsync/records/42.yaml"));
    }

    #[test]
    fn save_and_load_roundtrip() {
        let home = make_home();
        let store = FileRecordStore::at(home.path());
        let r = record("17", 3);
        store.save(&r).expect("save");
        let loaded = store.load(&r.id).expect("load").expect("present");
        assert_eq!(loaded, r);
    }

    #[test]
    fn records_dir_created_with_perms() {
        let home = make_home();
        let store = FileRecordStore::at(home.path());
        store.save(&record("1", 0)).expect("save");
        assert!(store.dir().exists());
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            let mode = std::fs::metadata(store.dir()).unwrap().permissions().mode() & 0o777;
            assert_eq!(mode, 0o700);
            let file = record_path_at(home.path(), &RecordId::from("1")).unwrap();
            let mode = std::fs::metadata(file).unwrap().permissions().mode() & 0o777;
            assert_eq!(mode, 0o600);
        }
    }

    #[test]
    fn atomic_write_cleans_up_tmp() {
        let home = make_home();
        let store = FileRecordStore::at(home.path());
        store.save(&record("9", 0)).expect("save");
        let tmp = store.dir().join("9.yaml.tmp");
        assert!(!tmp.exists(), ".tmp must be gone after successful save");
    }

    #[test]
    fn load_missing_returns_none() {
        let home = make_home();
        let store = FileRecordStore::at(home.path());
        assert!(store.load(&RecordId::from("nope")).expect("load").is_none());
    }

    #[test]
    fn path_traversal_ids_are_rejected() {
        let home = make_home();
        let store = FileRecordStore::at(home.path());
        let err = store.load(&RecordId::from("../etc/passwd")).unwrap_err();
        assert!(matches!(err, StoreError::InvalidId(_)));
        let err = validate_id(&RecordId::from("")).unwrap_err();
        assert!(err.to_string().contains("invalid record id"));
    }

    #[test]
    fn query_skips_unpublished_and_orders_newest_first() {
        let home = make_home();
        let store = FileRecordStore::at(home.path());
        store.save(&record("a", 1)).unwrap();
        store.save(&record("b", 3)).unwrap();
        let mut hidden = record("c", 5);
        hidden.status = RecordStatus::Unpublished;
        store.save(&hidden).unwrap();

        assert_eq!(store.count_published().unwrap(), 2);
        let page = store.query_published(0, 10).unwrap();
        assert_eq!(page, vec![RecordId::from("b"), RecordId::from("a")]);
        assert_eq!(store.query_published(1, 10).unwrap(), vec![RecordId::from("a")]);
    }

    #[test]
    fn list_all_empty_when_dir_missing() {
        let home = make_home();
        let store = FileRecordStore::at(home.path());
        assert!(store.list_all().expect("list").is_empty());
        assert_eq!(store.count_published().expect("count"), 0);
    }

    #[test]
    fn home_not_found_error_message() {
        assert!(StoreError::HomeNotFound.to_string().contains("home directory"));
    }
}
