use std::cell::RefCell;
use std::fs;
use std::io::ErrorKind;
use std::ops::Deref;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tracing::{debug, warn};

use crate::models::DailyRecord;
use crate::store::sort_newest_first;

/// Storage slot holding the full day-record history as a single unit.
///
/// `load` never fails upward: a missing or undecodable slot yields an empty
/// history, handed over sorted newest-first. `save` replaces the slot
/// contents wholesale.
pub trait RecordStorage {
    fn load(&self) -> Vec<DailyRecord>;
    fn save(&self, records: &[DailyRecord]) -> Result<()>;
}

impl<T: Deref> RecordStorage for T
where
    T::Target: RecordStorage,
{
    fn load(&self) -> Vec<DailyRecord> {
        self.deref().load()
    }

    fn save(&self, records: &[DailyRecord]) -> Result<()> {
        self.deref().save(records)
    }
}

/// File-backed slot: one JSON document holding every record.
pub struct JsonFileStorage {
    path: PathBuf,
}

impl JsonFileStorage {
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl RecordStorage for JsonFileStorage {
    fn load(&self) -> Vec<DailyRecord> {
        let raw = match fs::read_to_string(&self.path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == ErrorKind::NotFound => return Vec::new(),
            Err(e) => {
                warn!("could not read {}: {e}", self.path.display());
                return Vec::new();
            }
        };
        match serde_json::from_str::<Vec<DailyRecord>>(&raw) {
            Ok(mut records) => {
                debug!(
                    "loaded {} day records from {}",
                    records.len(),
                    self.path.display()
                );
                sort_newest_first(&mut records);
                records
            }
            Err(e) => {
                warn!(
                    "discarding undecodable history at {}: {e}",
                    self.path.display()
                );
                Vec::new()
            }
        }
    }

    /// Serializes fully before touching the slot, then writes through a
    /// temp file and an atomic rename, so a failed save leaves the previous
    /// contents in place.
    fn save(&self, records: &[DailyRecord]) -> Result<()> {
        let json = serde_json::to_vec(records).context("Failed to serialize day records")?;
        let tmp = self.path.with_extension("tmp");
        fs::write(&tmp, &json).with_context(|| format!("Failed to write {}", tmp.display()))?;
        fs::rename(&tmp, &self.path)
            .with_context(|| format!("Failed to replace {}", self.path.display()))?;
        Ok(())
    }
}

/// In-memory slot for tests and throwaway sessions.
#[derive(Default)]
pub struct MemoryStorage {
    records: RefCell<Vec<DailyRecord>>,
}

impl RecordStorage for MemoryStorage {
    fn load(&self) -> Vec<DailyRecord> {
        let mut records = self.records.borrow().clone();
        sort_newest_first(&mut records);
        records
    }

    fn save(&self, records: &[DailyRecord]) -> Result<()> {
        *self.records.borrow_mut() = records.to_vec();
        Ok(())
    }
}
