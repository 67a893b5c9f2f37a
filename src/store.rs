use std::collections::HashSet;

use anyhow::{Result, bail};
use chrono::NaiveDate;
use tracing::warn;
use uuid::Uuid;

use crate::models::{DailyRecord, FoodEntry};
use crate::storage::RecordStorage;

/// Newest day first, the order the history renders in.
pub fn sort_newest_first(records: &mut [DailyRecord]) {
    records.sort_by(|a, b| b.date.cmp(&a.date));
}

/// The in-memory day-record collection. Holds at most one record per
/// calendar date, stays sorted newest-first, and writes the whole
/// collection back through its storage slot after every mutation.
pub struct RecordStore {
    records: Vec<DailyRecord>,
    storage: Box<dyn RecordStorage>,
}

impl RecordStore {
    /// Loads the full history once; the store is the only reader and
    /// writer of the slot from here on.
    #[must_use]
    pub fn open(storage: Box<dyn RecordStorage>) -> Self {
        let records = storage.load();
        Self { records, storage }
    }

    #[must_use]
    pub fn records(&self) -> &[DailyRecord] {
        &self.records
    }

    #[must_use]
    pub fn get(&self, id: Uuid) -> Option<&DailyRecord> {
        self.records.iter().find(|r| r.id == id)
    }

    #[must_use]
    pub fn find_by_date(&self, date: NaiveDate) -> Option<&DailyRecord> {
        self.records.iter().find(|r| r.date == date)
    }

    /// Merges a save into the record sharing `date`, or starts a new one.
    /// Foods append, steps add up, and the binge flag ORs in. Returns the
    /// id of the affected record.
    pub fn upsert_day(
        &mut self,
        date: NaiveDate,
        foods: Vec<FoodEntry>,
        steps: u32,
        binge: bool,
    ) -> Uuid {
        let id = match self.records.iter_mut().find(|r| r.date == date) {
            Some(record) => {
                record.append_foods(foods);
                record.add_steps(steps);
                record.set_binge(binge);
                record.id
            }
            None => {
                let mut record = DailyRecord::new(date);
                record.append_foods(foods);
                record.add_steps(steps);
                record.set_binge(binge);
                let id = record.id;
                self.records.push(record);
                id
            }
        };
        sort_newest_first(&mut self.records);
        self.persist();
        id
    }

    /// Removes every record whose id is in `ids`; unknown ids are skipped.
    pub fn delete_many(&mut self, ids: &HashSet<Uuid>) {
        self.records.retain(|r| !ids.contains(&r.id));
        self.persist();
    }

    /// Removes one food from one record. Returns false without persisting
    /// when the record is unknown; an unknown food id within a known
    /// record is not an error.
    pub fn delete_food(&mut self, record_id: Uuid, food_id: Uuid) -> bool {
        let Some(record) = self.records.iter_mut().find(|r| r.id == record_id) else {
            return false;
        };
        let removed = record.remove_food(food_id);
        self.persist();
        removed
    }

    pub fn reset_steps(&mut self, record_id: Uuid) -> bool {
        let Some(record) = self.records.iter_mut().find(|r| r.id == record_id) else {
            return false;
        };
        record.reset_steps();
        self.persist();
        true
    }

    /// Moves a record to a new calendar date. The edit is rejected when
    /// another record already holds that date; records never merge through
    /// a date edit. `Ok(false)` when the record is unknown.
    pub fn change_date(&mut self, record_id: Uuid, new_date: NaiveDate) -> Result<bool> {
        if self
            .records
            .iter()
            .any(|r| r.date == new_date && r.id != record_id)
        {
            bail!("A record for {new_date} already exists");
        }
        let Some(record) = self.records.iter_mut().find(|r| r.id == record_id) else {
            return Ok(false);
        };
        record.set_date(new_date);
        sort_newest_first(&mut self.records);
        self.persist();
        Ok(true)
    }

    /// Mean of the selected records' daily totals, floored to a whole
    /// kilocalorie. `None` when the selection matches no records; callers
    /// guard against empty selections instead of reading a zero.
    #[must_use]
    pub fn average_kcal(&self, ids: &HashSet<Uuid>) -> Option<i64> {
        let totals: Vec<i64> = self
            .records
            .iter()
            .filter(|r| ids.contains(&r.id))
            .map(DailyRecord::total_kcal)
            .collect();
        let count = i64::try_from(totals.len()).ok()?;
        if count == 0 {
            return None;
        }
        Some(totals.iter().sum::<i64>() / count)
    }

    /// A failed save is logged and swallowed; the in-memory state stays
    /// authoritative and the next successful save catches the slot up.
    fn persist(&self) {
        if let Err(e) = self.storage.save(&self.records) {
            warn!("failed to persist day records: {e:#}");
        }
    }
}
