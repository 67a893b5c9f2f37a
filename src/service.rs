use std::collections::HashSet;
use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use chrono::{Local, NaiveDate};
use uuid::Uuid;

use crate::config::Config;
use crate::models::{DailyRecord, EnergyValue, FoodEntry, validate_energy_unit};
use crate::storage::{JsonFileStorage, MemoryStorage};
use crate::store::RecordStore;

/// Builds a food entry from raw text-field input.
///
/// Returns `None` when the name is empty, the amount is not a non-negative
/// whole number, or the unit tag is unknown; the caller treats that as a
/// no-op add rather than an error.
#[must_use]
pub fn parse_food_input(name: &str, amount: &str, unit: &str) -> Option<FoodEntry> {
    let unit = validate_energy_unit(unit).ok()?;
    let energy = EnergyValue::parse(amount, unit).ok()?;
    FoodEntry::new(name, energy).ok()
}

/// Step-count text parses leniently: anything unreadable counts as zero.
#[must_use]
pub fn parse_steps_input(text: &str) -> u32 {
    text.trim().parse().unwrap_or(0)
}

fn parse_day(date: Option<&str>) -> Result<NaiveDate> {
    match date {
        None => Ok(Local::now().date_naive()),
        Some(s) => NaiveDate::parse_from_str(s, "%Y-%m-%d")
            .with_context(|| format!("Invalid date '{s}'. Use YYYY-MM-DD")),
    }
}

/// The API surface UI front ends drive. Owns the record store and keeps
/// every operation synchronous; callers re-read `history()` after each
/// mutation to render.
pub struct BitelogService {
    store: RecordStore,
}

impl BitelogService {
    pub fn new(store_path: &Path) -> Result<Self> {
        if let Some(dir) = store_path.parent().filter(|d| !d.as_os_str().is_empty()) {
            fs::create_dir_all(dir)
                .with_context(|| format!("Failed to create data directory: {}", dir.display()))?;
        }
        let store = RecordStore::open(Box::new(JsonFileStorage::new(store_path)));
        Ok(Self { store })
    }

    #[must_use]
    pub fn new_in_memory() -> Self {
        Self {
            store: RecordStore::open(Box::new(MemoryStorage::default())),
        }
    }

    /// Opens the history at its per-user default location.
    pub fn open_default() -> Result<Self> {
        let config = Config::load()?;
        Self::new(&config.store_path)
    }

    /// Saves a day's input. `date` of `None` means today; otherwise
    /// YYYY-MM-DD. Saving twice for one date merges into the same record.
    pub fn log_day(
        &mut self,
        date: Option<&str>,
        foods: Vec<FoodEntry>,
        steps: &str,
        binge: bool,
    ) -> Result<Uuid> {
        let date = parse_day(date)?;
        let steps = parse_steps_input(steps);
        Ok(self.store.upsert_day(date, foods, steps, binge))
    }

    /// Full history, newest day first.
    #[must_use]
    pub fn history(&self) -> &[DailyRecord] {
        self.store.records()
    }

    #[must_use]
    pub fn record(&self, id: Uuid) -> Option<&DailyRecord> {
        self.store.get(id)
    }

    #[must_use]
    pub fn day(&self, date: NaiveDate) -> Option<&DailyRecord> {
        self.store.find_by_date(date)
    }

    pub fn delete_days(&mut self, ids: &HashSet<Uuid>) {
        self.store.delete_many(ids);
    }

    pub fn delete_food(&mut self, record_id: Uuid, food_id: Uuid) -> bool {
        self.store.delete_food(record_id, food_id)
    }

    pub fn reset_steps(&mut self, record_id: Uuid) -> bool {
        self.store.reset_steps(record_id)
    }

    /// Re-dates a record. Fails on an unparsable date or when another
    /// record already holds the target date.
    pub fn move_day(&mut self, record_id: Uuid, date: &str) -> Result<bool> {
        let date = parse_day(Some(date))?;
        self.store.change_date(record_id, date)
    }

    #[must_use]
    pub fn average_kcal(&self, ids: &HashSet<Uuid>) -> Option<i64> {
        self.store.average_kcal(ids)
    }
}
