use anyhow::{Context, Result, bail};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Kilojoules per kilocalorie, the fixed conversion constant.
pub const KJ_PER_KCAL: f64 = 4.184;

pub const ENERGY_UNITS: &[&str] = &["kcal", "kj"];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EnergyUnit {
    #[serde(rename = "kcal")]
    Kilocalorie,
    #[serde(rename = "kj")]
    Kilojoule,
}

pub fn validate_energy_unit(unit: &str) -> Result<EnergyUnit> {
    match unit.trim().to_lowercase().as_str() {
        "kcal" | "kilocalorie" | "kilocalories" => Ok(EnergyUnit::Kilocalorie),
        "kj" | "kilojoule" | "kilojoules" => Ok(EnergyUnit::Kilojoule),
        _ => bail!(
            "Invalid energy unit '{unit}'. Must be one of: {}",
            ENERGY_UNITS.join(", ")
        ),
    }
}

/// A quantity of food energy tagged with its unit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnergyValue {
    pub amount: u32,
    pub unit: EnergyUnit,
}

impl EnergyValue {
    #[must_use]
    pub fn new(amount: u32, unit: EnergyUnit) -> Self {
        Self { amount, unit }
    }

    /// Parse an amount typed into a text field. Rejects anything that is
    /// not a non-negative whole number.
    pub fn parse(text: &str, unit: EnergyUnit) -> Result<Self> {
        let amount: u32 = text.trim().parse().with_context(|| {
            format!("Invalid energy amount: '{text}'. Use a non-negative whole number")
        })?;
        Ok(Self { amount, unit })
    }

    #[must_use]
    pub fn as_kcal(&self) -> f64 {
        match self.unit {
            EnergyUnit::Kilocalorie => f64::from(self.amount),
            EnergyUnit::Kilojoule => f64::from(self.amount) / KJ_PER_KCAL,
        }
    }
}

/// One named food with its energy, belonging to a single day record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FoodEntry {
    pub id: Uuid,
    pub name: String,
    pub energy: EnergyValue,
}

impl FoodEntry {
    /// The id is generated here and stays stable across edits; deletion
    /// targets it rather than the (non-unique) name.
    pub fn new(name: &str, energy: EnergyValue) -> Result<Self> {
        let name = name.trim();
        if name.is_empty() {
            bail!("Food name must not be empty");
        }
        Ok(Self {
            id: Uuid::new_v4(),
            name: name.to_string(),
            energy,
        })
    }
}

/// Everything logged for one calendar date: foods, steps, and the binge flag.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailyRecord {
    pub id: Uuid,
    pub date: NaiveDate,
    pub foods: Vec<FoodEntry>,
    pub steps: u32,
    pub binge: bool,
}

impl DailyRecord {
    #[must_use]
    pub fn new(date: NaiveDate) -> Self {
        Self {
            id: Uuid::new_v4(),
            date,
            foods: Vec::new(),
            steps: 0,
            binge: false,
        }
    }

    /// Total energy for the day in whole kilocalories, truncated toward zero.
    #[must_use]
    pub fn total_kcal(&self) -> i64 {
        self.foods.iter().map(|f| f.energy.as_kcal()).sum::<f64>() as i64
    }

    /// Appends in order; duplicate names are allowed.
    pub fn append_foods(&mut self, foods: Vec<FoodEntry>) {
        self.foods.extend(foods);
    }

    pub fn add_steps(&mut self, n: u32) {
        self.steps = self.steps.saturating_add(n);
    }

    /// Merging is a logical OR: once a day is marked, a later save with
    /// `false` never clears it.
    pub fn set_binge(&mut self, flag: bool) {
        self.binge = self.binge || flag;
    }

    /// Removes the entry with that id. Returns false (and changes nothing)
    /// when no entry matches.
    pub fn remove_food(&mut self, food_id: Uuid) -> bool {
        let before = self.foods.len();
        self.foods.retain(|f| f.id != food_id);
        self.foods.len() < before
    }

    pub fn reset_steps(&mut self) {
        self.steps = 0;
    }

    /// Reassigns the calendar date. The store re-sorts and enforces the
    /// one-record-per-date rule.
    pub fn set_date(&mut self, date: NaiveDate) {
        self.date = date;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kcal(amount: u32) -> EnergyValue {
        EnergyValue::new(amount, EnergyUnit::Kilocalorie)
    }

    fn kj(amount: u32) -> EnergyValue {
        EnergyValue::new(amount, EnergyUnit::Kilojoule)
    }

    fn sample_date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 6, 15).unwrap()
    }

    #[test]
    fn test_kcal_value_passes_through() {
        assert!((kcal(95).as_kcal() - 95.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_kj_converts_to_kcal() {
        assert!((kj(4184).as_kcal() - 1000.0).abs() < 1e-9);
    }

    #[test]
    fn test_zero_amount_is_valid() {
        assert!((kcal(0).as_kcal() - 0.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_parse_energy_amount() {
        let v = EnergyValue::parse("95", EnergyUnit::Kilocalorie).unwrap();
        assert_eq!(v.amount, 95);
        let v = EnergyValue::parse(" 150 ", EnergyUnit::Kilojoule).unwrap();
        assert_eq!(v.amount, 150);
    }

    #[test]
    fn test_parse_energy_amount_invalid() {
        assert!(EnergyValue::parse("", EnergyUnit::Kilocalorie).is_err());
        assert!(EnergyValue::parse("abc", EnergyUnit::Kilocalorie).is_err());
        assert!(EnergyValue::parse("-5", EnergyUnit::Kilocalorie).is_err());
        assert!(EnergyValue::parse("12.5", EnergyUnit::Kilocalorie).is_err());
    }

    #[test]
    fn test_validate_energy_unit() {
        assert_eq!(
            validate_energy_unit("kcal").unwrap(),
            EnergyUnit::Kilocalorie
        );
        assert_eq!(validate_energy_unit("KJ").unwrap(), EnergyUnit::Kilojoule);
        assert_eq!(
            validate_energy_unit("Kilojoules").unwrap(),
            EnergyUnit::Kilojoule
        );
    }

    #[test]
    fn test_validate_energy_unit_invalid() {
        assert!(validate_energy_unit("cal").is_err());
        assert!(validate_energy_unit("").is_err());
    }

    #[test]
    fn test_food_entry_trims_name() {
        let entry = FoodEntry::new("  Apple  ", kcal(95)).unwrap();
        assert_eq!(entry.name, "Apple");
    }

    #[test]
    fn test_food_entry_empty_name() {
        assert!(FoodEntry::new("", kcal(95)).is_err());
        assert!(FoodEntry::new("   ", kcal(95)).is_err());
    }

    #[test]
    fn test_food_entry_ids_are_unique() {
        let a = FoodEntry::new("Apple", kcal(95)).unwrap();
        let b = FoodEntry::new("Apple", kcal(95)).unwrap();
        assert_ne!(a.id, b.id);
    }

    #[test]
    fn test_new_record_is_empty() {
        let record = DailyRecord::new(sample_date());
        assert!(record.foods.is_empty());
        assert_eq!(record.steps, 0);
        assert!(!record.binge);
        assert_eq!(record.total_kcal(), 0);
    }

    #[test]
    fn test_total_kcal_sums_and_truncates() {
        let mut record = DailyRecord::new(sample_date());
        record.append_foods(vec![
            FoodEntry::new("Apple", kcal(95)).unwrap(),
            FoodEntry::new("Soda", kcal(150)).unwrap(),
        ]);
        assert_eq!(record.total_kcal(), 245);

        // 200 kJ = 47.8... kcal, truncated to 47
        let mut record = DailyRecord::new(sample_date());
        record.append_foods(vec![FoodEntry::new("Juice", kj(200)).unwrap()]);
        assert_eq!(record.total_kcal(), 47);
    }

    #[test]
    fn test_total_kcal_order_independent() {
        let a = FoodEntry::new("Apple", kcal(95)).unwrap();
        let b = FoodEntry::new("Juice", kj(200)).unwrap();
        let c = FoodEntry::new("Soda", kcal(150)).unwrap();

        let mut forward = DailyRecord::new(sample_date());
        forward.append_foods(vec![a.clone(), b.clone(), c.clone()]);
        let mut reverse = DailyRecord::new(sample_date());
        reverse.append_foods(vec![c, b, a]);

        assert_eq!(forward.total_kcal(), reverse.total_kcal());
    }

    #[test]
    fn test_append_foods_keeps_duplicates() {
        let mut record = DailyRecord::new(sample_date());
        record.append_foods(vec![
            FoodEntry::new("Apple", kcal(95)).unwrap(),
            FoodEntry::new("Apple", kcal(95)).unwrap(),
        ]);
        assert_eq!(record.foods.len(), 2);
    }

    #[test]
    fn test_add_steps_accumulates() {
        let mut record = DailyRecord::new(sample_date());
        record.add_steps(1000);
        record.add_steps(0);
        record.add_steps(500);
        assert_eq!(record.steps, 1500);
    }

    #[test]
    fn test_binge_flag_never_clears() {
        let mut record = DailyRecord::new(sample_date());
        record.set_binge(false);
        assert!(!record.binge);
        record.set_binge(true);
        record.set_binge(false);
        assert!(record.binge);
    }

    #[test]
    fn test_remove_food_by_id() {
        let apple = FoodEntry::new("Apple", kcal(95)).unwrap();
        let soda = FoodEntry::new("Soda", kcal(150)).unwrap();
        let apple_id = apple.id;

        let mut record = DailyRecord::new(sample_date());
        record.append_foods(vec![apple, soda]);

        assert!(record.remove_food(apple_id));
        assert_eq!(record.foods.len(), 1);
        assert_eq!(record.foods[0].name, "Soda");
    }

    #[test]
    fn test_remove_food_missing_id_is_noop() {
        let mut record = DailyRecord::new(sample_date());
        record.append_foods(vec![FoodEntry::new("Apple", kcal(95)).unwrap()]);

        assert!(!record.remove_food(Uuid::new_v4()));
        assert_eq!(record.foods.len(), 1);
    }

    #[test]
    fn test_reset_steps() {
        let mut record = DailyRecord::new(sample_date());
        record.add_steps(9000);
        record.reset_steps();
        assert_eq!(record.steps, 0);
    }
}
