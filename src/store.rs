//! Data-access seams
//!
//! The engine never owns persistence; the surrounding system supplies a
//! weight-log reader, a nutrition-log reader, and a profile reader/writer
//! through these traits. [`MemoryStore`] implements all three for tests and
//! the CLI.

use crate::error::EngineError;
use crate::types::{GoalProfile, NutritionObservation, WeightObservation};
use chrono::NaiveDate;
use std::collections::HashMap;
use uuid::Uuid;

/// Reader for a user's weight log over a date range (inclusive).
pub trait WeightLogSource {
    fn weight_logs(
        &self,
        user_id: Uuid,
        from: NaiveDate,
        to: NaiveDate,
    ) -> Result<Vec<WeightObservation>, EngineError>;
}

/// Reader for a user's nutrition log over a date range (inclusive).
pub trait NutritionLogSource {
    fn nutrition_logs(
        &self,
        user_id: Uuid,
        from: NaiveDate,
        to: NaiveDate,
    ) -> Result<Vec<NutritionObservation>, EngineError>;
}

/// Reader/writer for goal profiles, including the two-field coaching state
/// the engine writes back after each successful computation.
pub trait ProfileStore {
    fn load_profile(&self, user_id: Uuid) -> Result<GoalProfile, EngineError>;

    /// Persist the coaching-state pair. Both fields are written together;
    /// a check-in date without a target must never exist.
    fn save_coaching_state(
        &mut self,
        user_id: Uuid,
        target_kcal: f64,
        check_in_date: NaiveDate,
    ) -> Result<(), EngineError>;
}

/// In-memory implementation of all three seams.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    profiles: HashMap<Uuid, GoalProfile>,
    weights: HashMap<Uuid, Vec<WeightObservation>>,
    nutrition: HashMap<Uuid, Vec<NutritionObservation>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn put_profile(&mut self, user_id: Uuid, profile: GoalProfile) {
        self.profiles.insert(user_id, profile);
    }

    pub fn put_weight_logs(&mut self, user_id: Uuid, logs: Vec<WeightObservation>) {
        self.weights.insert(user_id, logs);
    }

    pub fn put_nutrition_logs(&mut self, user_id: Uuid, logs: Vec<NutritionObservation>) {
        self.nutrition.insert(user_id, logs);
    }
}

impl WeightLogSource for MemoryStore {
    fn weight_logs(
        &self,
        user_id: Uuid,
        from: NaiveDate,
        to: NaiveDate,
    ) -> Result<Vec<WeightObservation>, EngineError> {
        Ok(self
            .weights
            .get(&user_id)
            .map(|logs| {
                logs.iter()
                    .filter(|o| o.date >= from && o.date <= to)
                    .cloned()
                    .collect()
            })
            .unwrap_or_default())
    }
}

impl NutritionLogSource for MemoryStore {
    fn nutrition_logs(
        &self,
        user_id: Uuid,
        from: NaiveDate,
        to: NaiveDate,
    ) -> Result<Vec<NutritionObservation>, EngineError> {
        Ok(self
            .nutrition
            .get(&user_id)
            .map(|logs| {
                logs.iter()
                    .filter(|o| o.date >= from && o.date <= to)
                    .cloned()
                    .collect()
            })
            .unwrap_or_default())
    }
}

impl ProfileStore for MemoryStore {
    fn load_profile(&self, user_id: Uuid) -> Result<GoalProfile, EngineError> {
        self.profiles
            .get(&user_id)
            .cloned()
            .ok_or(EngineError::ProfileNotFound(user_id))
    }

    fn save_coaching_state(
        &mut self,
        user_id: Uuid,
        target_kcal: f64,
        check_in_date: NaiveDate,
    ) -> Result<(), EngineError> {
        let profile = self
            .profiles
            .get_mut(&user_id)
            .ok_or(EngineError::ProfileNotFound(user_id))?;
        profile.last_issued_target_kcal = Some(target_kcal);
        profile.last_check_in_date = Some(check_in_date);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 5, day).unwrap()
    }

    #[test]
    fn test_range_filtering() {
        let user = Uuid::new_v4();
        let mut store = MemoryStore::new();
        store.put_weight_logs(
            user,
            (1..=20)
                .map(|d| WeightObservation::new(date(d), 70.0))
                .collect(),
        );

        let logs = store.weight_logs(user, date(5), date(10)).unwrap();
        assert_eq!(logs.len(), 6);
        assert_eq!(logs[0].date, date(5));
    }

    #[test]
    fn test_unknown_user_has_empty_logs() {
        let store = MemoryStore::new();
        let logs = store
            .weight_logs(Uuid::new_v4(), date(1), date(28))
            .unwrap();
        assert!(logs.is_empty());
    }

    #[test]
    fn test_missing_profile_is_an_error() {
        let store = MemoryStore::new();
        let err = store.load_profile(Uuid::new_v4()).unwrap_err();
        assert!(matches!(err, EngineError::ProfileNotFound(_)));
    }

    #[test]
    fn test_coaching_state_written_together() {
        let user = Uuid::new_v4();
        let mut store = MemoryStore::new();
        store.put_profile(user, GoalProfile::maintain());

        store.save_coaching_state(user, 2100.0, date(8)).unwrap();
        let profile = store.load_profile(user).unwrap();
        assert_eq!(profile.last_issued_target_kcal, Some(2100.0));
        assert_eq!(profile.last_check_in_date, Some(date(8)));
    }
}
