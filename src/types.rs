//! Core types for the metabalance pipeline
//!
//! This module defines the data structures that flow through each stage of the
//! engine: raw observations, the user's goal profile, the derived daily trend,
//! and the final TDEE report.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// A single body-weight measurement, at most one per calendar day.
///
/// Composition fields are optional; when absent the engine falls back to
/// default energy-density assumptions rather than erroring.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeightObservation {
    /// Calendar day of the measurement
    pub date: NaiveDate,
    /// Measured weight (kg)
    pub weight_kg: f64,
    /// Body fat percentage (0-100), if the scale reports it
    #[serde(skip_serializing_if = "Option::is_none")]
    pub body_fat_pct: Option<f64>,
    /// Muscle mass percentage (0-100), if the scale reports it
    #[serde(skip_serializing_if = "Option::is_none")]
    pub muscle_mass_pct: Option<f64>,
    /// Basal metabolic rate (kcal/day), if the scale estimates it
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bmr: Option<f64>,
}

impl WeightObservation {
    /// Create a bare weight reading with no composition data
    pub fn new(date: NaiveDate, weight_kg: f64) -> Self {
        Self {
            date,
            weight_kg,
            body_fat_pct: None,
            muscle_mass_pct: None,
            bmr: None,
        }
    }
}

/// A single day's logged calorie intake, at most one per calendar day.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NutritionObservation {
    /// Calendar day of the log
    pub date: NaiveDate,
    /// Total calories logged for the day (kcal)
    pub calories: f64,
}

impl NutritionObservation {
    pub fn new(date: NaiveDate, calories: f64) -> Self {
        Self { date, calories }
    }
}

/// Direction of the user's weight goal
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GoalType {
    Lose,
    Gain,
    Maintain,
}

/// User gender, used only for calorie safety floors
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Gender {
    Male,
    Female,
}

/// The user's goal profile, including the two-field coaching state the
/// engine threads across check-ins.
///
/// `last_issued_target_kcal` and `last_check_in_date` are written together
/// after a successful computation and fed back in on the next call; they are
/// the only cross-call state the engine depends on.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GoalProfile {
    /// Direction of the goal
    pub goal_type: GoalType,
    /// Desired rate of change (kg/week, always positive)
    pub weekly_rate_kg: f64,
    /// Gender for safety-floor selection; unknown uses the generic floor
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gender: Option<Gender>,
    /// Goal weight (kg), enables ETA projections
    #[serde(skip_serializing_if = "Option::is_none")]
    pub target_weight_kg: Option<f64>,
    /// Daily target issued at the last check-in (kcal)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_issued_target_kcal: Option<f64>,
    /// Date of the last check-in that issued a target
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_check_in_date: Option<NaiveDate>,
}

impl GoalProfile {
    /// A maintenance profile with no history, useful as a default
    pub fn maintain() -> Self {
        Self {
            goal_type: GoalType::Maintain,
            weekly_rate_kg: 0.0,
            gender: None,
            target_weight_kg: None,
            last_issued_target_kcal: None,
            last_check_in_date: None,
        }
    }

    /// Load a profile from JSON
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Serialize the profile to JSON
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}

/// One day of the exponentially smoothed weight trend. Derived, never stored.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DailyTrendPoint {
    pub date: NaiveDate,
    pub smoothed_weight_kg: f64,
}

/// Confidence grade attached to a TDEE estimate
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Confidence {
    /// Not derived from observed behavior at all (formula fallback)
    None,
    Low,
    Medium,
    High,
}

/// Whether logged intake sits below, above, or near the estimated TDEE
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CalorieTrend {
    Deficit,
    Surplus,
    Maintenance,
}

/// The engine's sole output record, rebuilt from scratch on every call.
///
/// `daily_target_kcal` and the check-in date feed back into [`GoalProfile`]
/// for the next invocation; everything else is purely derived.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TdeeReport {
    /// Estimated total daily energy expenditure (kcal/day)
    pub tdee_kcal: f64,
    /// Recommended daily calorie target after rate limiting and floors
    pub daily_target_kcal: f64,
    /// Confidence grade for the estimate
    pub confidence: Confidence,
    /// Human-readable explanation of the confidence grade
    pub confidence_reason: String,
    /// Average logged daily intake over the window (kcal)
    pub avg_calories_kcal: f64,
    /// Observed weight change per week from the smoothed trend (kg)
    pub weight_change_per_week_kg: f64,
    /// Implausible readings removed before trend building
    pub outliers_count: usize,
    /// Raw weight logs found in the lookback window
    pub weight_logs_count: usize,
    /// Raw nutrition logs found in the lookback window
    pub nutrition_logs_count: usize,
    /// Most recent accepted weight reading (kg)
    pub latest_weight_kg: f64,
    /// Change in fat mass over the window (kg), when composition data exists
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fat_change_kg: Option<f64>,
    /// Change in muscle mass over the window (kg)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub muscle_change_kg: Option<f64>,
    /// Intake classified against the TDEE estimate
    pub calorie_trend: CalorieTrend,
    /// Weeks to reach the goal weight at the observed trend pace
    #[serde(skip_serializing_if = "Option::is_none")]
    pub weeks_to_goal: Option<f64>,
    /// Weeks to reach the goal weight at the stated goal pace
    #[serde(skip_serializing_if = "Option::is_none")]
    pub goal_eta_weeks: Option<f64>,
}

impl TdeeReport {
    /// Serialize the report to JSON
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    /// Load a report from JSON
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}

/// Compact answer for "what should I eat today", forwarded from the
/// last computed report.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CurrentTargets {
    pub tdee: f64,
    pub daily_target: f64,
    pub reason: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_profile_json_round_trip() {
        let profile = GoalProfile {
            goal_type: GoalType::Lose,
            weekly_rate_kg: 0.5,
            gender: Some(Gender::Female),
            target_weight_kg: Some(62.0),
            last_issued_target_kcal: Some(1800.0),
            last_check_in_date: Some(date(2024, 3, 1)),
        };

        let json = profile.to_json().unwrap();
        let loaded = GoalProfile::from_json(&json).unwrap();
        assert_eq!(profile, loaded);
    }

    #[test]
    fn test_goal_type_serialization_is_lowercase() {
        let json = serde_json::to_string(&GoalType::Lose).unwrap();
        assert_eq!(json, r#""lose""#);
        let json = serde_json::to_string(&Confidence::None).unwrap();
        assert_eq!(json, r#""none""#);
    }

    #[test]
    fn test_optional_fields_omitted_from_json() {
        let obs = WeightObservation::new(date(2024, 3, 1), 70.0);
        let json = serde_json::to_string(&obs).unwrap();
        assert!(!json.contains("body_fat_pct"));
        assert!(!json.contains("bmr"));
    }
}
