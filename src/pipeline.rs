//! Pipeline orchestration
//!
//! Composes the stages into one synchronous computation per check-in:
//! outlier filtering, trend building, energy-density estimation, TDEE
//! observation and smoothing, confidence grading, coaching-target
//! derivation, and goal projections. The orchestrator also threads the
//! two-field coaching state through the profile store so the gradual
//! adjustment limiter stays stateful across calls.

use crate::coaching::{enforce_safety_floor, gender_floor, ideal_target, limit_adjustment};
use crate::composition::{composition_change, goal_eta_weeks, weeks_to_goal};
use crate::confidence::{insufficient_data, score_confidence};
use crate::energy::energy_per_kg;
use crate::error::EngineError;
use crate::outliers::filter_outliers;
use crate::store::{NutritionLogSource, ProfileStore, WeightLogSource};
use crate::tdee::{
    clamp_tdee, formula_prior, generate_observations, smooth_observations, DEFAULT_SMOOTHING_SPAN,
};
use crate::trend::{build_daily_trend, trend_slope_kg_per_week};
use crate::types::{
    CalorieTrend, CurrentTargets, GoalProfile, NutritionObservation, TdeeReport, WeightObservation,
};
use chrono::{Duration, Local, NaiveDate};
use std::collections::BTreeMap;
use tracing::{debug, warn};
use uuid::Uuid;

/// Default lookback window for a check-in
pub const DEFAULT_LOOKBACK_WEEKS: u32 = 4;

/// Largest accepted lookback window
pub const MAX_LOOKBACK_WEEKS: u32 = 52;

/// Minimum raw weight logs for an observed estimate
pub const MIN_WEIGHT_LOGS: usize = 2;

/// Minimum distinct nutrition-log days for an observed estimate
pub const MIN_NUTRITION_DAYS: usize = 7;

// Sedentary multiplier applied to a scale-reported BMR in the fallback path.
const BMR_ACTIVITY_MULTIPLIER: f64 = 1.2;

// Intake within this band of TDEE counts as maintenance.
const CALORIE_TREND_BAND_KCAL: f64 = 50.0;

/// Run one check-in computation against the given collaborators, using
/// today's local date, and persist the coaching state on success.
pub fn calculate_tdee(
    weights: &dyn WeightLogSource,
    nutrition: &dyn NutritionLogSource,
    profiles: &mut dyn ProfileStore,
    user_id: Uuid,
    lookback_weeks: u32,
) -> Result<TdeeReport, EngineError> {
    calculate_tdee_at(
        weights,
        nutrition,
        profiles,
        user_id,
        lookback_weeks,
        Local::now().date_naive(),
    )
}

/// [`calculate_tdee`] with an explicit "today", for deterministic tests and
/// backfill tooling.
pub fn calculate_tdee_at(
    weights: &dyn WeightLogSource,
    nutrition: &dyn NutritionLogSource,
    profiles: &mut dyn ProfileStore,
    user_id: Uuid,
    lookback_weeks: u32,
    today: NaiveDate,
) -> Result<TdeeReport, EngineError> {
    validate_lookback(lookback_weeks)?;
    let profile = profiles.load_profile(user_id)?;
    validate_profile(&profile)?;

    let from = today - Duration::weeks(i64::from(lookback_weeks));
    let weight_logs = weights.weight_logs(user_id, from, today)?;
    let nutrition_logs = nutrition.nutrition_logs(user_id, from, today)?;
    debug!(
        %user_id,
        weight_logs = weight_logs.len(),
        nutrition_logs = nutrition_logs.len(),
        lookback_weeks,
        "fetched check-in window"
    );

    let report = run_pipeline(&weight_logs, &nutrition_logs, &profile, today);
    profiles.save_coaching_state(user_id, report.daily_target_kcal, today)?;
    Ok(report)
}

/// The pure pipeline: no I/O, no clock, no mutation of its inputs. Always
/// produces a report; insufficient data degrades to a formula-based
/// fallback rather than an error.
pub fn run_pipeline(
    weights: &[WeightObservation],
    nutrition: &[NutritionObservation],
    profile: &GoalProfile,
    today: NaiveDate,
) -> TdeeReport {
    let mut weights_sorted = weights.to_vec();
    weights_sorted.sort_by_key(|o| o.date);

    // One entry per day; the source guarantees uniqueness but a BTreeMap
    // keeps iteration chronological either way.
    let calories_by_date: BTreeMap<NaiveDate, f64> = nutrition
        .iter()
        .map(|o| (o.date, o.calories))
        .collect();

    let weight_logs_count = weights_sorted.len();
    let nutrition_logs_count = calories_by_date.len();

    if weight_logs_count < MIN_WEIGHT_LOGS || nutrition_logs_count < MIN_NUTRITION_DAYS {
        warn!(
            weight_logs_count,
            nutrition_logs_count, "insufficient data, falling back to formula estimate"
        );
        return fallback_report(&weights_sorted, &calories_by_date, profile, today, 0);
    }

    let (filtered, outliers_count) = filter_outliers(&weights_sorted);
    if filtered.len() < MIN_WEIGHT_LOGS {
        return fallback_report(
            &weights_sorted,
            &calories_by_date,
            profile,
            today,
            outliers_count,
        );
    }

    let trend = build_daily_trend(&filtered);
    let weekly_slope = trend_slope_kg_per_week(&trend);

    let latest_body_fat = filtered.iter().rev().find_map(|o| o.body_fat_pct);
    let kcal_per_kg = energy_per_kg(latest_body_fat, weekly_slope);

    let avg_calories =
        calories_by_date.values().sum::<f64>() / nutrition_logs_count as f64;

    // Endpoint-based energy balance over the whole period seeds the prior.
    let (first, last) = (trend[0], trend[trend.len() - 1]);
    let days_elapsed = (last.date - first.date).num_days();
    let total_change = last.smoothed_weight_kg - first.smoothed_weight_kg;
    let prior = formula_prior(avg_calories, total_change, days_elapsed, kcal_per_kg);

    let observations = generate_observations(&trend, &calories_by_date, kcal_per_kg);
    let tdee = clamp_tdee(smooth_observations(
        &observations,
        prior,
        DEFAULT_SMOOTHING_SPAN,
    ));
    debug!(
        tdee,
        prior,
        observations = observations.len(),
        kcal_per_kg,
        "tdee estimated"
    );

    let logged_days = calories_by_date.range(first.date..=last.date).count();
    let (confidence, confidence_reason) = score_confidence(trend.len(), logged_days);

    let ideal = ideal_target(tdee, profile);
    let limited = limit_adjustment(
        ideal,
        profile.last_issued_target_kcal,
        profile.last_check_in_date,
        today,
    );
    let daily_target = enforce_safety_floor(limited, tdee, profile.gender);

    let latest_weight = filtered.last().map_or(0.0, |o| o.weight_kg);
    let weight_change_per_week = if days_elapsed > 0 {
        total_change / days_elapsed as f64 * 7.0
    } else {
        0.0
    };
    let composition = composition_change(&filtered);

    TdeeReport {
        tdee_kcal: tdee,
        daily_target_kcal: daily_target,
        confidence,
        confidence_reason,
        avg_calories_kcal: avg_calories,
        weight_change_per_week_kg: weight_change_per_week,
        outliers_count,
        weight_logs_count,
        nutrition_logs_count,
        latest_weight_kg: latest_weight,
        fat_change_kg: composition.map(|c| c.fat_change_kg),
        muscle_change_kg: composition.map(|c| c.muscle_change_kg),
        calorie_trend: classify_calorie_trend(avg_calories, tdee),
        weeks_to_goal: weeks_to_goal(latest_weight, profile.target_weight_kg, weekly_slope),
        goal_eta_weeks: goal_eta_weeks(
            latest_weight,
            profile.target_weight_kg,
            profile.weekly_rate_kg,
        ),
    }
}

/// Formula-based response when the window cannot support an observed
/// estimate: a BMR-derived TDEE when a scale reported one, otherwise the
/// gender floor. Never zero or negative, and the full coaching chain still
/// runs so the issued target obeys the limiter and floors.
fn fallback_report(
    weights_sorted: &[WeightObservation],
    calories_by_date: &BTreeMap<NaiveDate, f64>,
    profile: &GoalProfile,
    today: NaiveDate,
    outliers_count: usize,
) -> TdeeReport {
    let floor = gender_floor(profile.gender);
    let tdee = weights_sorted
        .iter()
        .rev()
        .find_map(|o| o.bmr)
        .map_or(floor, |bmr| (bmr * BMR_ACTIVITY_MULTIPLIER).max(floor));

    let (confidence, confidence_reason) = insufficient_data();

    let avg_calories = if calories_by_date.is_empty() {
        0.0
    } else {
        calories_by_date.values().sum::<f64>() / calories_by_date.len() as f64
    };
    let calorie_trend = if calories_by_date.is_empty() {
        CalorieTrend::Maintenance
    } else {
        classify_calorie_trend(avg_calories, tdee)
    };

    let ideal = ideal_target(tdee, profile);
    let limited = limit_adjustment(
        ideal,
        profile.last_issued_target_kcal,
        profile.last_check_in_date,
        today,
    );
    let daily_target = enforce_safety_floor(limited, tdee, profile.gender);

    let latest_weight = weights_sorted.last().map_or(0.0, |o| o.weight_kg);
    let goal_eta = if weights_sorted.is_empty() {
        None
    } else {
        goal_eta_weeks(latest_weight, profile.target_weight_kg, profile.weekly_rate_kg)
    };
    let composition = composition_change(weights_sorted);

    TdeeReport {
        tdee_kcal: tdee,
        daily_target_kcal: daily_target,
        confidence,
        confidence_reason,
        avg_calories_kcal: avg_calories,
        weight_change_per_week_kg: 0.0,
        outliers_count,
        weight_logs_count: weights_sorted.len(),
        nutrition_logs_count: calories_by_date.len(),
        latest_weight_kg: latest_weight,
        fat_change_kg: composition.map(|c| c.fat_change_kg),
        muscle_change_kg: composition.map(|c| c.muscle_change_kg),
        calorie_trend,
        weeks_to_goal: None,
        goal_eta_weeks: goal_eta,
    }
}

fn classify_calorie_trend(avg_calories: f64, tdee: f64) -> CalorieTrend {
    if avg_calories < tdee - CALORIE_TREND_BAND_KCAL {
        CalorieTrend::Deficit
    } else if avg_calories > tdee + CALORIE_TREND_BAND_KCAL {
        CalorieTrend::Surplus
    } else {
        CalorieTrend::Maintenance
    }
}

fn validate_lookback(lookback_weeks: u32) -> Result<(), EngineError> {
    if !(1..=MAX_LOOKBACK_WEEKS).contains(&lookback_weeks) {
        return Err(EngineError::InvalidLookback(lookback_weeks));
    }
    Ok(())
}

fn validate_profile(profile: &GoalProfile) -> Result<(), EngineError> {
    if profile.last_check_in_date.is_some() && profile.last_issued_target_kcal.is_none() {
        return Err(EngineError::InvalidProfile(
            "last_check_in_date set without last_issued_target_kcal".to_string(),
        ));
    }
    Ok(())
}

/// Stateful convenience wrapper around one combined store.
///
/// Useful when a single backend implements all three seams, as the
/// in-memory store does. Callers with separate repositories use
/// [`calculate_tdee`] directly.
pub struct TdeeEngine<S> {
    store: S,
}

impl<S> TdeeEngine<S>
where
    S: WeightLogSource + NutritionLogSource + ProfileStore,
{
    pub fn new(store: S) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn into_store(self) -> S {
        self.store
    }

    /// One check-in with the default lookback window.
    pub fn calculate_tdee(&mut self, user_id: Uuid) -> Result<TdeeReport, EngineError> {
        self.calculate_with_lookback(user_id, DEFAULT_LOOKBACK_WEEKS)
    }

    pub fn calculate_with_lookback(
        &mut self,
        user_id: Uuid,
        lookback_weeks: u32,
    ) -> Result<TdeeReport, EngineError> {
        self.calculate_at(user_id, lookback_weeks, Local::now().date_naive())
    }

    /// Check-in at an explicit date; the single-store equivalent of
    /// [`calculate_tdee_at`].
    pub fn calculate_at(
        &mut self,
        user_id: Uuid,
        lookback_weeks: u32,
        today: NaiveDate,
    ) -> Result<TdeeReport, EngineError> {
        validate_lookback(lookback_weeks)?;
        let profile = self.store.load_profile(user_id)?;
        validate_profile(&profile)?;

        let from = today - Duration::weeks(i64::from(lookback_weeks));
        let weight_logs = self.store.weight_logs(user_id, from, today)?;
        let nutrition_logs = self.store.nutrition_logs(user_id, from, today)?;

        let report = run_pipeline(&weight_logs, &nutrition_logs, &profile, today);
        self.store
            .save_coaching_state(user_id, report.daily_target_kcal, today)?;
        Ok(report)
    }

    /// Forward the latest computation as a compact "what should I eat
    /// today" answer.
    pub fn current_targets(&mut self, user_id: Uuid) -> Result<CurrentTargets, EngineError> {
        let report = self.calculate_tdee(user_id)?;
        Ok(CurrentTargets {
            tdee: report.tdee_kcal,
            daily_target: report.daily_target_kcal,
            reason: report.confidence_reason,
        })
    }
}
