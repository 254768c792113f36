//! TDEE estimation
//!
//! Two cooperating pieces: a generator that turns each trend-day with a
//! logged calorie total into one energy-balance observation ("what TDEE
//! would explain this day"), and a smoother that refines a formula-based
//! prior with those observations through an EMA. The prior anchors the
//! estimate when observations are sparse or noisy; recent observations
//! carry the most weight.

use crate::types::DailyTrendPoint;
use chrono::NaiveDate;
use std::collections::BTreeMap;

/// EMA span for blending observations into the prior (alpha = 2/(span+1))
pub const DEFAULT_SMOOTHING_SPAN: usize = 21;

/// Absolute sanity bounds on any TDEE estimate (kcal/day)
pub const TDEE_MIN_KCAL: f64 = 1200.0;
pub const TDEE_MAX_KCAL: f64 = 5000.0;

/// One energy-balance observation per trend day that has a logged calorie
/// total: `calories[d] - (trend[d] - trend[d-1]) * energy_per_kg`.
///
/// Days without a nutrition log are skipped, never manufactured. The trend
/// is daily and sorted by construction, so observations come out in
/// chronological order regardless of how the nutrition map was built.
pub fn generate_observations(
    trend: &[DailyTrendPoint],
    calories_by_date: &BTreeMap<NaiveDate, f64>,
    energy_per_kg: f64,
) -> Vec<f64> {
    let mut observations = Vec::new();
    for pair in trend.windows(2) {
        let (previous, current) = (pair[0], pair[1]);
        if let Some(&calories) = calories_by_date.get(&current.date) {
            let delta = current.smoothed_weight_kg - previous.smoothed_weight_kg;
            observations.push(calories - delta * energy_per_kg);
        }
    }
    observations
}

/// Classical energy-balance prior over the whole period:
/// `avg_calories - total_weight_change * energy_per_kg / days_elapsed`.
pub fn formula_prior(
    avg_calories: f64,
    total_weight_change_kg: f64,
    days_elapsed: i64,
    energy_per_kg: f64,
) -> f64 {
    if days_elapsed <= 0 {
        return avg_calories;
    }
    avg_calories - total_weight_change_kg * energy_per_kg / days_elapsed as f64
}

/// Fold the observations into the prior with an EMA seeded at the prior.
///
/// No observations leave the prior untouched; span 1 collapses to the last
/// observation.
pub fn smooth_observations(observations: &[f64], prior: f64, span: usize) -> f64 {
    let span = span.max(1);
    let alpha = 2.0 / (span as f64 + 1.0);
    observations
        .iter()
        .fold(prior, |estimate, &observation| {
            estimate + alpha * (observation - estimate)
        })
}

/// Clamp an estimate to the absolute sanity bounds.
pub fn clamp_tdee(tdee: f64) -> f64 {
    tdee.clamp(TDEE_MIN_KCAL, TDEE_MAX_KCAL)
}
