//! Body-composition change and time-to-goal projection
//!
//! Fat and muscle mass changes come from the actual recorded weights and
//! percentages at the first and last days carrying composition data, never
//! from regression-predicted weights; mixing two estimators would compound
//! their errors. ETA is projected two ways so callers can show both "at
//! your current pace" and "at your stated goal pace".

use crate::types::WeightObservation;

/// Weekly trend slopes smaller than this count as "not moving" (kg/week)
pub const MIN_MEANINGFUL_SLOPE_KG_PER_WEEK: f64 = 0.01;

/// Residual distance to the goal weight treated as already there (kg)
pub const GOAL_EPSILON_KG: f64 = 0.05;

/// Fat and muscle mass change over the series (kg).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CompositionChange {
    pub fat_change_kg: f64,
    pub muscle_change_kg: f64,
}

/// Compute composition change from the first and last observations that
/// carry a body-fat percentage. `None` when fewer than two distinct days
/// have composition data.
///
/// Muscle change uses recorded muscle percentages when both endpoints have
/// them; otherwise all non-fat change is attributed to lean mass.
pub fn composition_change(series: &[WeightObservation]) -> Option<CompositionChange> {
    let mut with_composition = series.iter().filter(|o| o.body_fat_pct.is_some());
    let first = with_composition.next()?;
    let last = with_composition.next_back().unwrap_or(first);
    if first.date == last.date {
        return None;
    }

    let fat_start = first.weight_kg * first.body_fat_pct? / 100.0;
    let fat_end = last.weight_kg * last.body_fat_pct? / 100.0;
    let fat_change_kg = fat_end - fat_start;

    let muscle_change_kg = match (first.muscle_mass_pct, last.muscle_mass_pct) {
        (Some(start_pct), Some(end_pct)) => {
            last.weight_kg * end_pct / 100.0 - first.weight_kg * start_pct / 100.0
        }
        _ => (last.weight_kg - first.weight_kg) - fat_change_kg,
    };

    Some(CompositionChange {
        fat_change_kg,
        muscle_change_kg,
    })
}

/// Weeks to reach the goal weight at the observed trend pace.
///
/// `None` when no goal weight is set, the trend is flat, or the trend is
/// moving away from the goal.
pub fn weeks_to_goal(
    latest_weight_kg: f64,
    target_weight_kg: Option<f64>,
    trend_slope_kg_per_week: f64,
) -> Option<f64> {
    let target = target_weight_kg?;
    let remaining = target - latest_weight_kg;
    if remaining.abs() <= GOAL_EPSILON_KG {
        return Some(0.0);
    }
    if trend_slope_kg_per_week.abs() < MIN_MEANINGFUL_SLOPE_KG_PER_WEEK {
        return None;
    }
    let weeks = remaining / trend_slope_kg_per_week;
    if weeks < 0.0 {
        // Moving in the wrong direction.
        None
    } else {
        Some(weeks)
    }
}

/// Weeks to reach the goal weight at the profile's stated weekly rate.
pub fn goal_eta_weeks(
    latest_weight_kg: f64,
    target_weight_kg: Option<f64>,
    weekly_rate_kg: f64,
) -> Option<f64> {
    let target = target_weight_kg?;
    if weekly_rate_kg <= 0.0 {
        return None;
    }
    Some((target - latest_weight_kg).abs() / weekly_rate_kg)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn obs(day: u32, weight: f64, bf: Option<f64>, muscle: Option<f64>) -> WeightObservation {
        WeightObservation {
            date: NaiveDate::from_ymd_opt(2024, 4, day).unwrap(),
            weight_kg: weight,
            body_fat_pct: bf,
            muscle_mass_pct: muscle,
            bmr: None,
        }
    }

    #[test]
    fn test_fat_change_from_recorded_endpoints() {
        let series = vec![
            obs(1, 80.0, Some(25.0), None),
            obs(10, 79.0, None, None),
            obs(20, 78.0, Some(24.0), None),
        ];
        let change = composition_change(&series).unwrap();
        // 78 * 0.24 - 80 * 0.25 = 18.72 - 20.0
        assert!((change.fat_change_kg - (-1.28)).abs() < 1e-9);
        // Non-fat remainder: total change -2.0 minus fat change.
        assert!((change.muscle_change_kg - (-0.72)).abs() < 1e-9);
    }

    #[test]
    fn test_muscle_change_from_recorded_percentages() {
        let series = vec![
            obs(1, 80.0, Some(25.0), Some(40.0)),
            obs(20, 78.0, Some(24.0), Some(41.0)),
        ];
        let change = composition_change(&series).unwrap();
        // 78 * 0.41 - 80 * 0.40 = 31.98 - 32.0
        assert!((change.muscle_change_kg - (-0.02)).abs() < 1e-9);
    }

    #[test]
    fn test_no_composition_data() {
        let series = vec![obs(1, 80.0, None, None), obs(20, 78.0, None, None)];
        assert!(composition_change(&series).is_none());
    }

    #[test]
    fn test_single_composition_day_is_not_enough() {
        let series = vec![obs(1, 80.0, Some(25.0), None), obs(20, 78.0, None, None)];
        assert!(composition_change(&series).is_none());
    }

    #[test]
    fn test_weeks_to_goal_at_observed_pace() {
        // 4 kg to lose at 0.5 kg/week observed.
        let weeks = weeks_to_goal(74.0, Some(70.0), -0.5).unwrap();
        assert!((weeks - 8.0).abs() < 1e-9);
    }

    #[test]
    fn test_weeks_to_goal_flat_trend() {
        assert!(weeks_to_goal(74.0, Some(70.0), 0.0).is_none());
    }

    #[test]
    fn test_weeks_to_goal_wrong_direction() {
        // Gaining while trying to lose.
        assert!(weeks_to_goal(74.0, Some(70.0), 0.3).is_none());
    }

    #[test]
    fn test_weeks_to_goal_already_there() {
        assert_eq!(weeks_to_goal(70.02, Some(70.0), -0.5), Some(0.0));
    }

    #[test]
    fn test_goal_eta_at_stated_rate() {
        let weeks = goal_eta_weeks(74.0, Some(70.0), 0.5).unwrap();
        assert!((weeks - 8.0).abs() < 1e-9);
        // Direction-agnostic: gaining toward a higher target.
        let weeks = goal_eta_weeks(70.0, Some(74.0), 0.5).unwrap();
        assert!((weeks - 8.0).abs() < 1e-9);
    }

    #[test]
    fn test_goal_eta_requires_positive_rate() {
        assert!(goal_eta_weeks(74.0, Some(70.0), 0.0).is_none());
    }

    #[test]
    fn test_no_target_weight_no_projection() {
        assert!(weeks_to_goal(74.0, None, -0.5).is_none());
        assert!(goal_eta_weeks(74.0, None, 0.5).is_none());
    }
}
