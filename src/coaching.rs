//! Coaching target derivation
//!
//! Three stages applied in order to turn a TDEE estimate into the daily
//! calorie target issued to the user: the ideal target from the stated
//! goal, a week-to-week rate limiter against the previously issued target,
//! and gender-aware safety floors. The limiter is the only place the engine
//! consumes cross-call state.

use crate::types::{Gender, GoalProfile, GoalType};
use chrono::NaiveDate;
use tracing::debug;

/// kcal of daily adjustment per kg/week of desired change (7700 / 7)
pub const KCAL_PER_KG_WEEKLY_RATE: f64 = 1100.0;

/// Largest week-to-week change in the issued target (kcal)
pub const MAX_WEEKLY_ADJUSTMENT_KCAL: f64 = 100.0;

/// Targets are re-adjusted no more often than this (days)
pub const MIN_DAYS_BETWEEN_ADJUSTMENTS: i64 = 7;

/// Absolute daily minimum for men (kcal)
pub const MALE_FLOOR_KCAL: f64 = 1500.0;

/// Absolute daily minimum for women (kcal)
pub const FEMALE_FLOOR_KCAL: f64 = 1200.0;

/// Absolute daily minimum when gender is unknown (kcal)
pub const GENERIC_FLOOR_KCAL: f64 = 1200.0;

/// Largest allowed deficit as a fraction of TDEE
pub const MAX_DEFICIT_FRACTION: f64 = 0.30;

/// Ideal daily target for the stated goal, before rate limiting and floors.
///
/// Deliberately ignores how far off-track the user currently is: punishing
/// or rewarding a noisy short-term trend would whipsaw the target.
pub fn ideal_target(tdee_kcal: f64, profile: &GoalProfile) -> f64 {
    let adjustment = profile.weekly_rate_kg * KCAL_PER_KG_WEEKLY_RATE;
    match profile.goal_type {
        GoalType::Maintain => tdee_kcal,
        GoalType::Lose => tdee_kcal - adjustment,
        GoalType::Gain => tdee_kcal + adjustment,
    }
}

/// Rate-limit the ideal target against the previously issued one.
///
/// First-ever computation passes the ideal through unchanged. A check-in
/// fewer than [`MIN_DAYS_BETWEEN_ADJUSTMENTS`] days after the last one
/// re-issues the previous target. Otherwise the change is clamped to
/// ±[`MAX_WEEKLY_ADJUSTMENT_KCAL`].
pub fn limit_adjustment(
    ideal_kcal: f64,
    last_issued_kcal: Option<f64>,
    last_check_in: Option<NaiveDate>,
    today: NaiveDate,
) -> f64 {
    let previous = match last_issued_kcal {
        Some(previous) => previous,
        None => return ideal_kcal,
    };

    if let Some(last) = last_check_in {
        if (today - last).num_days() < MIN_DAYS_BETWEEN_ADJUSTMENTS {
            debug!(previous, "check-in inside the weekly window, target held");
            return previous;
        }
    }

    let delta =
        (ideal_kcal - previous).clamp(-MAX_WEEKLY_ADJUSTMENT_KCAL, MAX_WEEKLY_ADJUSTMENT_KCAL);
    previous + delta
}

/// Clamp a target to the safety minimums. Highest applicable floor wins:
/// the gender floor always applies, and a target that sits below TDEE is
/// additionally floored at `TDEE * (1 - MAX_DEFICIT_FRACTION)`. Floors only
/// ever raise a target, so gain and maintain targets pass through.
pub fn enforce_safety_floor(target_kcal: f64, tdee_kcal: f64, gender: Option<Gender>) -> f64 {
    let mut floor = gender_floor(gender);
    if target_kcal < tdee_kcal {
        floor = floor.max(tdee_kcal * (1.0 - MAX_DEFICIT_FRACTION));
    }
    target_kcal.max(floor)
}

/// Gender-specific absolute calorie floor.
pub fn gender_floor(gender: Option<Gender>) -> f64 {
    match gender {
        Some(Gender::Male) => MALE_FLOOR_KCAL,
        Some(Gender::Female) => FEMALE_FLOOR_KCAL,
        None => GENERIC_FLOOR_KCAL,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn date(day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 3, day).unwrap()
    }

    fn profile(goal_type: GoalType, weekly_rate_kg: f64) -> GoalProfile {
        GoalProfile {
            goal_type,
            weekly_rate_kg,
            ..GoalProfile::maintain()
        }
    }

    #[test]
    fn test_maintain_target_equals_tdee() {
        let p = profile(GoalType::Maintain, 0.5);
        assert_eq!(ideal_target(2400.0, &p), 2400.0);
    }

    #[test]
    fn test_lose_and_gain_targets() {
        let lose = profile(GoalType::Lose, 0.5);
        assert!((ideal_target(2400.0, &lose) - 1850.0).abs() < 1e-9);

        let gain = profile(GoalType::Gain, 0.25);
        assert!((ideal_target(2400.0, &gain) - 2675.0).abs() < 1e-9);
    }

    #[test]
    fn test_first_computation_passes_ideal_through() {
        assert_eq!(limit_adjustment(1850.0, None, None, date(15)), 1850.0);
    }

    #[test]
    fn test_downward_adjustment_capped_at_100() {
        let result = limit_adjustment(1500.0, Some(1800.0), Some(date(1)), date(15));
        assert_eq!(result, 1700.0);
    }

    #[test]
    fn test_upward_adjustment_capped_at_100() {
        let result = limit_adjustment(1750.0, Some(1500.0), Some(date(1)), date(15));
        assert_eq!(result, 1600.0);
    }

    #[test]
    fn test_small_adjustment_applied_in_full() {
        let result = limit_adjustment(1760.0, Some(1800.0), Some(date(1)), date(15));
        assert_eq!(result, 1760.0);
    }

    #[test]
    fn test_checkin_yesterday_holds_previous_target() {
        let today = date(15);
        let yesterday = today - Duration::days(1);
        let result = limit_adjustment(1500.0, Some(1800.0), Some(yesterday), today);
        assert_eq!(result, 1800.0);
        // Regardless of how far off the ideal is.
        let result = limit_adjustment(3000.0, Some(1800.0), Some(yesterday), today);
        assert_eq!(result, 1800.0);
    }

    #[test]
    fn test_exactly_seven_days_allows_adjustment() {
        let result = limit_adjustment(1700.0, Some(1800.0), Some(date(1)), date(8));
        assert_eq!(result, 1700.0);
    }

    #[test]
    fn test_male_floor() {
        let result = enforce_safety_floor(1300.0, 2000.0, Some(Gender::Male));
        assert!(result >= MALE_FLOOR_KCAL);
    }

    #[test]
    fn test_female_floor() {
        let result = enforce_safety_floor(1000.0, 1600.0, Some(Gender::Female));
        assert!(result >= FEMALE_FLOOR_KCAL);
    }

    #[test]
    fn test_unknown_gender_uses_generic_floor() {
        let result = enforce_safety_floor(900.0, 1600.0, None);
        assert_eq!(result, GENERIC_FLOOR_KCAL);
    }

    #[test]
    fn test_deficit_never_exceeds_30_pct() {
        let tdee = 3000.0;
        let result = enforce_safety_floor(1800.0, tdee, Some(Gender::Male));
        assert!(result >= tdee * 0.70);
    }

    #[test]
    fn test_deficit_floor_only_applies_below_tdee() {
        // A gain target above TDEE is never clamped downward.
        let result = enforce_safety_floor(2600.0, 2200.0, Some(Gender::Female));
        assert_eq!(result, 2600.0);
        // Maintenance at TDEE passes through too.
        let result = enforce_safety_floor(2200.0, 2200.0, Some(Gender::Male));
        assert_eq!(result, 2200.0);
    }

    #[test]
    fn test_highest_floor_wins() {
        // For a female user with TDEE 2400, the deficit floor (1680) is
        // higher than the gender floor (1200).
        let result = enforce_safety_floor(1200.0, 2400.0, Some(Gender::Female));
        assert_eq!(result, 1680.0);
    }
}
