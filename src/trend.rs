//! Daily weight trend
//!
//! Turns the filtered, irregularly spaced weight log into one smoothed value
//! per calendar day. Missing days carry the last known raw weight forward
//! (no interpolation) before an exponential moving average is applied, so
//! sparse logging stays robust while real changes still show through
//! gradually.

use crate::types::{DailyTrendPoint, WeightObservation};
use chrono::{Duration, NaiveDate};
use std::collections::BTreeMap;

/// EMA smoothing factor for the daily trend (10% weight on new values)
pub const TREND_ALPHA: f64 = 0.1;

/// Build the daily smoothed trend spanning the full filtered series.
///
/// The input must already be outlier-filtered; it does not need to be
/// sorted. Returns one point per calendar day from the first to the last
/// observation, inclusive.
pub fn build_daily_trend(filtered: &[WeightObservation]) -> Vec<DailyTrendPoint> {
    let by_date: BTreeMap<NaiveDate, f64> = filtered
        .iter()
        .map(|o| (o.date, o.weight_kg))
        .collect();

    let (first, last) = match (
        by_date.keys().next().copied(),
        by_date.keys().next_back().copied(),
    ) {
        (Some(first), Some(last)) => (first, last),
        _ => return Vec::new(),
    };

    let mut trend = Vec::with_capacity((last - first).num_days() as usize + 1);
    let mut carried = by_date[&first];
    let mut ema = carried;
    let mut day = first;

    while day <= last {
        if let Some(&weight) = by_date.get(&day) {
            carried = weight;
        }
        if day == first {
            ema = carried;
        } else {
            // Incremental form: exact when the input does not move.
            ema += TREND_ALPHA * (carried - ema);
        }
        trend.push(DailyTrendPoint {
            date: day,
            smoothed_weight_kg: ema,
        });
        day += Duration::days(1);
    }

    trend
}

/// Least-squares slope of the trend in kg per day; 0.0 for fewer than two
/// points. Day indices are the x-axis, so the trend's daily spacing makes
/// the regression exact.
pub fn trend_slope_kg_per_day(trend: &[DailyTrendPoint]) -> f64 {
    let n = trend.len();
    if n < 2 {
        return 0.0;
    }

    let n_f = n as f64;
    let mean_x = (n_f - 1.0) / 2.0;
    let mean_y = trend.iter().map(|p| p.smoothed_weight_kg).sum::<f64>() / n_f;

    let mut numerator = 0.0;
    let mut denominator = 0.0;
    for (i, point) in trend.iter().enumerate() {
        let dx = i as f64 - mean_x;
        numerator += dx * (point.smoothed_weight_kg - mean_y);
        denominator += dx * dx;
    }

    if denominator == 0.0 {
        0.0
    } else {
        numerator / denominator
    }
}

/// Trend slope expressed in kg per week.
pub fn trend_slope_kg_per_week(trend: &[DailyTrendPoint]) -> f64 {
    trend_slope_kg_per_day(trend) * 7.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn date(day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, day).unwrap()
    }

    fn obs(day: u32, weight: f64) -> WeightObservation {
        WeightObservation::new(date(day), weight)
    }

    #[test]
    fn test_empty_series_yields_empty_trend() {
        assert_eq!(build_daily_trend(&[]), Vec::new());
    }

    #[test]
    fn test_single_point_trend() {
        let trend = build_daily_trend(&[obs(5, 70.0)]);
        assert_eq!(trend.len(), 1);
        assert!((trend[0].smoothed_weight_kg - 70.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_constant_weight_stays_constant() {
        let series: Vec<_> = (1..=10).map(|d| obs(d, 70.0)).collect();
        let trend = build_daily_trend(&series);
        assert_eq!(trend.len(), 10);
        for point in &trend {
            assert!((point.smoothed_weight_kg - 70.0).abs() < 1e-9);
        }
    }

    #[test]
    fn test_gaps_filled_by_carry_forward() {
        // Logs on days 1, 4, 7 only; the trend still has 7 daily points.
        let series = vec![obs(1, 70.0), obs(4, 70.0), obs(7, 70.0)];
        let trend = build_daily_trend(&series);
        assert_eq!(trend.len(), 7);
        assert_eq!(trend[1].date, date(2));
        // Constant carried weight keeps the EMA flat.
        for point in &trend {
            assert!((point.smoothed_weight_kg - 70.0).abs() < 1e-9);
        }
    }

    #[test]
    fn test_ema_lags_behind_a_step() {
        // Weight jumps from 70 to 71 on day 2; the smoothed value should
        // move toward 71 but not reach it immediately.
        let series = vec![obs(1, 70.0), obs(2, 71.0), obs(3, 71.0)];
        let trend = build_daily_trend(&series);
        assert!((trend[0].smoothed_weight_kg - 70.0).abs() < 1e-9);
        assert!((trend[1].smoothed_weight_kg - 70.1).abs() < 1e-9);
        assert!(trend[2].smoothed_weight_kg > trend[1].smoothed_weight_kg);
        assert!(trend[2].smoothed_weight_kg < 71.0);
    }

    #[test]
    fn test_slope_of_flat_trend_is_zero() {
        let series: Vec<_> = (1..=14).map(|d| obs(d, 70.0)).collect();
        let trend = build_daily_trend(&series);
        assert!(trend_slope_kg_per_day(&trend).abs() < 1e-9);
    }

    #[test]
    fn test_slope_sign_tracks_direction() {
        let losing: Vec<_> = (1..=21)
            .map(|d| obs(d, 72.0 - f64::from(d) * 0.05))
            .collect();
        let trend = build_daily_trend(&losing);
        assert!(trend_slope_kg_per_day(&trend) < 0.0);
        assert!(trend_slope_kg_per_week(&trend) < 0.0);

        let gaining: Vec<_> = (1..=21)
            .map(|d| obs(d, 70.0 + f64::from(d) * 0.05))
            .collect();
        let trend = build_daily_trend(&gaining);
        assert!(trend_slope_kg_per_week(&trend) > 0.0);
    }

    #[test]
    fn test_slope_too_short() {
        assert_eq!(trend_slope_kg_per_day(&[]), 0.0);
        let trend = build_daily_trend(&[obs(1, 70.0)]);
        assert_eq!(trend_slope_kg_per_day(&trend), 0.0);
    }
}
