//! Weight-reading outlier removal
//!
//! Two passes run in order over the date-sorted series:
//!
//! 1. A statistical pass using the Modified Z-Score (median/MAD) removes
//!    globally implausible readings.
//! 2. A sequential step/spike pass walks the survivors with one look-ahead
//!    slot, separating transient spikes (one bad reading) from genuine step
//!    changes (the user shifted weight and stayed there). A global threshold
//!    alone cannot tell these apart.

use crate::types::WeightObservation;
use tracing::debug;

/// Modified Z-Score scale constant relating MAD to standard deviation
pub const MODIFIED_Z_SCALE: f64 = 0.6745;

/// Readings scoring beyond this Modified Z-Score are dropped
pub const MODIFIED_Z_THRESHOLD: f64 = 3.5;

/// Minimum series length for the statistical pass to be meaningful
pub const MIN_STATISTICAL_POINTS: usize = 4;

/// Day-to-day deviations at or below this are never flagged (kg)
pub const MAX_DAILY_JUMP_KG: f64 = 1.0;

/// Consecutive readings required before a weight level counts as confirmed
const STEP_CONFIRM_POINTS: usize = 2;

/// Remove implausible readings from a date-sorted weight series.
///
/// Returns the surviving series (still sorted) and the number of readings
/// dropped across both passes.
pub fn filter_outliers(series: &[WeightObservation]) -> (Vec<WeightObservation>, usize) {
    let mut sorted = series.to_vec();
    sorted.sort_by_key(|o| o.date);

    let (survivors, statistical_dropped) = statistical_pass(sorted);
    let (survivors, step_dropped) = step_pass(survivors);

    let dropped = statistical_dropped + step_dropped;
    if dropped > 0 {
        debug!(
            statistical = statistical_dropped,
            sequential = step_dropped,
            "dropped outlier weight readings"
        );
    }
    (survivors, dropped)
}

/// Modified Z-Score pass. Skipped when the series is too short or MAD is
/// zero (identical readings).
fn statistical_pass(series: Vec<WeightObservation>) -> (Vec<WeightObservation>, usize) {
    if series.len() < MIN_STATISTICAL_POINTS {
        return (series, 0);
    }

    let weights: Vec<f64> = series.iter().map(|o| o.weight_kg).collect();
    let center = median(&weights);
    let deviations: Vec<f64> = weights.iter().map(|w| (w - center).abs()).collect();
    let mad = median(&deviations);

    if mad <= f64::EPSILON {
        return (series, 0);
    }

    let before = series.len();
    let kept: Vec<WeightObservation> = series
        .into_iter()
        .filter(|o| {
            let score = MODIFIED_Z_SCALE * (o.weight_kg - center) / mad;
            score.abs() <= MODIFIED_Z_THRESHOLD
        })
        .collect();
    let dropped = before - kept.len();
    (kept, dropped)
}

/// Sequential step/spike pass.
///
/// Walks the series holding a running baseline plus at most one undecided
/// candidate. A candidate deviating from the baseline by more than
/// [`MAX_DAILY_JUMP_KG`] is only classified once the next reading arrives:
/// settling near the candidate confirms a real step change, reverting to the
/// baseline marks the candidate as a transient spike.
fn step_pass(series: Vec<WeightObservation>) -> (Vec<WeightObservation>, usize) {
    if series.len() < 2 {
        return (series, 0);
    }

    let mut kept: Vec<WeightObservation> = Vec::with_capacity(series.len());
    let mut dropped = 0usize;
    let mut iter = series.into_iter();

    // First reading seeds the baseline until something contradicts it.
    let first = match iter.next() {
        Some(obs) => obs,
        None => return (kept, 0),
    };
    let mut baseline = first.weight_kg;
    // Consecutive readings supporting the current level; a level with fewer
    // than STEP_CONFIRM_POINTS readings is still unconfirmed.
    let mut run_len = 1usize;
    let mut pending: Option<WeightObservation> = None;
    kept.push(first);

    for obs in iter {
        match pending.take() {
            Some(candidate) => {
                if (obs.weight_kg - candidate.weight_kg).abs() <= MAX_DAILY_JUMP_KG {
                    // The shift persisted: the new level is real. If the old
                    // level never got a confirming reading, it was the bad
                    // data; discard it in favor of the new level.
                    if run_len < STEP_CONFIRM_POINTS {
                        dropped += run_len;
                        let keep_to = kept.len() - run_len;
                        kept.truncate(keep_to);
                    }
                    baseline = obs.weight_kg;
                    kept.push(candidate);
                    kept.push(obs);
                    run_len = 2;
                } else if (obs.weight_kg - baseline).abs() <= MAX_DAILY_JUMP_KG {
                    // Reverted to the old level: the candidate was a
                    // transient spike.
                    dropped += 1;
                    baseline = obs.weight_kg;
                    kept.push(obs);
                    run_len += 1;
                } else {
                    // Neither level explains the candidate. Drop it and hold
                    // the new reading for confirmation instead.
                    dropped += 1;
                    pending = Some(obs);
                }
            }
            None => {
                if (obs.weight_kg - baseline).abs() <= MAX_DAILY_JUMP_KG {
                    baseline = obs.weight_kg;
                    kept.push(obs);
                    run_len += 1;
                } else {
                    pending = Some(obs);
                }
            }
        }
    }

    // A trailing candidate has no look-ahead left to judge it with; keep it
    // and let the statistical pass own the extreme cases.
    if let Some(candidate) = pending {
        kept.push(candidate);
    }

    (kept, dropped)
}

/// Median of a slice; 0.0 for an empty slice.
fn median(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    let mut sorted = values.to_vec();
    sorted.sort_by(|a, b| a.total_cmp(b));
    let mid = sorted.len() / 2;
    if sorted.len() % 2 == 0 {
        (sorted[mid - 1] + sorted[mid]) / 2.0
    } else {
        sorted[mid]
    }
}
