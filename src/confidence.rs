//! Confidence grading
//!
//! Grades a TDEE estimate on two axes: how long the usable data span is and
//! how consistently the user logged their intake inside it. A short period
//! is capped at low no matter how complete the logs are.

use crate::types::Confidence;

/// Adherence above this fraction earns a high grade
pub const HIGH_ADHERENCE: f64 = 0.85;

/// Adherence above this fraction earns a medium grade
pub const MEDIUM_ADHERENCE: f64 = 0.60;

/// Periods shorter than this are capped at low confidence (days)
pub const MIN_RELIABLE_SPAN_DAYS: usize = 14;

/// Grade an estimate from the trend span and the number of days with a
/// nutrition log inside it. Returns the grade plus a human-readable reason.
pub fn score_confidence(span_days: usize, logged_days: usize) -> (Confidence, String) {
    let expected = span_days.max(1);
    let adherence = logged_days as f64 / expected as f64;
    let adherence_pct = (adherence * 100.0).round();

    if span_days < MIN_RELIABLE_SPAN_DAYS {
        return (
            Confidence::Low,
            format!(
                "Only {span_days} days of data; the estimate needs {MIN_RELIABLE_SPAN_DAYS} to settle"
            ),
        );
    }

    if adherence > HIGH_ADHERENCE {
        (
            Confidence::High,
            format!("Excellent data density: {logged_days} of {expected} days logged ({adherence_pct}%)"),
        )
    } else if adherence > MEDIUM_ADHERENCE {
        (
            Confidence::Medium,
            format!("Good data density with some gaps: {logged_days} of {expected} days logged ({adherence_pct}%)"),
        )
    } else {
        (
            Confidence::Low,
            format!("Too many gaps in logs: only {logged_days} of {expected} days logged ({adherence_pct}%)"),
        )
    }
}

/// Grade and reason used when there is not enough data to observe behavior
/// at all and the engine falls back to a formula.
pub fn insufficient_data() -> (Confidence, String) {
    (
        Confidence::None,
        "Not enough logged data; this is a formula-based estimate, not derived from observed intake"
            .to_string(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_full_adherence_is_high() {
        let (grade, reason) = score_confidence(21, 21);
        assert_eq!(grade, Confidence::High);
        assert!(reason.contains("Excellent"));
    }

    #[test]
    fn test_partial_adherence_is_medium() {
        // 15/21 = 71%
        let (grade, _) = score_confidence(21, 15);
        assert_eq!(grade, Confidence::Medium);
    }

    #[test]
    fn test_sparse_adherence_is_low() {
        let (grade, reason) = score_confidence(28, 10);
        assert_eq!(grade, Confidence::Low);
        assert!(reason.contains("gaps"));
    }

    #[test]
    fn test_short_period_capped_at_low() {
        // Perfect adherence over 10 days is still low.
        let (grade, _) = score_confidence(10, 10);
        assert_eq!(grade, Confidence::Low);
    }

    #[test]
    fn test_adherence_thresholds_are_exclusive() {
        // Exactly 85% is not high, exactly 60% is not medium.
        let (grade, _) = score_confidence(20, 17);
        assert_eq!(grade, Confidence::Medium);
        let (grade, _) = score_confidence(20, 12);
        assert_eq!(grade, Confidence::Low);
    }

    #[test]
    fn test_insufficient_data_reason_mentions_estimate() {
        let (grade, reason) = insufficient_data();
        assert_eq!(grade, Confidence::None);
        assert!(reason.to_lowercase().contains("estimate"));
    }
}
