//! Energy density estimation
//!
//! Converts a body-fat percentage and the recent trend pace into the kcal
//! value of one kilogram of body-mass change. The flat 7700 kcal/kg rule of
//! thumb is only accurate near average composition; leaner or fatter users,
//! and users changing weight rapidly, need a different conversion factor or
//! the TDEE estimate drifts systematically.

/// Flat kcal/kg used when body composition is unknown
pub const KCAL_PER_KG_DEFAULT: f64 = 7700.0;

/// Energy density of fat tissue (kcal/kg)
pub const KCAL_PER_KG_FAT_TISSUE: f64 = 9400.0;

/// Energy density of lean tissue (kcal/kg)
pub const KCAL_PER_KG_LEAN_TISSUE: f64 = 1800.0;

/// Lower clamp on the fat fraction of a weight change
pub const FAT_FRACTION_MIN: f64 = 0.50;

/// Upper clamp on the fat fraction of a weight change
pub const FAT_FRACTION_MAX: f64 = 0.90;

/// Trend pace beyond which lean-tissue turnover starts eating into the fat
/// fraction (kg/week)
pub const RAPID_CHANGE_KG_PER_WEEK: f64 = 0.5;

// Linear map from body-fat percentage to fat fraction: 25% body fat lands on
// the 0.75 midpoint of the clamp range.
const FAT_FRACTION_INTERCEPT: f64 = 0.625;
const FAT_FRACTION_PER_PCT: f64 = 0.005;

// Fraction removed per kg/week of pace beyond the rapid-change threshold.
// Tunable: only the direction of the penalty is contractual.
const RAPID_CHANGE_PENALTY_PER_KG: f64 = 0.10;

/// Estimate the kcal value of one kilogram of weight change.
///
/// Without a body-fat reading this is exactly [`KCAL_PER_KG_DEFAULT`].
/// Out-of-range percentages are treated as unknown, not as errors.
/// `weekly_change_kg` is the observed trend pace; its sign is ignored.
pub fn energy_per_kg(body_fat_pct: Option<f64>, weekly_change_kg: f64) -> f64 {
    let fraction = match fat_fraction(body_fat_pct, weekly_change_kg) {
        Some(fraction) => fraction,
        None => return KCAL_PER_KG_DEFAULT,
    };
    fraction * KCAL_PER_KG_FAT_TISSUE + (1.0 - fraction) * KCAL_PER_KG_LEAN_TISSUE
}

/// Fat fraction of a weight change for a given body-fat percentage, after
/// the rapid-change penalty and clamping. `None` when composition is
/// unknown or malformed.
pub fn fat_fraction(body_fat_pct: Option<f64>, weekly_change_kg: f64) -> Option<f64> {
    let bf = body_fat_pct?;
    if !(0.0..=100.0).contains(&bf) || !bf.is_finite() {
        return None;
    }

    let mut fraction = FAT_FRACTION_INTERCEPT + FAT_FRACTION_PER_PCT * bf;

    let pace = weekly_change_kg.abs();
    if pace > RAPID_CHANGE_KG_PER_WEEK {
        fraction -= RAPID_CHANGE_PENALTY_PER_KG * (pace - RAPID_CHANGE_KG_PER_WEEK);
    }

    Some(fraction.clamp(FAT_FRACTION_MIN, FAT_FRACTION_MAX))
}
