//! Metabalance - adaptive metabolic estimation engine
//!
//! Metabalance turns a user's weight and nutrition logs into a TDEE
//! estimate, a safe daily calorie target, and goal projections through a
//! deterministic pipeline: outlier filtering → daily trend smoothing →
//! energy-density estimation → per-day TDEE observations → prior-anchored
//! smoothing → confidence grading → coaching-target derivation.
//!
//! The engine is computationally pure: all inputs arrive through the
//! data-access seams in [`store`], and the only state carried between
//! check-ins is the coaching-target pair threaded through the profile.

pub mod coaching;
pub mod composition;
pub mod confidence;
pub mod energy;
pub mod error;
pub mod outliers;
pub mod pipeline;
pub mod store;
pub mod tdee;
pub mod trend;
pub mod types;

pub use error::EngineError;
pub use pipeline::{
    calculate_tdee, calculate_tdee_at, run_pipeline, TdeeEngine, DEFAULT_LOOKBACK_WEEKS,
};
pub use store::{MemoryStore, NutritionLogSource, ProfileStore, WeightLogSource};
pub use types::{
    CalorieTrend, Confidence, CurrentTargets, DailyTrendPoint, Gender, GoalProfile, GoalType,
    NutritionObservation, TdeeReport, WeightObservation,
};

/// Engine version embedded by consumers in their own payloads
pub const ENGINE_VERSION: &str = env!("CARGO_PKG_VERSION");
