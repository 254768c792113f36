//! Error types for the metabalance engine

use thiserror::Error;
use uuid::Uuid;

/// Errors that can occur while assembling inputs for a computation.
///
/// The pipeline itself is total over valid inputs; these errors come from
/// the data-access seams and from input marshalling, and are propagated
/// unchanged to the caller.
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("No goal profile found for user {0}")]
    ProfileNotFound(Uuid),

    #[error("Data access failed: {0}")]
    DataAccess(String),

    #[error("Invalid JSON: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("Invalid lookback window: {0} weeks (expected 1-52)")]
    InvalidLookback(u32),

    #[error("Invalid goal profile: {0}")]
    InvalidProfile(String),
}
