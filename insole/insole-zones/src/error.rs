//! Error types for zone classification.

use thiserror::Error;

/// Result type for zone operations.
pub type ZoneResult<T> = Result<T, ZoneError>;

/// Errors that can occur while classifying zones.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ZoneError {
    /// The mesh has no vertices.
    #[error("mesh has no vertices")]
    EmptyMesh,

    /// A zone parameter is outside `[0, 1]` or not a number.
    #[error("zone parameter `{name}` must lie in [0, 1], got {value}")]
    InvalidParameter {
        /// Parameter name.
        name: &'static str,
        /// Offending value.
        value: f64,
    },

    /// A zone name did not match any known zone.
    #[error("unknown zone name: {0}")]
    UnknownZone(String),
}
