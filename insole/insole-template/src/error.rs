//! Error types for outline fitting and control rigs.

use insole_types::Axis;
use insole_zones::ZoneError;
use thiserror::Error;

/// Result type for template operations.
pub type TemplateResult<T> = Result<T, TemplateError>;

/// Errors that can occur while fitting templates or driving rigs.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum TemplateError {
    /// The mesh has no vertices.
    #[error("mesh has no vertices")]
    EmptyMesh,

    /// The template has fewer than two control points.
    #[error("template needs at least 2 control points, has {count}")]
    DegenerateTemplate {
        /// Number of control points present.
        count: usize,
    },

    /// The mesh or template has (near) zero size along a fitted axis.
    #[error("cannot fit along {axis:?}: extent {extent} is too small")]
    IncompatibleBounds {
        /// The offending axis.
        axis: Axis,
        /// The measured extent.
        extent: f64,
    },

    /// An anchor name or index does not exist on the rig.
    #[error("unknown anchor: {0}")]
    UnknownAnchor(String),

    /// The mesh transform cannot be inverted.
    #[error("mesh transform is singular")]
    SingularTransform,

    /// Heel anchor lookup failed.
    #[error(transparent)]
    Zone(#[from] ZoneError),
}
