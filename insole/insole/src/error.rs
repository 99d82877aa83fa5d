//! Error type for the insole pipeline.

use insole_morph::MorphError;
use insole_repair::RepairError;
use insole_template::TemplateError;
use insole_zones::ZoneError;
use thiserror::Error;

/// Result type for pipeline steps.
pub type InsoleResult<T> = Result<T, InsoleError>;

/// Errors raised by [`InsoleSession`](crate::InsoleSession) steps.
///
/// A failing step never changes the session's mesh or state.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum InsoleError {
    /// Zone classification failed.
    #[error("zone classification failed: {0}")]
    Zone(#[from] ZoneError),

    /// Deformation failed.
    #[error("deformation failed: {0}")]
    Morph(#[from] MorphError),

    /// Topology repair failed.
    #[error("repair failed: {0}")]
    Repair(#[from] RepairError),

    /// Outline fitting or rigging failed.
    #[error("outline fitting failed: {0}")]
    Template(#[from] TemplateError),

    /// A session parameter is out of range.
    #[error("invalid parameter `{name}`: {value}")]
    InvalidParameter {
        /// Parameter name.
        name: &'static str,
        /// Offending value.
        value: f64,
    },

    /// `twist` was called before a zone was chosen.
    #[error("no twist zone selected")]
    NoTwistZone,

    /// A rig operation was requested before `fit_outline`.
    #[error("no outline has been fitted")]
    NoOutline,
}
