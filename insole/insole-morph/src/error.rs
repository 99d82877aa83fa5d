//! Error types for insole deformation.

use insole_zones::{Zone, ZoneError};
use thiserror::Error;

/// Errors that can occur while deforming a scan.
///
/// Every failing operation leaves its input mesh untouched.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum MorphError {
    /// The mesh has no vertices.
    #[error("mesh has no vertices")]
    EmptyMesh,

    /// The target region matched no vertices.
    #[error("zone `{zone}` contains no vertices")]
    EmptyRegion {
        /// The empty zone.
        zone: Zone,
    },

    /// A numeric parameter is out of range.
    #[error("invalid parameter `{name}`: {value}")]
    InvalidParameter {
        /// Parameter name.
        name: &'static str,
        /// Offending value.
        value: f64,
    },

    /// A region, face or edge references a vertex the mesh does not have.
    #[error("vertex index {index} out of range (mesh has {vertex_count} vertices)")]
    InvalidVertexIndex {
        /// The invalid index.
        index: u32,
        /// The number of vertices in the mesh.
        vertex_count: usize,
    },

    /// Zone classification failed.
    #[error(transparent)]
    Zone(#[from] ZoneError),
}

/// Result type for deformation operations.
pub type MorphResult<T> = Result<T, MorphError>;
