//! Error types for scan repair operations.

use thiserror::Error;

/// Result type for repair operations.
pub type RepairResult<T> = Result<T, RepairError>;

/// Errors that can occur while repairing a scan.
///
/// Every failing operation leaves its input mesh untouched.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum RepairError {
    /// The mesh has no vertices.
    #[error("mesh is empty")]
    EmptyMesh,

    /// An edge references a vertex the mesh does not have.
    #[error("invalid vertex index {index} (mesh has {vertex_count} vertices)")]
    InvalidIndex {
        /// The invalid index.
        index: u32,
        /// Total number of vertices in the mesh.
        vertex_count: usize,
    },

    /// The mesh has no open boundary.
    #[error("mesh has no boundary edges")]
    NoBoundary,

    /// A boundary walk exceeded the configured vertex cap.
    #[error("boundary loop exceeds {limit} vertices")]
    LoopTooComplex {
        /// The configured cap.
        limit: usize,
    },

    /// The boundary is not a set of simple cycles.
    #[error("boundary is not a simple loop: {details}")]
    DegenerateTopology {
        /// Description of the defect.
        details: String,
    },

    /// A numeric parameter is out of range.
    #[error("invalid parameter `{name}`: {value}")]
    InvalidParameter {
        /// Parameter name.
        name: &'static str,
        /// Offending value.
        value: f64,
    },

    /// A hole could not be triangulated.
    #[error("failed to fill hole: {reason}")]
    HoleFillFailed {
        /// Reason for failure.
        reason: String,
    },
}
