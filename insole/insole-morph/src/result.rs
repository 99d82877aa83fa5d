//! Deformation output and displacement statistics.

use insole_types::ScanMesh;

/// Displacements below this are treated as no movement.
const MOVE_EPSILON: f64 = 1e-10;

/// Result of a deformation.
///
/// The deformed mesh is a new value; the input is never modified, so a
/// failing operation cannot leave a half-deformed scan behind.
#[derive(Debug, Clone)]
pub struct DeformOutput {
    /// The deformed mesh.
    pub mesh: ScanMesh,
    /// Number of vertices that moved.
    pub vertices_modified: usize,
    /// Largest vertex displacement.
    pub max_displacement: f64,
    /// Mean displacement over the moved vertices.
    pub average_displacement: f64,
}

impl DeformOutput {
    /// An output that leaves `mesh` as-is.
    #[must_use]
    pub const fn unchanged(mesh: ScanMesh) -> Self {
        Self {
            mesh,
            vertices_modified: 0,
            max_displacement: 0.0,
            average_displacement: 0.0,
        }
    }

    /// Compare `deformed` against `original` vertex by vertex.
    #[must_use]
    pub fn measure(original: &ScanMesh, deformed: ScanMesh) -> Self {
        let mut vertices_modified = 0;
        let mut max_displacement = 0.0_f64;
        let mut total = 0.0;

        for (a, b) in original.vertices.iter().zip(&deformed.vertices) {
            let d = (b.position - a.position).norm();
            if d > MOVE_EPSILON {
                vertices_modified += 1;
                max_displacement = max_displacement.max(d);
                total += d;
            }
        }

        #[allow(clippy::cast_precision_loss)]
        let average_displacement = if vertices_modified > 0 {
            total / vertices_modified as f64
        } else {
            0.0
        };

        Self {
            mesh: deformed,
            vertices_modified,
            max_displacement,
            average_displacement,
        }
    }

    /// True if no vertex moved.
    #[must_use]
    pub const fn is_noop(&self) -> bool {
        self.vertices_modified == 0
    }
}
