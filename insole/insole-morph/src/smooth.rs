//! Laplacian relaxation of scan noise.
//!
//! Each iteration moves every vertex toward the centroid of its edge
//! neighbours:
//!
//! ```text
//! v_new = v + lambda * (centroid(N(v)) - v)
//! ```
//!
//! Repeated passes shrink the surface slightly, which is acceptable for the
//! few iterations a scan needs before zoning.

use hashbrown::HashMap;
use insole_types::{ScanMesh, Vector3};
use rayon::prelude::*;
use tracing::info;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::error::{MorphError, MorphResult};

const PARALLEL_THRESHOLD: usize = 1000;

/// Smoothing parameters.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct SmoothParams {
    /// Number of passes.
    pub iterations: u32,
    /// Step toward the neighbour centroid per pass, in `(0, 1]`.
    pub lambda: f64,
    /// Keep vertices on open boundaries fixed.
    pub preserve_boundaries: bool,
}

impl Default for SmoothParams {
    fn default() -> Self {
        Self {
            iterations: 15,
            lambda: 0.5,
            preserve_boundaries: false,
        }
    }
}

impl SmoothParams {
    /// Set the number of passes.
    #[must_use]
    pub const fn with_iterations(mut self, iterations: u32) -> Self {
        self.iterations = iterations;
        self
    }

    /// Set the step factor.
    #[must_use]
    pub const fn with_lambda(mut self, lambda: f64) -> Self {
        self.lambda = lambda;
        self
    }

    /// Pin open-boundary vertices.
    #[must_use]
    pub const fn with_preserve_boundaries(mut self, preserve: bool) -> Self {
        self.preserve_boundaries = preserve;
        self
    }
}

/// Result of [`smooth_laplacian`].
#[derive(Debug, Clone)]
pub struct SmoothOutput {
    /// The smoothed mesh.
    pub mesh: ScanMesh,
    /// Passes performed.
    pub iterations_performed: u32,
    /// Largest single-pass vertex displacement.
    pub max_displacement: f64,
}

/// Relax `mesh` with `params.iterations` Laplacian passes.
///
/// Isolated vertices do not move. Unless boundaries are preserved, open
/// ends are pulled toward their single neighbour like any other vertex.
///
/// # Errors
///
/// Returns [`MorphError::EmptyMesh`] for an empty mesh,
/// [`MorphError::InvalidParameter`] if `lambda` is outside `(0, 1]`, and
/// [`MorphError::InvalidVertexIndex`] if a face or loose edge points past the
/// vertex array.
///
/// # Example
///
/// ```
/// use insole_types::{ScanMesh, Point3};
/// use insole_morph::{smooth_laplacian, SmoothParams};
///
/// let positions: Vec<Point3<f64>> = [0.0, 0.0, 4.0, 0.0, 0.0]
///     .into_iter()
///     .zip(0u32..)
///     .map(|(z, i)| Point3::new(f64::from(i), 0.0, z))
///     .collect();
/// let mesh = ScanMesh::from_positions(&positions, Vec::new())
///     .with_loose_edges(vec![[0, 1], [1, 2], [2, 3], [3, 4]]);
///
/// let params = SmoothParams::default().with_iterations(1);
/// let out = smooth_laplacian(&mesh, &params).unwrap();
///
/// // The spike moves halfway to its neighbours' mean; they rise to meet it.
/// let z: Vec<f64> = out.mesh.vertices.iter().map(|v| v.position.z).collect();
/// assert_eq!(z, vec![0.0, 1.0, 2.0, 1.0, 0.0]);
/// ```
pub fn smooth_laplacian(mesh: &ScanMesh, params: &SmoothParams) -> MorphResult<SmoothOutput> {
    if mesh.is_empty() {
        return Err(MorphError::EmptyMesh);
    }
    if !(params.lambda > 0.0 && params.lambda <= 1.0) {
        return Err(MorphError::InvalidParameter {
            name: "lambda",
            value: params.lambda,
        });
    }

    check_indices(mesh)?;

    let neighbors = vertex_neighbors(mesh);
    let pinned = if params.preserve_boundaries {
        boundary_vertices(mesh)
    } else {
        vec![false; mesh.vertex_count()]
    };

    let mut current = mesh.clone();
    let mut max_displacement = 0.0_f64;

    for _ in 0..params.iterations {
        let step = |i: usize| -> Vector3<f64> {
            let ns = &neighbors[i];
            if pinned[i] || ns.is_empty() {
                return Vector3::zeros();
            }
            let sum: Vector3<f64> = ns
                .iter()
                .map(|&n| current.vertices[n as usize].position.coords)
                .sum();
            #[allow(clippy::cast_precision_loss)]
            let centroid = sum / ns.len() as f64;
            (centroid - current.vertices[i].position.coords) * params.lambda
        };

        let displacements: Vec<Vector3<f64>> = if current.vertex_count() > PARALLEL_THRESHOLD {
            (0..current.vertex_count()).into_par_iter().map(step).collect()
        } else {
            (0..current.vertex_count()).map(step).collect()
        };

        for (v, d) in current.vertices.iter_mut().zip(&displacements) {
            max_displacement = max_displacement.max(d.norm());
            v.position += d;
        }
    }

    info!(
        iterations = params.iterations,
        max_displacement, "smoothed scan"
    );

    Ok(SmoothOutput {
        mesh: current,
        iterations_performed: params.iterations,
        max_displacement,
    })
}

fn check_indices(mesh: &ScanMesh) -> MorphResult<()> {
    let vertex_count = mesh.vertex_count();
    if let Some(&index) = mesh
        .faces
        .iter()
        .flatten()
        .chain(mesh.loose_edges.iter().flatten())
        .find(|&&i| i as usize >= vertex_count)
    {
        return Err(MorphError::InvalidVertexIndex {
            index,
            vertex_count,
        });
    }
    Ok(())
}

/// Edge neighbours of every vertex, ascending.
fn vertex_neighbors(mesh: &ScanMesh) -> Vec<Vec<u32>> {
    let mut neighbors = vec![Vec::new(); mesh.vertex_count()];
    for [a, b] in mesh.edges() {
        neighbors[a as usize].push(b);
        neighbors[b as usize].push(a);
    }
    for ns in &mut neighbors {
        ns.sort_unstable();
    }
    neighbors
}

/// Vertices touching an edge used by fewer than two faces.
fn boundary_vertices(mesh: &ScanMesh) -> Vec<bool> {
    let mut face_counts: HashMap<(u32, u32), usize> = HashMap::new();
    for face in &mesh.faces {
        for k in 0..3 {
            let (a, b) = (face[k], face[(k + 1) % 3]);
            *face_counts.entry((a.min(b), a.max(b))).or_insert(0) += 1;
        }
    }

    let mut pinned = vec![false; mesh.vertex_count()];
    for [a, b] in mesh.edges() {
        if face_counts.get(&(a, b)).copied().unwrap_or(0) != 2 {
            pinned[a as usize] = true;
            pinned[b as usize] = true;
        }
    }
    pinned
}
