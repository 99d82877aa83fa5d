//! Island removal around a reference point.
//!
//! Scans arrive with floating debris: fragments of the scanning plate,
//! loose clusters of points and stray edges. Only the component containing
//! the vertex nearest a reference point survives. The survivor is then
//! recentred: local coordinates are shifted onto the centroid and the world
//! translation is cleared, so the scan sits at the world origin.

use std::collections::VecDeque;

use insole_types::{Point3, ScanMesh, Transform3D, Vector3};
use tracing::{debug, info};

use crate::adjacency::MeshAdjacency;
use crate::error::{RepairError, RepairResult};

/// Centroid offsets at or below this are treated as already centred.
const RECENTER_EPSILON: f64 = 1e-9;

/// Result of [`prune`].
#[derive(Debug, Clone)]
pub struct PruneOutput {
    /// The surviving component, recentred.
    pub mesh: ScanMesh,
    /// Number of vertices deleted.
    pub removed_vertices: usize,
    /// Index (in the input mesh) of the vertex the component was grown from.
    pub seed: u32,
}

/// Keep only the connected component nearest `reference`.
///
/// The seed is the vertex with the smallest world-space Manhattan distance
/// to `reference`; ties go to the lowest index. That tie-break is arbitrary
/// and not stable under vertex reordering. Connectivity follows face edges
/// and loose edges.
///
/// The operation is idempotent: pruning its own output returns the output
/// unchanged.
///
/// # Errors
///
/// Returns [`RepairError::EmptyMesh`] for a mesh without vertices and
/// [`RepairError::InvalidIndex`] for dangling topology.
///
/// # Example
///
/// ```
/// use insole_types::{ScanMesh, Point3};
/// use insole_repair::prune;
///
/// let mesh = ScanMesh::from_positions(
///     &[
///         Point3::new(0.0, 0.0, 0.0),
///         Point3::new(1.0, 0.0, 0.0),
///         Point3::new(0.0, 1.0, 0.0),
///         Point3::new(50.0, 0.0, 0.0),
///         Point3::new(51.0, 0.0, 0.0),
///         Point3::new(50.0, 1.0, 0.0),
///     ],
///     vec![[0, 1, 2], [3, 4, 5]],
/// );
///
/// let out = prune(&mesh, &Point3::new(0.2, 0.2, 0.0)).unwrap();
/// assert_eq!(out.mesh.vertex_count(), 3);
/// assert_eq!(out.removed_vertices, 3);
/// ```
pub fn prune(mesh: &ScanMesh, reference: &Point3<f64>) -> RepairResult<PruneOutput> {
    check_indices(mesh)?;
    let seed = nearest_vertex_manhattan(mesh, reference).ok_or(RepairError::EmptyMesh)?;

    let keep = connected_component(mesh, seed);
    let kept = keep.iter().filter(|&&k| k).count();
    let removed_vertices = mesh.vertex_count() - kept;

    let mut pruned = if removed_vertices == 0 {
        mesh.clone()
    } else {
        mesh.retain_vertices(&keep)
    };
    recenter(&mut pruned);

    info!(seed, kept, removed_vertices, "pruned disconnected islands");

    Ok(PruneOutput {
        mesh: pruned,
        removed_vertices,
        seed,
    })
}

/// [`prune`] using the world-space vertex centroid as the reference point.
///
/// # Errors
///
/// Same conditions as [`prune`].
pub fn prune_about_centroid(mesh: &ScanMesh) -> RepairResult<PruneOutput> {
    check_indices(mesh)?;
    let reference = mesh.world_centroid().ok_or(RepairError::EmptyMesh)?;
    prune(mesh, &reference)
}

/// Vertex nearest `point` by world-space Manhattan distance; lowest index
/// wins ties. `None` for an empty mesh.
#[must_use]
#[allow(clippy::cast_possible_truncation)]
pub fn nearest_vertex_manhattan(mesh: &ScanMesh, point: &Point3<f64>) -> Option<u32> {
    let mut best: Option<(usize, f64)> = None;
    for (i, p) in mesh.world_positions().iter().enumerate() {
        let d = (p - point).abs().sum();
        match best {
            Some((_, bd)) if d >= bd => {}
            _ => best = Some((i, d)),
        }
    }
    best.map(|(i, _)| i as u32)
}

/// Membership mask of the component containing `seed` (breadth-first).
#[must_use]
pub fn connected_component(mesh: &ScanMesh, seed: u32) -> Vec<bool> {
    let adjacency = MeshAdjacency::build(mesh);
    let mut visited = vec![false; mesh.vertex_count()];
    let Some(slot) = visited.get_mut(seed as usize) else {
        return visited;
    };
    *slot = true;

    let mut queue = VecDeque::from([seed]);
    while let Some(v) = queue.pop_front() {
        for &n in adjacency.neighbors(v) {
            if !visited[n as usize] {
                visited[n as usize] = true;
                queue.push_back(n);
            }
        }
    }
    visited
}

/// Shift local coordinates onto the centroid, then drop the world
/// translation.
fn recenter(mesh: &mut ScanMesh) {
    if let Some(centroid) = mesh.centroid() {
        let offset: Vector3<f64> = centroid.coords;
        if offset.amax() > RECENTER_EPSILON {
            debug!(?offset, "moving origin to geometry");
            mesh.translate(-offset);
            mesh.transform = Transform3D::translation(offset).then(&mesh.transform);
        }
    }
    mesh.transform = mesh.transform.without_translation();
}

fn check_indices(mesh: &ScanMesh) -> RepairResult<()> {
    let vertex_count = mesh.vertex_count();
    if let Some(&index) = mesh
        .faces
        .iter()
        .flatten()
        .chain(mesh.loose_edges.iter().flatten())
        .find(|&&i| i as usize >= vertex_count)
    {
        return Err(RepairError::InvalidIndex {
            index,
            vertex_count,
        });
    }
    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use insole_types::Vertex;

    /// Island A near the origin, island B far along +X, one stray vertex.
    fn islands() -> ScanMesh {
        ScanMesh::from_positions(
            &[
                Point3::new(0.0, 0.0, 0.0),
                Point3::new(2.0, 0.0, 0.0),
                Point3::new(0.0, 2.0, 0.0),
                Point3::new(100.0, 0.0, 0.0),
                Point3::new(102.0, 0.0, 0.0),
                Point3::new(100.0, 2.0, 0.0),
                Point3::new(-40.0, 0.0, 0.0),
            ],
            vec![[0, 1, 2], [3, 4, 5]],
        )
    }

    #[test]
    fn keeps_island_a() {
        let out = prune(&islands(), &Point3::new(0.5, 0.5, 0.0)).unwrap();
        assert_eq!(out.mesh.vertex_count(), 3);
        assert_eq!(out.mesh.faces, vec![[0, 1, 2]]);
        assert_eq!(out.removed_vertices, 4);
        assert_eq!(out.seed, 0);
    }

    #[test]
    fn result_is_centred_at_origin() {
        let mesh = islands().with_transform(Transform3D::translation(Vector3::new(5.0, 5.0, 5.0)));
        let out = prune(&mesh, &Point3::new(105.0, 5.0, 5.0)).unwrap();
        assert_eq!(out.mesh.vertex_count(), 3);
        let c = out.mesh.world_centroid().unwrap();
        assert_relative_eq!(c, Point3::origin(), epsilon = 1e-12);
        assert_relative_eq!(out.mesh.transform.translation_part(), Vector3::zeros());
    }

    #[test]
    fn prune_is_idempotent() {
        let p = Point3::new(1.0, 1.0, 0.0);
        let once = prune(&islands(), &p).unwrap();
        let twice = prune(&once.mesh, &p).unwrap();
        assert_eq!(twice.mesh, once.mesh);
        assert_eq!(twice.removed_vertices, 0);
    }

    #[test]
    fn loose_edges_connect() {
        let mesh = islands().with_loose_edges(vec![[2, 6]]);
        let out = prune(&mesh, &Point3::origin()).unwrap();
        assert_eq!(out.mesh.vertex_count(), 4);
        assert_eq!(out.mesh.loose_edges.len(), 1);
    }

    #[test]
    fn manhattan_tie_takes_first() {
        let mesh = ScanMesh::from_parts(
            vec![
                Vertex::from_coords(1.0, 0.0, 0.0),
                Vertex::from_coords(0.0, 1.0, 0.0),
                Vertex::from_coords(-1.0, 0.0, 0.0),
            ],
            Vec::new(),
        );
        assert_eq!(nearest_vertex_manhattan(&mesh, &Point3::origin()), Some(0));
    }

    #[test]
    fn manhattan_differs_from_euclidean() {
        // (3, 3) is Euclidean-nearer than (0, 4.5) but Manhattan-farther.
        let mesh = ScanMesh::from_parts(
            vec![Vertex::from_coords(3.0, 3.0, 0.0), Vertex::from_coords(0.0, 4.5, 0.0)],
            Vec::new(),
        );
        assert_eq!(nearest_vertex_manhattan(&mesh, &Point3::origin()), Some(1));
    }

    #[test]
    fn centroid_reference() {
        let out = prune_about_centroid(&islands()).unwrap();
        // Centroid is (37.7, 0.57, 0): vertex 1 of island A is nearest.
        assert_eq!(out.seed, 1);
        assert_eq!(out.mesh.vertex_count(), 3);
    }

    #[test]
    fn empty_mesh_fails() {
        assert!(matches!(
            prune(&ScanMesh::new(), &Point3::origin()),
            Err(RepairError::EmptyMesh)
        ));
    }

    #[test]
    fn dangling_index_fails() {
        let mut mesh = islands();
        mesh.faces.push([0, 1, 42]);
        assert!(matches!(
            prune(&mesh, &Point3::origin()),
            Err(RepairError::InvalidIndex { index: 42, .. })
        ));
    }
}
