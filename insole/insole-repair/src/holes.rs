//! Interior hole filling.
//!
//! Every hole loop is triangulated independently by ear clipping, falling
//! back to a fan when clipping gets stuck on a non-simple projection. The
//! outer loop is never touched: it is the silhouette the outline curve trims
//! against.

use insole_types::{Point3, ScanMesh, Vector3};
use tracing::{debug, info, warn};

use crate::adjacency::MeshAdjacency;
use crate::boundary::{BoundaryLoop, TraceParams, find_boundary_loops};
use crate::error::{RepairError, RepairResult};

/// Result of [`fill_holes`].
#[derive(Debug, Clone)]
pub struct FillOutput {
    /// The mesh with holes closed.
    pub mesh: ScanMesh,
    /// The outer loop, left open.
    pub outer: BoundaryLoop,
    /// Number of holes filled.
    pub holes_filled: usize,
    /// Number of triangles added.
    pub faces_added: usize,
}

/// Close every interior hole of `mesh`, leaving the outer loop open.
///
/// New triangles are wound against the faces bordering each hole so the
/// patch agrees with the surrounding orientation.
///
/// # Errors
///
/// Boundary tracing errors (see [`find_boundary_loops`]), or
/// [`RepairError::HoleFillFailed`] if a hole cannot be triangulated.
///
/// # Example
///
/// ```
/// use insole_types::{ScanMesh, Point3};
/// use insole_repair::{fill_holes, TraceParams};
///
/// // A triangle fan around a missing centre triangle.
/// let mesh = ScanMesh::from_positions(
///     &[
///         Point3::new(0.0, 0.0, 0.0),
///         Point3::new(4.0, 0.0, 0.0),
///         Point3::new(2.0, 4.0, 0.0),
///         Point3::new(2.0, 1.0, 0.0),
///         Point3::new(2.5, 1.8, 0.0),
///         Point3::new(1.5, 1.8, 0.0),
///     ],
///     vec![[0, 1, 3], [1, 4, 3], [1, 2, 4], [2, 5, 4], [2, 0, 5], [0, 3, 5]],
/// );
///
/// let out = fill_holes(&mesh, &TraceParams::default()).unwrap();
/// assert_eq!(out.holes_filled, 1);
/// assert_eq!(out.faces_added, 1);
/// ```
pub fn fill_holes(mesh: &ScanMesh, params: &TraceParams) -> RepairResult<FillOutput> {
    let loops = find_boundary_loops(mesh, params)?;
    let adjacency = MeshAdjacency::build(mesh);

    let mut filled = mesh.clone();
    let mut faces_added = 0;
    for hole in &loops.holes {
        let mut triangles = triangulate_loop(mesh, hole);
        if triangles.is_empty() {
            return Err(RepairError::HoleFillFailed {
                reason: format!("could not triangulate hole with {} edges", hole.edge_count()),
            });
        }
        if runs_with_faces(mesh, &adjacency, hole) {
            for tri in &mut triangles {
                tri.swap(1, 2);
            }
        }
        faces_added += triangles.len();
        filled.faces.extend(triangles);
    }

    info!(
        holes_filled = loops.holes.len(),
        faces_added,
        outer_loop = loops.outer.edge_count(),
        "filled interior holes"
    );

    Ok(FillOutput {
        mesh: filled,
        outer: loops.outer,
        holes_filled: loops.holes.len(),
        faces_added,
    })
}

/// Triangulate one loop by ear clipping, with a fan fallback.
///
/// Triangles follow the loop's direction. Returns nothing for loops with
/// fewer than three vertices or with a vertex `mesh` does not have.
#[must_use]
pub fn triangulate_loop(mesh: &ScanMesh, boundary: &BoundaryLoop) -> Vec<[u32; 3]> {
    let n = boundary.vertices.len();
    if n < 3 {
        return Vec::new();
    }

    let Some(positions) = boundary
        .vertices
        .iter()
        .map(|&v| mesh.vertices.get(v as usize).map(|vertex| vertex.position))
        .collect::<Option<Vec<Point3<f64>>>>()
    else {
        warn!(
            vertices = n,
            mesh_vertices = mesh.vertex_count(),
            "loop references missing vertices, not triangulated"
        );
        return Vec::new();
    };
    let normal = loop_normal(&positions);

    let mut remaining: Vec<usize> = (0..n).collect();
    let mut triangles = Vec::with_capacity(n - 2);

    while remaining.len() > 3 {
        let m = remaining.len();
        let ear = (0..m).find(|&i| {
            let prev = remaining[(i + m - 1) % m];
            let next = remaining[(i + 1) % m];
            is_ear(&positions, &remaining, prev, remaining[i], next, &normal)
        });

        let Some(i) = ear else {
            warn!(
                remaining = m,
                "ear clipping stuck, falling back to fan triangulation"
            );
            break;
        };
        let prev = remaining[(i + m - 1) % m];
        let next = remaining[(i + 1) % m];
        triangles.push([
            boundary.vertices[prev],
            boundary.vertices[remaining[i]],
            boundary.vertices[next],
        ]);
        remaining.remove(i);
    }

    let hub = remaining[0];
    for w in remaining[1..].windows(2) {
        triangles.push([
            boundary.vertices[hub],
            boundary.vertices[w[0]],
            boundary.vertices[w[1]],
        ]);
    }

    debug!(edges = n, triangles = triangles.len(), "triangulated loop");
    triangles
}

/// True if a face bordering the loop traverses a loop edge in loop order,
/// meaning a patch following the loop would be wound the wrong way.
fn runs_with_faces(mesh: &ScanMesh, adjacency: &MeshAdjacency, hole: &BoundaryLoop) -> bool {
    let n = hole.vertices.len();
    for k in 0..n {
        let (a, b) = (hole.vertices[k], hole.vertices[(k + 1) % n]);
        let Some(&face_idx) = adjacency.faces_for_edge(a, b).and_then(<[usize]>::first) else {
            continue;
        };
        let face = mesh.faces[face_idx];
        return (0..3).any(|j| face[j] == a && face[(j + 1) % 3] == b);
    }
    false
}

/// Newell-style average normal of a polygon.
fn loop_normal(positions: &[Point3<f64>]) -> Vector3<f64> {
    #[allow(clippy::cast_precision_loss)]
    let centroid = positions
        .iter()
        .fold(Vector3::zeros(), |acc, p| acc + p.coords)
        / positions.len() as f64;

    let n = positions.len();
    let mut normal = Vector3::zeros();
    for i in 0..n {
        let v0 = positions[i].coords - centroid;
        let v1 = positions[(i + 1) % n].coords - centroid;
        normal += v0.cross(&v1);
    }

    let len = normal.norm();
    if len > f64::EPSILON {
        normal / len
    } else {
        Vector3::z()
    }
}

fn is_ear(
    positions: &[Point3<f64>],
    remaining: &[usize],
    prev: usize,
    curr: usize,
    next: usize,
    normal: &Vector3<f64>,
) -> bool {
    let (a, b, c) = (positions[prev], positions[curr], positions[next]);
    let tri_normal = (b - a).cross(&(c - a));
    if tri_normal.norm() <= f64::EPSILON || tri_normal.dot(normal) <= 0.0 {
        return false;
    }

    !remaining
        .iter()
        .filter(|&&idx| idx != prev && idx != curr && idx != next)
        .any(|&idx| point_in_triangle(&positions[idx], &a, &b, &c, normal))
}

/// Point-in-triangle test in the plane most perpendicular to `normal`.
fn point_in_triangle(
    p: &Point3<f64>,
    a: &Point3<f64>,
    b: &Point3<f64>,
    c: &Point3<f64>,
    normal: &Vector3<f64>,
) -> bool {
    let abs = normal.abs();
    let (u, v) = if abs.z >= abs.x && abs.z >= abs.y {
        (0, 1)
    } else if abs.y >= abs.x {
        (0, 2)
    } else {
        (1, 2)
    };
    let flat = |q: &Point3<f64>| (q[u], q[v]);
    let (p, a, b, c) = (flat(p), flat(a), flat(b), flat(c));

    let sign = |p1: (f64, f64), p2: (f64, f64), p3: (f64, f64)| {
        (p1.0 - p3.0) * (p2.1 - p3.1) - (p2.0 - p3.0) * (p1.1 - p3.1)
    };
    let d1 = sign(p, a, b);
    let d2 = sign(p, b, c);
    let d3 = sign(p, c, a);

    let has_neg = d1 < 0.0 || d2 < 0.0 || d3 < 0.0;
    let has_pos = d1 > 0.0 || d2 > 0.0 || d3 > 0.0;
    !(has_neg && has_pos)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::boundary::boundary_edges;

    fn square_with_hole() -> ScanMesh {
        ScanMesh::from_positions(
            &[
                Point3::new(0.0, 0.0, 0.0),
                Point3::new(1.0, 0.0, 0.0),
                Point3::new(1.0, 1.0, 0.0),
                Point3::new(0.0, 1.0, 0.0),
                Point3::new(0.3, 0.3, 0.0),
                Point3::new(0.7, 0.3, 0.0),
                Point3::new(0.5, 0.7, 0.0),
            ],
            vec![
                [0, 1, 5],
                [0, 5, 4],
                [1, 2, 6],
                [1, 6, 5],
                [2, 3, 6],
                [3, 0, 4],
                [3, 4, 6],
            ],
        )
    }

    /// 4 x 4 vertex grid with the two centre triangles removed, leaving a
    /// square hole bounded by vertices 5, 6, 10, 9.
    fn grid_with_square_hole() -> ScanMesh {
        let mut positions = Vec::new();
        for j in 0..4 {
            for i in 0..4 {
                positions.push(Point3::new(f64::from(i), f64::from(j), 0.0));
            }
        }
        let mut faces = Vec::new();
        for j in 0..3u32 {
            for i in 0..3u32 {
                if (i, j) == (1, 1) {
                    continue;
                }
                let idx = j * 4 + i;
                faces.push([idx, idx + 1, idx + 5]);
                faces.push([idx, idx + 5, idx + 4]);
            }
        }
        ScanMesh::from_positions(&positions, faces)
    }

    #[test]
    fn triangular_hole_gets_one_face() {
        let out = fill_holes(&square_with_hole(), &TraceParams::default()).unwrap();
        assert_eq!(out.holes_filled, 1);
        assert_eq!(out.faces_added, 1);
        assert_eq!(out.mesh.faces.last(), Some(&[4, 5, 6]));
        assert_eq!(out.outer.vertices, vec![2, 1, 0, 3]);
        assert_eq!(boundary_edges(&out.mesh).len(), 4);
    }

    #[test]
    fn square_hole_is_closed_consistently() {
        let mesh = grid_with_square_hole();
        let out = fill_holes(&mesh, &TraceParams::default()).unwrap();
        assert_eq!(out.faces_added, 2);
        assert_eq!(boundary_edges(&out.mesh).len(), 12);

        // Every interior edge is used once in each direction.
        let adjacency = MeshAdjacency::build(&out.mesh);
        for [a, b] in out.mesh.edges() {
            let faces = adjacency.faces_for_edge(a, b).unwrap();
            if faces.len() == 2 {
                let forward = faces
                    .iter()
                    .filter(|&&f| {
                        let face = out.mesh.faces[f];
                        (0..3).any(|j| face[j] == a && face[(j + 1) % 3] == b)
                    })
                    .count();
                assert_eq!(forward, 1, "edge {a}-{b} is wound inconsistently");
            }
        }
    }

    #[test]
    fn outer_only_adds_nothing() {
        let mesh = ScanMesh::from_positions(
            &[Point3::origin(), Point3::new(1.0, 0.0, 0.0), Point3::new(0.0, 1.0, 0.0)],
            vec![[0, 1, 2]],
        );
        let out = fill_holes(&mesh, &TraceParams::default()).unwrap();
        assert_eq!(out.holes_filled, 0);
        assert_eq!(out.mesh, mesh);
    }

    #[test]
    fn concave_loop_uses_ears() {
        // An L-shaped hexagon.
        let mesh = ScanMesh::from_positions(
            &[
                Point3::new(0.0, 0.0, 0.0),
                Point3::new(2.0, 0.0, 0.0),
                Point3::new(2.0, 1.0, 0.0),
                Point3::new(1.0, 1.0, 0.0),
                Point3::new(1.0, 2.0, 0.0),
                Point3::new(0.0, 2.0, 0.0),
            ],
            Vec::new(),
        );
        let hexagon = BoundaryLoop {
            vertices: vec![0, 1, 2, 3, 4, 5],
        };
        let tris = triangulate_loop(&mesh, &hexagon);
        assert_eq!(tris.len(), 4);
        for [a, b, c] in tris {
            let (pa, pb, pc) = (
                mesh.vertices[a as usize].position,
                mesh.vertices[b as usize].position,
                mesh.vertices[c as usize].position,
            );
            assert!((pb - pa).cross(&(pc - pa)).z > 0.0);
        }
    }

    #[test]
    fn degenerate_loop_yields_nothing() {
        let mesh = square_with_hole();
        let pair = BoundaryLoop {
            vertices: vec![0, 1],
        };
        assert!(triangulate_loop(&mesh, &pair).is_empty());
    }

    #[test]
    fn foreign_loop_yields_nothing() {
        let mesh = square_with_hole();
        let foreign = BoundaryLoop {
            vertices: vec![0, 1, 99],
        };
        assert!(triangulate_loop(&mesh, &foreign).is_empty());
    }
}
