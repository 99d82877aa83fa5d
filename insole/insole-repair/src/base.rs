//! Solid base extrusion.
//!
//! Turns the open insole top surface into a closed solid: every face-bearing
//! vertex gets a copy on a flat floor `thickness` below the lowest point of
//! the surface, the copied faces are wound downward, and a wall strip joins
//! each open edge of the top to its copy.

// Indices stay u32; meshes beyond 4B vertices are out of range for scans.
#![allow(clippy::cast_possible_truncation)]

use hashbrown::HashMap;
use insole_types::ScanMesh;
use tracing::{debug, info};

use crate::adjacency::normalize_edge;
use crate::error::{RepairError, RepairResult};

/// Default base thickness below the lowest scan point, in millimetres.
pub const DEFAULT_BASE_THICKNESS: f64 = 10.0;

/// Result of [`extrude_base`].
#[derive(Debug, Clone)]
pub struct BaseOutput {
    /// The closed solid.
    pub mesh: ScanMesh,
    /// Vertical coordinate of the floor.
    pub floor: f64,
    /// Number of wall triangles created.
    pub wall_faces: usize,
}

/// Extrude the surface down to a flat floor `thickness` below its lowest
/// vertex, measured along the mesh's vertical axis in local space.
///
/// Loose edges and face-less vertices are carried over unchanged and get no
/// floor copy.
///
/// # Errors
///
/// - [`RepairError::EmptyMesh`] if the mesh has no faces
/// - [`RepairError::InvalidParameter`] for a negative or non-finite thickness
/// - [`RepairError::NoBoundary`] if the surface is already closed
///
/// # Example
///
/// ```
/// use insole_types::{ScanMesh, Point3};
/// use insole_repair::{extrude_base, boundary_edges};
///
/// let top = ScanMesh::from_positions(
///     &[
///         Point3::new(0.0, 0.0, 2.0),
///         Point3::new(1.0, 0.0, 2.0),
///         Point3::new(1.0, 1.0, 3.0),
///         Point3::new(0.0, 1.0, 3.0),
///     ],
///     vec![[0, 1, 2], [0, 2, 3]],
/// );
///
/// let out = extrude_base(&top, 10.0).unwrap();
/// assert_eq!(out.floor, -8.0);
/// assert_eq!(out.mesh.vertex_count(), 8);
/// assert!(boundary_edges(&out.mesh).is_empty());
/// ```
pub fn extrude_base(mesh: &ScanMesh, thickness: f64) -> RepairResult<BaseOutput> {
    if mesh.faces.is_empty() {
        return Err(RepairError::EmptyMesh);
    }
    if !thickness.is_finite() || thickness < 0.0 {
        return Err(RepairError::InvalidParameter {
            name: "thickness",
            value: thickness,
        });
    }
    let vertex_count = mesh.vertex_count();
    if let Some(&index) = mesh.faces.iter().flatten().find(|&&i| i as usize >= vertex_count) {
        return Err(RepairError::InvalidIndex {
            index,
            vertex_count,
        });
    }

    // Directed edges of faces, keyed by undirected edge, to find the open rim.
    let mut directed: HashMap<(u32, u32), Vec<(u32, u32)>> = HashMap::new();
    for face in &mesh.faces {
        for k in 0..3 {
            let (a, b) = (face[k], face[(k + 1) % 3]);
            directed.entry(normalize_edge(a, b)).or_default().push((a, b));
        }
    }
    let mut rim: Vec<(u32, u32)> = directed
        .values()
        .filter(|uses| uses.len() == 1)
        .map(|uses| uses[0])
        .collect();
    if rim.is_empty() {
        return Err(RepairError::NoBoundary);
    }
    rim.sort_unstable();

    let up = mesh.axes.vertical.index();
    let mut copy: Vec<Option<u32>> = vec![None; vertex_count];
    let mut solid = mesh.clone();
    let lowest = mesh
        .faces
        .iter()
        .flatten()
        .map(|&i| mesh.vertices[i as usize].position[up])
        .fold(f64::INFINITY, f64::min);
    let floor = lowest - thickness;

    for &i in mesh.faces.iter().flatten() {
        let slot = &mut copy[i as usize];
        if slot.is_none() {
            let mut v = mesh.vertices[i as usize];
            v.position[up] = floor;
            *slot = Some(solid.vertices.len() as u32);
            solid.vertices.push(v);
        }
    }
    let below = |i: u32| copy[i as usize].unwrap_or(i);

    for &[a, b, c] in &mesh.faces {
        solid.faces.push([below(a), below(c), below(b)]);
    }

    for &(a, b) in &rim {
        let (a2, b2) = (below(a), below(b));
        solid.faces.push([b, a, a2]);
        solid.faces.push([b, a2, b2]);
    }
    let wall_faces = rim.len() * 2;

    debug!(lowest, floor, rim_edges = rim.len(), "extruding base");
    info!(
        vertices = solid.vertex_count(),
        faces = solid.face_count(),
        wall_faces,
        "extruded insole base"
    );

    Ok(BaseOutput {
        mesh: solid,
        floor,
        wall_faces,
    })
}
