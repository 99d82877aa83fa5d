//! Edge adjacency for scan meshes.
//!
//! Unlike a face-only adjacency, loose (wire) edges are included with an
//! empty face list so that they count as boundary and take part in
//! connectivity.

use hashbrown::HashMap;
use insole_types::ScanMesh;

/// Edge-to-face and vertex-to-vertex lookups.
#[derive(Debug, Clone)]
pub struct MeshAdjacency {
    edge_to_faces: HashMap<(u32, u32), Vec<usize>>,
    neighbors: Vec<Vec<u32>>,
}

impl MeshAdjacency {
    /// Build adjacency for `mesh`.
    ///
    /// Indices outside the vertex range are ignored; callers that need to
    /// reject them check [`ScanMesh::indices_valid`] first.
    ///
    /// # Example
    ///
    /// ```
    /// use insole_types::{ScanMesh, Point3};
    /// use insole_repair::MeshAdjacency;
    ///
    /// let mesh = ScanMesh::from_positions(
    ///     &[Point3::origin(), Point3::new(1.0, 0.0, 0.0), Point3::new(0.0, 1.0, 0.0)],
    ///     vec![[0, 1, 2]],
    /// );
    /// let adjacency = MeshAdjacency::build(&mesh);
    /// assert_eq!(adjacency.edge_count(), 3);
    /// assert_eq!(adjacency.neighbors(0), &[1, 2]);
    /// ```
    #[must_use]
    pub fn build(mesh: &ScanMesh) -> Self {
        let mut edge_to_faces: HashMap<(u32, u32), Vec<usize>> = HashMap::new();
        for (face_idx, face) in mesh.faces.iter().enumerate() {
            for k in 0..3 {
                let edge = normalize_edge(face[k], face[(k + 1) % 3]);
                edge_to_faces.entry(edge).or_default().push(face_idx);
            }
        }
        for &[a, b] in &mesh.loose_edges {
            edge_to_faces.entry(normalize_edge(a, b)).or_default();
        }

        let n = mesh.vertex_count();
        let mut neighbors = vec![Vec::new(); n];
        for &(a, b) in edge_to_faces.keys() {
            if a == b || a as usize >= n || b as usize >= n {
                continue;
            }
            neighbors[a as usize].push(b);
            neighbors[b as usize].push(a);
        }
        for ns in &mut neighbors {
            ns.sort_unstable();
        }

        Self {
            edge_to_faces,
            neighbors,
        }
    }

    /// Faces sharing the edge `(v0, v1)`, in either direction.
    #[must_use]
    pub fn faces_for_edge(&self, v0: u32, v1: u32) -> Option<&[usize]> {
        self.edge_to_faces
            .get(&normalize_edge(v0, v1))
            .map(Vec::as_slice)
    }

    /// Edge neighbours of `v`, ascending.
    #[must_use]
    pub fn neighbors(&self, v: u32) -> &[u32] {
        self.neighbors.get(v as usize).map_or(&[], Vec::as_slice)
    }

    /// Edges with an incident face count other than two, sorted.
    #[must_use]
    pub fn boundary_edges(&self) -> Vec<[u32; 2]> {
        let mut edges: Vec<[u32; 2]> = self
            .edge_to_faces
            .iter()
            .filter(|(_, faces)| faces.len() != 2)
            .map(|(&(a, b), _)| [a, b])
            .collect();
        edges.sort_unstable();
        edges
    }

    /// Number of unique edges.
    #[must_use]
    pub fn edge_count(&self) -> usize {
        self.edge_to_faces.len()
    }

    /// True if every edge is shared by exactly two faces.
    #[must_use]
    pub fn is_watertight(&self) -> bool {
        self.edge_to_faces.values().all(|faces| faces.len() == 2)
    }
}

#[inline]
pub(crate) fn normalize_edge(v0: u32, v1: u32) -> (u32, u32) {
    if v0 < v1 { (v0, v1) } else { (v1, v0) }
}
