//! The scan mesh model.

use nalgebra::{Point3, Vector3};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::{Aabb, Axis, AxisFrame, Transform3D, Vertex};

/// A scanned foot surface.
///
/// Vertices are stored in local space; `transform` maps them to world space.
/// Topology is a list of CCW triangles plus any loose (wire) edges that the
/// scanner emitted without a face. The mesh's edge set is the union of both.
///
/// Every index in `faces` and `loose_edges` refers to a live vertex. Vertex
/// removal goes through [`ScanMesh::retain_vertices`], which compacts the
/// vertex array and drops or remaps dependent topology.
#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ScanMesh {
    /// Local-space vertices.
    pub vertices: Vec<Vertex>,
    /// Triangle faces (CCW).
    pub faces: Vec<[u32; 3]>,
    /// Edges not owned by any face.
    pub loose_edges: Vec<[u32; 2]>,
    /// Object-to-world transform.
    pub transform: Transform3D,
    /// Anatomical axis assignment.
    pub axes: AxisFrame,
}

impl ScanMesh {
    /// An empty mesh with identity transform and the foot axis frame.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a mesh from vertices and faces.
    #[must_use]
    pub fn from_parts(vertices: Vec<Vertex>, faces: Vec<[u32; 3]>) -> Self {
        Self {
            vertices,
            faces,
            ..Self::default()
        }
    }

    /// Build a mesh from bare positions and faces.
    ///
    /// # Example
    ///
    /// ```
    /// use insole_types::{ScanMesh, Point3};
    ///
    /// let mesh = ScanMesh::from_positions(
    ///     &[
    ///         Point3::new(0.0, 0.0, 0.0),
    ///         Point3::new(1.0, 0.0, 0.0),
    ///         Point3::new(0.0, 1.0, 0.0),
    ///     ],
    ///     vec![[0, 1, 2]],
    /// );
    /// assert_eq!(mesh.vertex_count(), 3);
    /// assert_eq!(mesh.edges().len(), 3);
    /// ```
    #[must_use]
    pub fn from_positions(positions: &[Point3<f64>], faces: Vec<[u32; 3]>) -> Self {
        Self::from_parts(positions.iter().copied().map(Vertex::new).collect(), faces)
    }

    /// Set loose edges.
    #[must_use]
    pub fn with_loose_edges(mut self, edges: Vec<[u32; 2]>) -> Self {
        self.loose_edges = edges;
        self
    }

    /// Set the world transform.
    #[must_use]
    pub fn with_transform(mut self, transform: Transform3D) -> Self {
        self.transform = transform;
        self
    }

    /// Set the axis frame.
    #[must_use]
    pub fn with_axes(mut self, axes: AxisFrame) -> Self {
        self.axes = axes;
        self
    }

    /// Number of vertices.
    #[inline]
    #[must_use]
    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    /// Number of faces.
    #[inline]
    #[must_use]
    pub fn face_count(&self) -> usize {
        self.faces.len()
    }

    /// True if the mesh has no vertices.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.vertices.is_empty()
    }

    /// World-space position of vertex `index`.
    #[must_use]
    pub fn world_position(&self, index: usize) -> Point3<f64> {
        self.transform.transform_point(&self.vertices[index].position)
    }

    /// All world-space positions, in vertex order.
    #[must_use]
    pub fn world_positions(&self) -> Vec<Point3<f64>> {
        self.vertices
            .iter()
            .map(|v| self.transform.transform_point(&v.position))
            .collect()
    }

    /// Local-space longitudinal coordinate of vertex `index`.
    #[inline]
    #[must_use]
    pub fn longitudinal(&self, index: usize) -> f64 {
        self.axes.longitudinal.of(&self.vertices[index].position)
    }

    /// Local-space bounds.
    #[must_use]
    pub fn local_bounds(&self) -> Aabb {
        Aabb::from_points(self.vertices.iter().map(|v| &v.position))
    }

    /// World-space bounds.
    #[must_use]
    pub fn world_bounds(&self) -> Aabb {
        Aabb::from_points(self.world_positions().iter())
    }

    /// Local-space vertex centroid, `None` for an empty mesh.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn centroid(&self) -> Option<Point3<f64>> {
        if self.vertices.is_empty() {
            return None;
        }
        let sum = self
            .vertices
            .iter()
            .fold(Vector3::zeros(), |acc, v| acc + v.position.coords);
        Some(Point3::from(sum / self.vertices.len() as f64))
    }

    /// World-space vertex centroid, `None` for an empty mesh.
    #[must_use]
    pub fn world_centroid(&self) -> Option<Point3<f64>> {
        self.centroid().map(|c| self.transform.transform_point(&c))
    }

    /// The unique undirected edges of the mesh, each as `[min, max]`,
    /// sorted. Includes face edges and loose edges.
    #[must_use]
    pub fn edges(&self) -> Vec<[u32; 2]> {
        let mut edges: Vec<[u32; 2]> = self
            .faces
            .iter()
            .flat_map(|&[a, b, c]| [[a, b], [b, c], [c, a]])
            .chain(self.loose_edges.iter().copied())
            .filter(|[a, b]| a != b)
            .map(|[a, b]| [a.min(b), a.max(b)])
            .collect();
        edges.sort_unstable();
        edges.dedup();
        edges
    }

    /// True if every face and loose edge index refers to a live vertex.
    #[must_use]
    pub fn indices_valid(&self) -> bool {
        let n = self.vertices.len();
        self.faces.iter().flatten().all(|&i| (i as usize) < n)
            && self.loose_edges.iter().flatten().all(|&i| (i as usize) < n)
    }

    /// Move every local vertex by `offset`.
    pub fn translate(&mut self, offset: Vector3<f64>) {
        for v in &mut self.vertices {
            v.position += offset;
        }
    }

    /// Bake the world transform into the vertices and reset it to identity.
    ///
    /// Reflections flip face winding so faces stay outward-facing.
    pub fn apply_transform(&mut self) {
        if self.transform.is_identity() {
            return;
        }
        for v in &mut self.vertices {
            v.position = self.transform.transform_point(&v.position);
        }
        if self.transform.is_reflection() {
            for face in &mut self.faces {
                face.swap(1, 2);
            }
        }
        self.transform = Transform3D::identity();
    }

    /// Re-derive the axis frame from the world-space bounds.
    pub fn orient_axes(&mut self) {
        if !self.is_empty() {
            self.axes = AxisFrame::from_extents(&self.world_bounds().size());
        }
    }

    /// Copy of the mesh reflected across the plane normal to `axis` through
    /// the local origin, with winding flipped.
    #[must_use]
    pub fn mirrored(&self, axis: Axis) -> Self {
        let mut out = self.clone();
        for v in &mut out.vertices {
            v.position[axis.index()] = -v.position[axis.index()];
        }
        for face in &mut out.faces {
            face.swap(1, 2);
        }
        out
    }

    /// Copy of the mesh keeping only vertices with `keep[i] == true`.
    ///
    /// Kept vertices retain their relative order. Faces and loose edges that
    /// touch a dropped vertex are dropped; the rest are remapped.
    #[must_use]
    #[allow(clippy::cast_possible_truncation)]
    pub fn retain_vertices(&self, keep: &[bool]) -> Self {
        let mut remap: Vec<Option<u32>> = vec![None; self.vertices.len()];
        let mut vertices = Vec::with_capacity(self.vertices.len());
        for (i, v) in self.vertices.iter().enumerate() {
            if keep.get(i).copied().unwrap_or(false) {
                remap[i] = Some(vertices.len() as u32);
                vertices.push(*v);
            }
        }

        let map = |i: u32| remap.get(i as usize).copied().flatten();

        let faces = self
            .faces
            .iter()
            .filter_map(|&[a, b, c]| Some([map(a)?, map(b)?, map(c)?]))
            .collect();
        let loose_edges = self
            .loose_edges
            .iter()
            .filter_map(|&[a, b]| Some([map(a)?, map(b)?]))
            .collect();

        Self {
            vertices,
            faces,
            loose_edges,
            transform: self.transform,
            axes: self.axes,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn quad() -> ScanMesh {
        ScanMesh::from_positions(
            &[
                Point3::new(0.0, 0.0, 0.0),
                Point3::new(1.0, 0.0, 0.0),
                Point3::new(1.0, 2.0, 0.0),
                Point3::new(0.0, 2.0, 0.0),
            ],
            vec![[0, 1, 2], [0, 2, 3]],
        )
    }

    #[test]
    fn edges_are_unique() {
        let mesh = quad().with_loose_edges(vec![[3, 0], [1, 3]]);
        let edges = mesh.edges();
        assert_eq!(edges, vec![[0, 1], [0, 2], [0, 3], [1, 2], [1, 3], [2, 3]]);
    }

    #[test]
    fn world_position_uses_transform() {
        let mesh = quad().with_transform(Transform3D::translation(Vector3::new(10.0, 0.0, 0.0)));
        assert_relative_eq!(mesh.world_position(2), Point3::new(11.0, 2.0, 0.0));
        assert_relative_eq!(mesh.world_bounds().min_along(Axis::X), 10.0);
    }

    #[test]
    fn apply_transform_bakes() {
        let mut mesh =
            quad().with_transform(Transform3D::translation(Vector3::new(0.0, 0.0, 5.0)));
        mesh.apply_transform();
        assert!(mesh.transform.is_identity());
        assert_relative_eq!(mesh.vertices[0].position.z, 5.0);
    }

    #[test]
    fn apply_reflection_flips_winding() {
        let mut mesh = quad().with_transform(Transform3D::mirror(Axis::X));
        mesh.apply_transform();
        assert_eq!(mesh.faces[0], [0, 2, 1]);
    }

    #[test]
    fn retain_vertices_compacts() {
        let mesh = quad().with_loose_edges(vec![[1, 3]]);
        let kept = mesh.retain_vertices(&[true, false, true, true]);
        assert_eq!(kept.vertex_count(), 3);
        assert_eq!(kept.faces, vec![[0, 1, 2]]);
        assert!(kept.loose_edges.is_empty());
        assert!(kept.indices_valid());
    }

    #[test]
    fn centroid_of_quad() {
        let c = quad().centroid().unwrap();
        assert_relative_eq!(c, Point3::new(0.5, 1.0, 0.0));
        assert!(ScanMesh::new().centroid().is_none());
    }

    #[test]
    fn orient_axes_from_bounds() {
        let mut mesh = ScanMesh::from_positions(
            &[Point3::new(0.0, 0.0, 0.0), Point3::new(10.0, 1.0, 3.0)],
            Vec::new(),
        );
        mesh.orient_axes();
        assert_eq!(mesh.axes.longitudinal, Axis::X);
        assert_eq!(mesh.axes.vertical, Axis::Y);
        assert_eq!(mesh.axes.lateral, Axis::Z);
    }

    #[test]
    fn mirrored_negates_axis() {
        let m = quad().mirrored(Axis::X);
        assert_relative_eq!(m.vertices[1].position.x, -1.0);
        assert_eq!(m.faces[1], [0, 3, 2]);
    }
}
