//! Boundary edge extraction and loop tracing.
//!
//! A scan's open boundary consists of one outer loop (the silhouette of the
//! foot, which stays open until the outline trim) and any number of interior
//! hole loops. The outer loop is identified by seeding the walk at the
//! boundary vertex furthest towards the toe: no interior hole can reach the
//! global extremum.
//!
//! Walks use an explicit stack so that rims of hundreds of thousands of
//! vertices cannot exhaust the call stack, and are capped by
//! [`TraceParams::max_loop_vertices`].

use hashbrown::{HashMap, HashSet};
use insole_types::ScanMesh;
use tracing::{debug, info};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::adjacency::{MeshAdjacency, normalize_edge};
use crate::error::{RepairError, RepairResult};

/// Loop tracing limits.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct TraceParams {
    /// Longest loop a walk may produce before failing.
    pub max_loop_vertices: usize,
}

impl Default for TraceParams {
    fn default() -> Self {
        Self {
            max_loop_vertices: 250_000,
        }
    }
}

impl TraceParams {
    /// Set the loop length cap.
    #[must_use]
    pub const fn with_max_loop_vertices(mut self, max: usize) -> Self {
        self.max_loop_vertices = max;
        self
    }
}

/// One closed boundary loop.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BoundaryLoop {
    /// Vertex indices in adjacency order; the closing edge runs from the last
    /// vertex back to the first.
    pub vertices: Vec<u32>,
}

impl BoundaryLoop {
    /// Number of edges (and vertices) in the loop.
    #[must_use]
    pub fn edge_count(&self) -> usize {
        self.vertices.len()
    }

    /// True if the loop has at least three vertices.
    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.vertices.len() >= 3
    }

    /// True if `vertex` lies on the loop.
    #[must_use]
    pub fn contains(&self, vertex: u32) -> bool {
        self.vertices.contains(&vertex)
    }
}

/// All boundary loops of a mesh.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BoundaryLoops {
    /// The silhouette.
    pub outer: BoundaryLoop,
    /// Interior holes.
    pub holes: Vec<BoundaryLoop>,
}

/// Edges of `mesh` whose incident face count is not two, each as
/// `[min, max]`, sorted. Loose edges are always included.
///
/// # Example
///
/// ```
/// use insole_types::{ScanMesh, Point3};
/// use insole_repair::boundary_edges;
///
/// let mesh = ScanMesh::from_positions(
///     &[Point3::origin(), Point3::new(1.0, 0.0, 0.0), Point3::new(0.0, 1.0, 0.0)],
///     vec![[0, 1, 2]],
/// );
/// assert_eq!(boundary_edges(&mesh), vec![[0, 1], [0, 2], [1, 2]]);
/// ```
#[must_use]
pub fn boundary_edges(mesh: &ScanMesh) -> Vec<[u32; 2]> {
    MeshAdjacency::build(mesh).boundary_edges()
}

/// Trace the outer loop from a set of boundary edges.
///
/// The walk starts at the boundary vertex with the greatest world-space
/// longitudinal coordinate (lowest index on ties) and visits neighbours in
/// ascending index order.
///
/// # Errors
///
/// - [`RepairError::NoBoundary`] if `boundary_edges` is empty
/// - [`RepairError::InvalidIndex`] if an edge references a missing vertex
/// - [`RepairError::DegenerateTopology`] if any vertex has more than two
///   boundary edges, or the walk does not close into a cycle of at least
///   three vertices
/// - [`RepairError::LoopTooComplex`] if the walk exceeds the vertex cap
pub fn trace_outer_loop(
    mesh: &ScanMesh,
    boundary_edges: &[[u32; 2]],
    params: &TraceParams,
) -> RepairResult<BoundaryLoop> {
    let graph = BoundaryGraph::build(mesh, boundary_edges)?;
    let seed = graph.extremal_vertex(mesh)?;
    let outer = graph.walk(seed, params)?;
    info!(
        seed,
        vertices = outer.edge_count(),
        "traced outer boundary loop"
    );
    Ok(outer)
}

/// Trace the outer loop and every hole loop of `mesh`.
///
/// # Errors
///
/// Same conditions as [`trace_outer_loop`]; hole loops must be simple cycles
/// too.
pub fn find_boundary_loops(mesh: &ScanMesh, params: &TraceParams) -> RepairResult<BoundaryLoops> {
    let edges = boundary_edges(mesh);
    let graph = BoundaryGraph::build(mesh, &edges)?;
    let seed = graph.extremal_vertex(mesh)?;
    let outer = graph.walk(seed, params)?;

    let mut claimed: HashSet<u32> = outer.vertices.iter().copied().collect();
    let mut holes = Vec::new();
    for &start in &graph.vertices {
        if claimed.contains(&start) {
            continue;
        }
        let hole = graph.walk(start, params)?;
        claimed.extend(hole.vertices.iter().copied());
        holes.push(hole);
    }

    info!(
        outer = outer.edge_count(),
        holes = holes.len(),
        "found boundary loops"
    );
    Ok(BoundaryLoops { outer, holes })
}

/// Adjacency restricted to boundary edges.
struct BoundaryGraph {
    adjacency: HashMap<u32, Vec<u32>>,
    /// Boundary vertices, ascending.
    vertices: Vec<u32>,
}

impl BoundaryGraph {
    fn build(mesh: &ScanMesh, edges: &[[u32; 2]]) -> RepairResult<Self> {
        if edges.is_empty() {
            return Err(RepairError::NoBoundary);
        }

        let vertex_count = mesh.vertex_count();
        let mut unique: HashSet<(u32, u32)> = HashSet::with_capacity(edges.len());
        let mut adjacency: HashMap<u32, Vec<u32>> = HashMap::new();
        for &[a, b] in edges {
            for v in [a, b] {
                if v as usize >= vertex_count {
                    return Err(RepairError::InvalidIndex {
                        index: v,
                        vertex_count,
                    });
                }
            }
            if a == b || !unique.insert(normalize_edge(a, b)) {
                continue;
            }
            adjacency.entry(a).or_default().push(b);
            adjacency.entry(b).or_default().push(a);
        }

        let mut vertices: Vec<u32> = adjacency.keys().copied().collect();
        vertices.sort_unstable();

        for &v in &vertices {
            let ns = adjacency.get_mut(&v).map(|ns| {
                ns.sort_unstable();
                ns.len()
            });
            if let Some(degree) = ns
                && degree > 2
            {
                return Err(RepairError::DegenerateTopology {
                    details: format!("vertex {v} has {degree} boundary edges"),
                });
            }
        }

        debug!(
            edges = unique.len(),
            vertices = vertices.len(),
            "built boundary graph"
        );
        Ok(Self {
            adjacency,
            vertices,
        })
    }

    fn neighbors(&self, v: u32) -> &[u32] {
        self.adjacency.get(&v).map_or(&[], Vec::as_slice)
    }

    /// Boundary vertex furthest towards the toe in world space.
    fn extremal_vertex(&self, mesh: &ScanMesh) -> RepairResult<u32> {
        let long = mesh.axes.longitudinal;
        let mut best: Option<(u32, f64)> = None;
        for &v in &self.vertices {
            let y = long.of(&mesh.world_position(v as usize));
            match best {
                Some((_, by)) if y <= by => {}
                _ => best = Some((v, y)),
            }
        }
        best.map(|(v, _)| v).ok_or(RepairError::NoBoundary)
    }

    /// Depth-first walk from `seed`; must close back onto it.
    fn walk(&self, seed: u32, params: &TraceParams) -> RepairResult<BoundaryLoop> {
        let mut visited: HashSet<u32> = HashSet::new();
        let mut order = Vec::new();
        let mut stack = vec![seed];

        while let Some(v) = stack.pop() {
            if !visited.insert(v) {
                continue;
            }
            order.push(v);
            if order.len() > params.max_loop_vertices {
                return Err(RepairError::LoopTooComplex {
                    limit: params.max_loop_vertices,
                });
            }
            for &n in self.neighbors(v).iter().rev() {
                if !visited.contains(&n) {
                    stack.push(n);
                }
            }
        }

        let closes = order.len() >= 3
            && order.iter().all(|&v| self.neighbors(v).len() == 2)
            && order
                .last()
                .is_some_and(|&last| self.neighbors(seed).contains(&last));
        if !closes {
            return Err(RepairError::DegenerateTopology {
                details: format!(
                    "walk from vertex {seed} does not close ({} vertices)",
                    order.len()
                ),
            });
        }

        Ok(BoundaryLoop { vertices: order })
    }
}
