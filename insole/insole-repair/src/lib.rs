//! Topology repair for foot scans.
//!
//! This crate cleans a raw scan and prepares its boundary for trimming:
//!
//! - **Pruning**: keep only the connected component nearest a reference
//!   point and recentre it at the origin ([`prune`], [`prune_about_centroid`])
//! - **Boundary tracing**: extract the silhouette loop and the interior hole
//!   loops ([`boundary_edges`], [`trace_outer_loop`], [`find_boundary_loops`])
//! - **Hole filling**: close interior holes, leaving the silhouette open
//!   ([`fill_holes`])
//! - **Base extrusion**: close the finished surface into a solid insole
//!   blank ([`extrude_base`])
//!
//! # Layer 0
//!
//! This is a Layer 0 crate with zero Bevy dependencies.
//!
//! # Atomicity
//!
//! Operations take `&ScanMesh` and return new meshes; a failure leaves the
//! caller's mesh exactly as it was.
//!
//! # Example
//!
//! ```
//! use insole_types::{ScanMesh, Point3};
//! use insole_repair::{boundary_edges, trace_outer_loop, TraceParams};
//!
//! let mesh = ScanMesh::from_positions(
//!     &[
//!         Point3::new(0.0, 0.0, 0.0),
//!         Point3::new(1.0, 0.0, 0.0),
//!         Point3::new(1.0, 2.0, 0.0),
//!         Point3::new(0.0, 2.0, 0.0),
//!     ],
//!     vec![[0, 1, 2], [0, 2, 3]],
//! );
//!
//! let edges = boundary_edges(&mesh);
//! let outer = trace_outer_loop(&mesh, &edges, &TraceParams::default()).unwrap();
//! assert_eq!(outer.vertices, vec![2, 1, 0, 3]);
//! ```

#![warn(missing_docs)]
#![cfg_attr(not(test), deny(clippy::unwrap_used, clippy::expect_used))]

mod adjacency;
mod base;
mod boundary;
mod error;
mod holes;
mod prune;

pub use adjacency::MeshAdjacency;
pub use base::{BaseOutput, DEFAULT_BASE_THICKNESS, extrude_base};
pub use boundary::{
    BoundaryLoop, BoundaryLoops, TraceParams, boundary_edges, find_boundary_loops,
    trace_outer_loop,
};
pub use error::{RepairError, RepairResult};
pub use holes::{FillOutput, fill_holes, triangulate_loop};
pub use prune::{
    PruneOutput, connected_component, nearest_vertex_manhattan, prune, prune_about_centroid,
};
