//! Core types for foot-scan insole processing.
//!
//! This crate provides the data model shared by every insole crate:
//!
//! - [`ScanMesh`] - A scanned foot surface: vertices, faces, loose edges and
//!   a world transform
//! - [`Vertex`] - A local-space position
//! - [`AxisFrame`] / [`Axis`] - Which world axis is heel-to-toe, left/right and up
//! - [`Transform3D`] - Affine object-to-world transform
//! - [`Aabb`] - Axis-aligned bounds
//!
//! # Layer 0
//!
//! This is a Layer 0 crate with zero Bevy dependencies.
//!
//! # Units
//!
//! Coordinates are `f64` millimetres, as delivered by the scanner.
//!
//! # Coordinate System
//!
//! By default the foot lies with the toe towards +Y, the sole on the XY plane
//! and +Z up ([`AxisFrame::FOOT`]). Scans in other orientations can derive a
//! frame from their bounds with [`ScanMesh::orient_axes`].
//!
//! # Example
//!
//! ```
//! use insole_types::{ScanMesh, Point3, Vector3, Transform3D};
//!
//! let mut mesh = ScanMesh::from_positions(
//!     &[
//!         Point3::new(0.0, 0.0, 0.0),
//!         Point3::new(1.0, 0.0, 0.0),
//!         Point3::new(0.5, 1.0, 0.0),
//!     ],
//!     vec![[0, 1, 2]],
//! )
//! .with_transform(Transform3D::translation(Vector3::new(0.0, 0.0, 2.0)));
//!
//! assert_eq!(mesh.world_position(0), Point3::new(0.0, 0.0, 2.0));
//! mesh.apply_transform();
//! assert_eq!(mesh.vertices[0].position.z, 2.0);
//! ```

#![warn(missing_docs)]
#![cfg_attr(not(test), deny(clippy::unwrap_used, clippy::expect_used))]

mod axis;
mod bounds;
mod mesh;
mod transform;
mod vertex;

pub use axis::{Axis, AxisFrame};
pub use bounds::Aabb;
pub use mesh::ScanMesh;
pub use transform::Transform3D;
pub use vertex::Vertex;

pub use nalgebra::{Matrix4, Point3, Vector3};
