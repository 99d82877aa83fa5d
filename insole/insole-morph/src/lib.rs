//! Falloff-weighted deformation of foot-scan zones.
//!
//! This crate shapes the zones produced by `insole-zones`:
//!
//! - **Flatten**: press the toe zone onto the scan's floor so the forefoot of
//!   the insole is flat ([`deform`] with [`Deformation::Flatten`],
//!   [`flatten_zone`])
//! - **Twist**: rotate a zone about the lateral (or longitudinal) axis,
//!   converging on a target angle across repeated requests ([`TwistSession`])
//! - **Smooth**: Laplacian relaxation of scanner noise ([`smooth_laplacian`])
//!
//! Every effect fades out beyond the zone with a smoothstep falloff so no
//! seam appears at the zone boundary (see [`falloff_weight`]).
//!
//! # Layer 0
//!
//! This is a Layer 0 crate with zero Bevy dependencies.
//!
//! # Atomicity
//!
//! Operations take `&ScanMesh` and return a new mesh in their output. On
//! error nothing has been written anywhere.
//!
//! # Example
//!
//! ```
//! use insole_types::{ScanMesh, Point3};
//! use insole_zones::ZoneParams;
//! use insole_morph::flatten_zone;
//!
//! let positions: Vec<Point3<f64>> = (0..=40)
//!     .map(|i| Point3::new(0.0, f64::from(i), (f64::from(i) / 8.0).sin()))
//!     .collect();
//! let mesh = ScanMesh::from_positions(&positions, Vec::new());
//!
//! let out = flatten_zone(&mesh, &ZoneParams::default()).unwrap();
//! assert!(out.vertices_modified > 0);
//! ```

#![warn(missing_docs)]
#![cfg_attr(not(test), deny(clippy::unwrap_used, clippy::expect_used))]

mod deform;
mod error;
mod falloff;
mod result;
mod smooth;

pub use deform::{Deformation, TwistAxis, TwistSession, deform, flatten_zone};
pub use error::{MorphError, MorphResult};
pub use falloff::{Falloff, falloff_weight, smoothstep};
pub use result::DeformOutput;
pub use smooth::{SmoothOutput, SmoothParams, smooth_laplacian};
