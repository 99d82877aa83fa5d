//! Longitudinal zone classification for foot-scan meshes.
//!
//! A foot scan is split along its heel-to-toe axis into two independent
//! three-way partitions driven by [`ZoneParams`]:
//!
//! - **Front**: `flat` (toe region to be flattened), `mid` (blend band),
//!   `original` (untouched)
//! - **Heel**: `heel`, `heel_mid` (blend band), `non_heel`
//!
//! [`classify`] returns the members of one zone plus the anchor vertex the
//! deformer reads its reference height from. [`recompute_preview`] labels
//! every vertex at once for display after a parameter edit.
//!
//! # Layer 0
//!
//! This is a Layer 0 crate with zero Bevy dependencies.
//!
//! # Example
//!
//! ```
//! use insole_types::{ScanMesh, Point3};
//! use insole_zones::{classify, Zone, ZoneParams};
//!
//! let positions: Vec<Point3<f64>> =
//!     (0..100).map(|i| Point3::new(0.0, f64::from(i), 0.0)).collect();
//! let mesh = ScanMesh::from_positions(&positions, Vec::new());
//!
//! let params = ZoneParams::default().with_heel_area(0.1);
//! let heel = classify(&mesh, &params, Zone::Heel).unwrap();
//! assert_eq!(heel.anchor, 0);
//! assert!(heel.vertices.iter().all(|&v| v < 10));
//! ```

#![warn(missing_docs)]
#![cfg_attr(not(test), deny(clippy::unwrap_used, clippy::expect_used))]

mod classify;
mod error;
mod params;
mod preview;
mod zone;

pub use classify::{classify, ZoneCuts, ZoneSelection};
pub use error::{ZoneError, ZoneResult};
pub use params::ZoneParams;
pub use preview::{recompute_preview, ZonePreview};
pub use zone::{Zone, ZoneFamily};
