//! Foot-scan to insole geometry pipeline.
//!
//! This umbrella crate re-exports the `insole-*` crates and adds
//! [`InsoleSession`], which carries a scan through the whole workflow with
//! one set of [`InsoleParams`]. All crates are Layer 0 (zero Bevy
//! dependencies).
//!
//! # Quick Start
//!
//! ```
//! use insole::prelude::*;
//!
//! let mut positions = Vec::new();
//! let mut faces = Vec::new();
//! for j in 0..=24u32 {
//!     for i in 0..=6u32 {
//!         let y = f64::from(j) * 10.0;
//!         positions.push(Point3::new(f64::from(i) * 12.0, y, (y / 50.0).cos() * 4.0));
//!         if i < 6 && j < 24 {
//!             let v = j * 7 + i;
//!             faces.push([v, v + 1, v + 8]);
//!             faces.push([v, v + 8, v + 7]);
//!         }
//!     }
//! }
//!
//! let mut session = InsoleSession::new(ScanMesh::from_positions(&positions, faces));
//! session.cleanup().unwrap();
//! session.smooth().unwrap();
//!
//! let preview = session.preview(ZoneFamily::Front).unwrap();
//! assert!(preview.count(Zone::Flat) > 0);
//!
//! session.flatten_front().unwrap();
//! session.set_twist_zone(Zone::Flat);
//! session.twist(0.05).unwrap();
//! let side = session.detect_side().unwrap();
//! let outline = session.fit_outline().unwrap();
//! assert_eq!(outline.side, side);
//! session.extrude_base().unwrap();
//! ```
//!
//! # Module Organization
//!
//! - [`types`]: `ScanMesh`, `AxisFrame`, `Transform3D`, `Aabb`
//! - [`zones`]: flat/mid/original and heel/heel-mid/non-heel classification
//! - [`morph`]: falloff flatten and twist, Laplacian smoothing
//! - [`repair`]: component pruning, boundary tracing, hole filling, base
//!   extrusion
//! - [`template`]: side detection, outline fitting, control rigs

#![warn(missing_docs)]
#![cfg_attr(not(test), deny(clippy::unwrap_used, clippy::expect_used))]

mod error;
mod params;
mod session;

pub use error::{InsoleError, InsoleResult};
pub use params::InsoleParams;
pub use session::InsoleSession;

// =============================================================================
// Re-exports
// =============================================================================

/// Core data structures.
pub use insole_types as types;

/// Longitudinal zone classification.
pub use insole_zones as zones;

/// Flatten, twist and smoothing.
pub use insole_morph as morph;

/// Pruning, boundary loops, hole filling, base extrusion.
pub use insole_repair as repair;

/// Laterality, outline templates and rigs.
pub use insole_template as template;

/// Common imports.
///
/// ```
/// use insole::prelude::*;
/// ```
pub mod prelude {
    // Core types
    pub use insole_types::{Aabb, Axis, AxisFrame, Point3, ScanMesh, Transform3D, Vector3};

    // Zones
    pub use insole_zones::{Zone, ZoneFamily, ZoneParams};

    // Pipeline
    pub use crate::{InsoleError, InsoleParams, InsoleResult, InsoleSession};

    // Outline
    pub use insole_template::{CageRegion, Laterality};
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reexports_resolve() {
        let _ = types::ScanMesh::new();
        let _ = zones::ZoneParams::default();
        let _ = morph::SmoothParams::default();
        let _ = repair::TraceParams::default();
        let _ = template::CurveTemplate::right_foot();
    }
}
