//! Outline templates, side detection and control rigs for insoles.
//!
//! Once a scan has been cleaned up this crate turns it into something a user
//! can shape by hand:
//!
//! - [`classify_side`]: is this a left or a right foot?
//! - [`fit_curve`] / [`fit_outline`]: place the stored outline
//!   ([`CurveTemplate::right_foot`], mirrored for a left foot) over the
//!   scan's footprint
//! - [`build_front_rig`]: a free-form deformation cage with three toe
//!   anchors for reshaping the forefoot
//! - [`CurveRig`]: one anchor per outline control point
//!
//! # Layer 0
//!
//! This is a Layer 0 crate with zero Bevy dependencies.
//!
//! # Template frame
//!
//! Templates are authored with X lateral, Y heel-to-toe and Z up, in
//! millimetres. Fitting maps them onto whatever [`AxisFrame`] the scan uses.
//!
//! # Example
//!
//! ```
//! use insole_types::{ScanMesh, Point3};
//! use insole_template::{classify_side, fit_outline, CurveRig};
//!
//! let mesh = ScanMesh::from_positions(
//!     &[
//!         Point3::new(-60.0, -130.0, 0.0),
//!         Point3::new(40.0, -130.0, 0.0),
//!         Point3::new(40.0, 140.0, 20.0),
//!         Point3::new(-60.0, 140.0, 0.0),
//!     ],
//!     vec![[0, 1, 2], [0, 2, 3]],
//! );
//!
//! let side = classify_side(&mesh).unwrap();
//! let outline = fit_outline(&mesh, side).unwrap();
//! let rig = CurveRig::build(&outline.curve);
//! assert_eq!(rig.anchors().len(), 8);
//! ```
//!
//! [`AxisFrame`]: insole_types::AxisFrame

#![warn(missing_docs)]
#![cfg_attr(not(test), deny(clippy::unwrap_used, clippy::expect_used))]

mod curve;
mod error;
mod fit;
mod laterality;
mod rig;
mod template;

pub use curve::{ControlPoint, Handle, HandleKind, OutlineCurve};
pub use error::{TemplateError, TemplateResult};
pub use fit::{FIT_SAMPLES_PER_SEGMENT, FittedOutline, fit_curve, fit_outline};
pub use laterality::{Laterality, classify_side};
pub use rig::{
    Anchor, CAGE_LATERAL, CAGE_LONGITUDINAL, CAGE_VERTICAL, CageRegion, CurveRig, FrontRig,
    HandleSide, build_front_rig,
};
pub use template::CurveTemplate;
