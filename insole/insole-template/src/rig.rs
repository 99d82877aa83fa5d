//! Control rigs: handles a user drags to reshape the insole.
//!
//! Two rigs exist:
//!
//! - [`FrontRig`]: a 3×4×2 free-form deformation cage over the scan. Three
//!   anchors (left, centre, right) each drive a pair of cage points at the
//!   toe end; the mesh follows through Bernstein-weighted cage displacement,
//!   so the heel stays put and the effect grows towards the toe.
//! - [`CurveRig`]: one anchor per outline control point. Moving an anchor
//!   moves the point together with its handles.

use std::fmt;
use std::str::FromStr;

use insole_types::{Aabb, Axis, AxisFrame, Point3, ScanMesh, Vector3};
use insole_zones::{Zone, ZoneParams, classify};
use tracing::{debug, info};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::{ControlPoint, OutlineCurve, TemplateError, TemplateResult};

/// Cage resolution across the foot.
pub const CAGE_LATERAL: usize = 3;
/// Cage resolution along the foot.
pub const CAGE_LONGITUDINAL: usize = 4;
/// Cage resolution vertically.
pub const CAGE_VERTICAL: usize = 2;

/// A draggable handle bound to a set of rig points.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Anchor {
    /// Anchor name.
    pub name: String,
    /// Current world position.
    pub position: Point3<f64>,
    /// Indices of the rig points the anchor drives.
    pub bound: Vec<usize>,
}

/// The three anchor groups of the front cage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum CageRegion {
    /// Toe end, lateral minimum.
    Left,
    /// Toe end, middle column.
    Center,
    /// Toe end, lateral maximum.
    Right,
}

impl CageRegion {
    /// All regions in anchor order.
    pub const ALL: [Self; 3] = [Self::Left, Self::Center, Self::Right];

    /// Region name.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Left => "left",
            Self::Center => "center",
            Self::Right => "right",
        }
    }

    /// Cage points driven by the region, bottom then top.
    #[must_use]
    pub const fn points(self) -> [usize; 2] {
        match self {
            Self::Left => [9, 21],
            Self::Center => [10, 22],
            Self::Right => [11, 23],
        }
    }

    const fn slot(self) -> usize {
        match self {
            Self::Left => 0,
            Self::Center => 1,
            Self::Right => 2,
        }
    }
}

impl fmt::Display for CageRegion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for CageRegion {
    type Err = TemplateError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|r| r.name() == s)
            .ok_or_else(|| TemplateError::UnknownAnchor(s.to_string()))
    }
}

/// Free-form deformation cage over the toe end of a scan.
///
/// Cage point `u + 3 v + 12 w` sits at lateral step `u`, longitudinal step
/// `v` (0 at the heel) and vertical step `w` (0 at the sole), all in world
/// space.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct FrontRig {
    bounds: Aabb,
    axes: AxisFrame,
    rest: Vec<Point3<f64>>,
    points: Vec<Point3<f64>>,
    anchors: Vec<Anchor>,
}

/// Build the front cage for `mesh`.
///
/// The cage spans the scan's world bounds. Its rear face is placed on the
/// heel anchor found with `zone_params`.
///
/// # Errors
///
/// Returns [`TemplateError::EmptyMesh`] for an empty mesh and
/// [`TemplateError::Zone`] if `zone_params` are invalid.
///
/// # Example
///
/// ```
/// use insole_types::{ScanMesh, Point3, Vector3};
/// use insole_zones::ZoneParams;
/// use insole_template::{build_front_rig, CageRegion};
///
/// let positions: Vec<Point3<f64>> = (0..=10)
///     .flat_map(|j| [-20.0, 20.0].map(|x| Point3::new(x, f64::from(j) * 20.0, 0.0)))
///     .collect();
/// let mesh = ScanMesh::from_positions(&positions, Vec::new());
///
/// let mut rig = build_front_rig(&mesh, &ZoneParams::default()).unwrap();
/// let toe = rig.anchor(CageRegion::Right).position;
/// rig.move_anchor(CageRegion::Right, toe + Vector3::new(0.0, 0.0, 8.0));
///
/// let bent = rig.apply(&mesh).unwrap();
/// assert!((bent.vertices[21].position.z - 8.0).abs() < 1e-9);
/// assert_eq!(bent.vertices[0].position.z, 0.0);
/// ```
pub fn build_front_rig(mesh: &ScanMesh, zone_params: &ZoneParams) -> TemplateResult<FrontRig> {
    FrontRig::build(mesh, zone_params)
}

impl FrontRig {
    /// See [`build_front_rig`].
    ///
    /// # Errors
    ///
    /// See [`build_front_rig`].
    pub fn build(mesh: &ScanMesh, zone_params: &ZoneParams) -> TemplateResult<Self> {
        if mesh.is_empty() {
            return Err(TemplateError::EmptyMesh);
        }
        let heel = classify(mesh, zone_params, Zone::Heel)?;

        let axes = mesh.axes;
        let mut bounds = mesh.world_bounds();
        let long = axes.longitudinal;
        let length = bounds.extent(long);
        let rear = long.of(&mesh.world_position(heel.anchor as usize));
        bounds.min[long.index()] = rear;
        bounds.max[long.index()] = rear + length;

        let rest = cage_points(&bounds, axes);
        let points = rest.clone();
        let anchors = CageRegion::ALL
            .into_iter()
            .map(|region| Anchor {
                name: region.name().to_string(),
                position: centroid(&points, &region.points()),
                bound: region.points().to_vec(),
            })
            .collect();

        info!(rear, length, heel_anchor = heel.anchor, "Built front cage");
        Ok(Self {
            bounds,
            axes,
            rest,
            points,
            anchors,
        })
    }

    /// World-space bounds of the undeformed cage.
    #[must_use]
    pub const fn bounds(&self) -> &Aabb {
        &self.bounds
    }

    /// Current cage points.
    #[must_use]
    pub fn points(&self) -> &[Point3<f64>] {
        &self.points
    }

    /// Cage points before any anchor moved.
    #[must_use]
    pub fn rest_points(&self) -> &[Point3<f64>] {
        &self.rest
    }

    /// All anchors in [`CageRegion::ALL`] order.
    #[must_use]
    pub fn anchors(&self) -> &[Anchor] {
        &self.anchors
    }

    /// The anchor of `region`.
    #[must_use]
    pub fn anchor(&self, region: CageRegion) -> &Anchor {
        &self.anchors[region.slot()]
    }

    /// Drag the anchor of `region` to `position`; its cage points follow.
    pub fn move_anchor(&mut self, region: CageRegion, position: Point3<f64>) {
        let anchor = &mut self.anchors[region.slot()];
        let delta = position - anchor.position;
        anchor.position = position;
        for &i in &anchor.bound {
            self.points[i] += delta;
        }
        debug!(%region, dx = delta.x, dy = delta.y, dz = delta.z, "Moved cage anchor");
    }

    /// Drag an anchor by name.
    ///
    /// # Errors
    ///
    /// Returns [`TemplateError::UnknownAnchor`] if no region has that name.
    pub fn move_anchor_named(&mut self, name: &str, position: Point3<f64>) -> TemplateResult<()> {
        let region = name.parse::<CageRegion>()?;
        self.move_anchor(region, position);
        Ok(())
    }

    /// Put every anchor and cage point back at rest.
    pub fn reset(&mut self) {
        self.points.clone_from(&self.rest);
        for region in CageRegion::ALL {
            self.anchors[region.slot()].position = centroid(&self.rest, &region.points());
        }
    }

    /// Whether any cage point has moved.
    #[must_use]
    pub fn is_deformed(&self) -> bool {
        self.points.iter().zip(&self.rest).any(|(p, r)| p != r)
    }

    /// Deform `mesh` through the cage.
    ///
    /// Each vertex is displaced by the Bernstein-weighted sum of cage point
    /// displacements at its normalised cage coordinates (clamped to the
    /// cage). Displacement happens in world space and is mapped back through
    /// the mesh transform.
    ///
    /// # Errors
    ///
    /// Returns [`TemplateError::SingularTransform`] if the mesh transform has
    /// no inverse.
    pub fn apply(&self, mesh: &ScanMesh) -> TemplateResult<ScanMesh> {
        let inverse = mesh
            .transform
            .inverse()
            .ok_or(TemplateError::SingularTransform)?;
        let offsets: Vec<Vector3<f64>> = self
            .points
            .iter()
            .zip(&self.rest)
            .map(|(p, r)| p - r)
            .collect();

        let mut out = mesh.clone();
        let mut moved = 0usize;
        for (i, vertex) in out.vertices.iter_mut().enumerate() {
            let world = mesh.world_position(i);
            let displacement = self.displacement_at(&world, &offsets);
            if displacement.norm() > 1e-12 {
                vertex.position = inverse.transform_point(&(world + displacement));
                moved += 1;
            }
        }

        debug!(moved, "Applied front cage");
        Ok(out)
    }

    fn displacement_at(&self, world: &Point3<f64>, offsets: &[Vector3<f64>]) -> Vector3<f64> {
        let s = self.param(self.axes.lateral, world);
        let t = self.param(self.axes.longitudinal, world);
        let r = self.param(self.axes.vertical, world);

        let mut sum = Vector3::zeros();
        for w in 0..CAGE_VERTICAL {
            let bw = bernstein(CAGE_VERTICAL - 1, w, r);
            for v in 0..CAGE_LONGITUDINAL {
                let bv = bernstein(CAGE_LONGITUDINAL - 1, v, t);
                for u in 0..CAGE_LATERAL {
                    let bu = bernstein(CAGE_LATERAL - 1, u, s);
                    sum += offsets[cage_index(u, v, w)] * (bu * bv * bw);
                }
            }
        }
        sum
    }

    fn param(&self, axis: Axis, world: &Point3<f64>) -> f64 {
        let extent = self.bounds.extent(axis);
        if extent > 1e-10 {
            ((axis.of(world) - self.bounds.min_along(axis)) / extent).clamp(0.0, 1.0)
        } else {
            0.5
        }
    }
}

const fn cage_index(u: usize, v: usize, w: usize) -> usize {
    u + v * CAGE_LATERAL + w * CAGE_LATERAL * CAGE_LONGITUDINAL
}

#[allow(clippy::cast_precision_loss)]
fn cage_points(bounds: &Aabb, axes: AxisFrame) -> Vec<Point3<f64>> {
    let step = |n: usize, i: usize| i as f64 / (n - 1) as f64;
    let mut points = Vec::with_capacity(CAGE_LATERAL * CAGE_LONGITUDINAL * CAGE_VERTICAL);
    for w in 0..CAGE_VERTICAL {
        for v in 0..CAGE_LONGITUDINAL {
            for u in 0..CAGE_LATERAL {
                let mut p = bounds.min;
                for (axis, n, i) in [
                    (axes.lateral, CAGE_LATERAL, u),
                    (axes.longitudinal, CAGE_LONGITUDINAL, v),
                    (axes.vertical, CAGE_VERTICAL, w),
                ] {
                    p[axis.index()] += bounds.extent(axis) * step(n, i);
                }
                points.push(p);
            }
        }
    }
    points
}

#[allow(clippy::cast_precision_loss)]
fn centroid(points: &[Point3<f64>], indices: &[usize]) -> Point3<f64> {
    let sum = indices
        .iter()
        .fold(Vector3::zeros(), |acc, &i| acc + points[i].coords);
    Point3::from(sum / indices.len().max(1) as f64)
}

/// Bernstein basis polynomial `B(n, i)` at `t`.
#[allow(
    clippy::cast_possible_truncation,
    clippy::cast_possible_wrap,
    clippy::cast_precision_loss
)]
fn bernstein(n: usize, i: usize, t: f64) -> f64 {
    if i > n {
        return 0.0;
    }
    let coeff = (0..i).fold(1usize, |c, k| c * (n - k) / (k + 1));
    coeff as f64 * t.powi(i as i32) * (1.0 - t).powi((n - i) as i32)
}

/// One anchor per outline control point.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct CurveRig {
    curve: OutlineCurve,
    anchors: Vec<Anchor>,
}

/// Which handle of a control point to edit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HandleSide {
    /// Incoming handle.
    Left,
    /// Outgoing handle.
    Right,
}

impl CurveRig {
    /// Hook every control point of `curve`.
    #[must_use]
    pub fn build(curve: &OutlineCurve) -> Self {
        let anchors = curve
            .points
            .iter()
            .enumerate()
            .map(|(i, p)| Anchor {
                name: format!("hook.{i:03}"),
                position: p.position,
                bound: vec![i],
            })
            .collect();
        debug!(points = curve.len(), "Built curve rig");
        Self {
            curve: curve.clone(),
            anchors,
        }
    }

    /// The rigged curve.
    #[must_use]
    pub const fn curve(&self) -> &OutlineCurve {
        &self.curve
    }

    /// Consume the rig, returning its curve.
    #[must_use]
    pub fn into_curve(self) -> OutlineCurve {
        self.curve
    }

    /// Anchors in control point order.
    #[must_use]
    pub fn anchors(&self) -> &[Anchor] {
        &self.anchors
    }

    /// Drag anchor `index` to `position`, carrying its point and handles.
    ///
    /// # Errors
    ///
    /// Returns [`TemplateError::UnknownAnchor`] if `index` is out of range.
    pub fn move_anchor(&mut self, index: usize, position: Point3<f64>) -> TemplateResult<()> {
        let anchor = self
            .anchors
            .get_mut(index)
            .ok_or_else(|| TemplateError::UnknownAnchor(index.to_string()))?;
        let delta = position - anchor.position;
        anchor.position = position;
        for &i in &anchor.bound {
            self.curve.points[i].translate(&delta);
        }
        Ok(())
    }

    /// Edit one handle of control point `index`.
    ///
    /// Aligned opposite handles turn to stay collinear.
    ///
    /// # Errors
    ///
    /// Returns [`TemplateError::UnknownAnchor`] if `index` is out of range.
    pub fn set_handle(
        &mut self,
        index: usize,
        side: HandleSide,
        offset: Vector3<f64>,
    ) -> TemplateResult<()> {
        let point: &mut ControlPoint = self
            .curve
            .points
            .get_mut(index)
            .ok_or_else(|| TemplateError::UnknownAnchor(index.to_string()))?;
        match side {
            HandleSide::Left => point.set_left(offset),
            HandleSide::Right => point.set_right(offset),
        }
        Ok(())
    }
}
