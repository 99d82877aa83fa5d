//! Falloff-weighted flatten and twist.

use insole_types::{Axis, AxisFrame, Point3, ScanMesh, Transform3D, Vector3};
use insole_zones::{Zone, ZoneFamily, ZoneParams, ZoneSelection, classify};
use rayon::prelude::*;
use tracing::{debug, info};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::error::{MorphError, MorphResult};
use crate::falloff::Falloff;
use crate::result::DeformOutput;

/// Vertex count above which per-vertex work runs on the rayon pool.
const PARALLEL_THRESHOLD: usize = 1000;

/// Anatomical axis a twist rotates about.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum TwistAxis {
    /// Left/right axis: pitches the zone up or down.
    #[default]
    Lateral,
    /// Heel-to-toe axis: rolls the zone inward or outward.
    Longitudinal,
}

impl TwistAxis {
    /// World axis for a given frame.
    #[must_use]
    pub const fn resolve(self, frame: &AxisFrame) -> Axis {
        match self {
            Self::Lateral => frame.lateral,
            Self::Longitudinal => frame.longitudinal,
        }
    }
}

/// A deformation applied to one zone.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Deformation {
    /// Press the zone onto the ground plane.
    Flatten,
    /// Rotate the zone by `angle` radians about `axis` through its centroid.
    Twist {
        /// Rotation angle in radians.
        angle: f64,
        /// Rotation axis.
        axis: TwistAxis,
    },
}

/// Apply `operation` to `region` with smooth falloff.
///
/// The falloff fades the effect out over `falloff_radius` beyond the region's
/// longitudinal span.
///
/// Flatten scales the vertical coordinate of every weighted vertex toward the
/// anchor height `h` (`v' = h + (v - h)(1 - w)`), then lowers the region by
/// `w * (m - h)` where `m` is the lowest vertical coordinate after scaling,
/// so the pressed zone meets the global floor of the scan.
///
/// # Errors
///
/// - [`MorphError::EmptyMesh`] if the mesh has no vertices
/// - [`MorphError::EmptyRegion`] if the region has no vertices
/// - [`MorphError::InvalidParameter`] for a negative or non-finite radius or
///   angle
/// - [`MorphError::InvalidVertexIndex`] if the region does not belong to `mesh`
///
/// # Example
///
/// ```
/// use insole_types::{ScanMesh, Point3};
/// use insole_zones::{classify, Zone, ZoneParams};
/// use insole_morph::{deform, Deformation};
///
/// // A ramp rising towards the toe.
/// let positions: Vec<Point3<f64>> = (0..=10)
///     .map(|i| Point3::new(0.0, f64::from(i), f64::from(i)))
///     .collect();
/// let mesh = ScanMesh::from_positions(&positions, Vec::new());
///
/// let flat = classify(&mesh, &ZoneParams::default(), Zone::Flat).unwrap();
/// let out = deform(&mesh, &flat, Deformation::Flatten, 0.0).unwrap();
///
/// // The toe lands on the floor; the heel is untouched.
/// assert_eq!(out.mesh.vertices[10].position.z, 0.0);
/// assert_eq!(out.mesh.vertices[0].position.z, 0.0);
/// assert_eq!(out.mesh.vertices[5].position.z, 5.0);
/// ```
pub fn deform(
    mesh: &ScanMesh,
    region: &ZoneSelection,
    operation: Deformation,
    falloff_radius: f64,
) -> MorphResult<DeformOutput> {
    validate(mesh, region, falloff_radius)?;

    let falloff = Falloff::around(mesh, region, falloff_radius)
        .ok_or(MorphError::EmptyRegion { zone: region.zone })?;
    let weights = weights(mesh, &falloff);

    let positions = match operation {
        Deformation::Flatten => flatten(mesh, region.anchor as usize, &weights),
        Deformation::Twist { angle, axis } => {
            if !angle.is_finite() {
                return Err(MorphError::InvalidParameter {
                    name: "angle",
                    value: angle,
                });
            }
            if angle == 0.0 {
                return Ok(DeformOutput::unchanged(mesh.clone()));
            }
            twist(mesh, region, angle, axis, &weights)
        }
    };

    let mut deformed = mesh.clone();
    for (v, p) in deformed.vertices.iter_mut().zip(positions) {
        v.position = p;
    }
    let out = DeformOutput::measure(mesh, deformed);

    info!(
        zone = %region.zone,
        ?operation,
        vertices_modified = out.vertices_modified,
        max_displacement = out.max_displacement,
        "deformed zone"
    );
    Ok(out)
}

/// Classify the `flat` zone and press it onto the floor, fading over
/// `extent * params.falloff`.
///
/// # Errors
///
/// Classification errors, or [`MorphError::EmptyRegion`] if the flat zone is
/// empty.
pub fn flatten_zone(mesh: &ScanMesh, params: &ZoneParams) -> MorphResult<DeformOutput> {
    let flat = classify(mesh, params, Zone::Flat)?;
    let radius = flat.cuts.extent * params.falloff;
    deform(mesh, &flat, Deformation::Flatten, radius)
}

/// Tracks the angle already applied to one zone so that repeated twist
/// requests converge on a target instead of accumulating.
///
/// Changing the target zone resets the applied angle to zero.
///
/// # Example
///
/// ```
/// use insole_types::{ScanMesh, Point3};
/// use insole_zones::{Zone, ZoneParams};
/// use insole_morph::TwistSession;
///
/// let positions: Vec<Point3<f64>> =
///     (0..=10).map(|i| Point3::new(0.0, f64::from(i), 0.0)).collect();
/// let mesh = ScanMesh::from_positions(&positions, Vec::new());
///
/// let mut session = TwistSession::default();
/// let params = ZoneParams::default();
/// let first = session.twist_zone(&mesh, &params, Zone::Flat, 0.2).unwrap();
/// let second = session.twist_zone(&first.mesh, &params, Zone::Flat, 0.2).unwrap();
/// assert!(second.is_noop());
/// assert_eq!(session.cumulative_angle(), 0.2);
/// ```
#[derive(Debug, Clone, Default)]
pub struct TwistSession {
    zone: Option<Zone>,
    cumulative: f64,
    axis: TwistAxis,
}

impl TwistSession {
    /// A fresh session rotating about `axis`.
    #[must_use]
    pub const fn new(axis: TwistAxis) -> Self {
        Self {
            zone: None,
            cumulative: 0.0,
            axis,
        }
    }

    /// Zone the cumulative angle refers to.
    #[must_use]
    pub const fn zone(&self) -> Option<Zone> {
        self.zone
    }

    /// Angle applied so far to the current zone.
    #[must_use]
    pub const fn cumulative_angle(&self) -> f64 {
        self.cumulative
    }

    /// Rotation axis.
    #[must_use]
    pub const fn axis(&self) -> TwistAxis {
        self.axis
    }

    /// Retarget the session, resetting the applied angle if the zone changes.
    pub fn set_zone(&mut self, zone: Zone) {
        if self.zone != Some(zone) {
            debug!(from = ?self.zone, to = %zone, "twist zone changed, resetting angle");
            self.zone = Some(zone);
            self.cumulative = 0.0;
        }
    }

    /// Forget the current zone and applied angle.
    pub fn reset(&mut self) {
        self.zone = None;
        self.cumulative = 0.0;
    }

    /// Rotate `region` so that its total applied angle becomes `target`.
    ///
    /// The session state only changes when the deformation succeeds.
    ///
    /// # Errors
    ///
    /// Same conditions as [`deform`].
    pub fn twist(
        &mut self,
        mesh: &ScanMesh,
        region: &ZoneSelection,
        target: f64,
        falloff_radius: f64,
    ) -> MorphResult<DeformOutput> {
        let applied = if self.zone == Some(region.zone) {
            self.cumulative
        } else {
            0.0
        };
        let delta = target - applied;
        debug!(zone = %region.zone, target, applied, delta, "twist request");

        let out = deform(
            mesh,
            region,
            Deformation::Twist {
                angle: delta,
                axis: self.axis,
            },
            falloff_radius,
        )?;

        self.zone = Some(region.zone);
        self.cumulative = target;
        Ok(out)
    }

    /// Classify `zone` and twist it to `target`.
    ///
    /// Front zones fade over `extent * params.falloff`, heel zones over
    /// `extent * params.heel_falloff`.
    ///
    /// # Errors
    ///
    /// Classification errors, or the conditions of [`deform`].
    pub fn twist_zone(
        &mut self,
        mesh: &ScanMesh,
        params: &ZoneParams,
        zone: Zone,
        target: f64,
    ) -> MorphResult<DeformOutput> {
        let region = classify(mesh, params, zone)?;
        let fraction = match zone.family() {
            ZoneFamily::Front => params.falloff,
            ZoneFamily::Heel => params.heel_falloff,
        };
        self.twist(mesh, &region, target, region.cuts.extent * fraction)
    }
}

fn validate(mesh: &ScanMesh, region: &ZoneSelection, falloff_radius: f64) -> MorphResult<()> {
    if mesh.is_empty() {
        return Err(MorphError::EmptyMesh);
    }
    if region.is_empty() {
        return Err(MorphError::EmptyRegion { zone: region.zone });
    }
    if !falloff_radius.is_finite() || falloff_radius < 0.0 {
        return Err(MorphError::InvalidParameter {
            name: "falloff_radius",
            value: falloff_radius,
        });
    }
    let vertex_count = mesh.vertex_count();
    if let Some(&index) = region
        .vertices
        .iter()
        .chain(std::iter::once(&region.anchor))
        .find(|&&v| v as usize >= vertex_count)
    {
        return Err(MorphError::InvalidVertexIndex {
            index,
            vertex_count,
        });
    }
    Ok(())
}

fn weights(mesh: &ScanMesh, falloff: &Falloff) -> Vec<f64> {
    let long = mesh.axes.longitudinal;
    if mesh.vertex_count() > PARALLEL_THRESHOLD {
        mesh.vertices
            .par_iter()
            .map(|v| falloff.weight(long.of(&v.position)))
            .collect()
    } else {
        mesh.vertices
            .iter()
            .map(|v| falloff.weight(long.of(&v.position)))
            .collect()
    }
}

fn flatten(mesh: &ScanMesh, anchor: usize, weights: &[f64]) -> Vec<Point3<f64>> {
    let up = mesh.axes.vertical.index();
    let h = mesh.vertices[anchor].position[up];

    let mut positions: Vec<Point3<f64>> = mesh
        .vertices
        .iter()
        .zip(weights)
        .map(|(v, &w)| {
            let mut p = v.position;
            p[up] = h + (p[up] - h) * (1.0 - w);
            p
        })
        .collect();

    let floor = positions
        .iter()
        .map(|p| p[up])
        .fold(f64::INFINITY, f64::min);
    let drop = floor - h;
    debug!(anchor_height = h, floor, "flatten");

    for (p, &w) in positions.iter_mut().zip(weights) {
        p[up] += w * drop;
    }
    positions
}

#[allow(clippy::cast_precision_loss)]
fn twist(
    mesh: &ScanMesh,
    region: &ZoneSelection,
    angle: f64,
    axis: TwistAxis,
    weights: &[f64],
) -> Vec<Point3<f64>> {
    let sum = region
        .vertices
        .iter()
        .fold(Vector3::zeros(), |acc, &v| {
            acc + mesh.vertices[v as usize].position.coords
        });
    let pivot = Point3::from(sum / region.len() as f64);
    let direction = axis.resolve(&mesh.axes).unit();

    let rotate = |p: &Point3<f64>, w: f64| {
        if w == 0.0 {
            *p
        } else {
            Transform3D::rotation_about(&pivot, direction, w * angle).transform_point(p)
        }
    };

    if mesh.vertex_count() > PARALLEL_THRESHOLD {
        mesh.vertices
            .par_iter()
            .zip(weights.par_iter())
            .map(|(v, &w)| rotate(&v.position, w))
            .collect()
    } else {
        mesh.vertices
            .iter()
            .zip(weights)
            .map(|(v, &w)| rotate(&v.position, w))
            .collect()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::cast_precision_loss)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use insole_types::Vertex;
    use insole_zones::ZoneError;

    /// Ramp along Y rising in Z, `n + 1` vertices.
    fn ramp(n: u32) -> ScanMesh {
        let positions: Vec<Point3<f64>> = (0..=n)
            .map(|i| Point3::new(0.0, f64::from(i), f64::from(i) * 0.5 + 1.0))
            .collect();
        ScanMesh::from_positions(&positions, Vec::new())
    }

    /// 40 x 40 grid in the XY plane with a bump near the toe.
    fn big_sheet() -> ScanMesh {
        let mut vertices = Vec::new();
        for j in 0..40 {
            for i in 0..40 {
                let (x, y) = (f64::from(i), f64::from(j));
                vertices.push(Vertex::from_coords(x, y, if j > 30 { 2.0 } else { 0.0 }));
            }
        }
        ScanMesh::from_parts(vertices, Vec::new())
    }

    #[test]
    fn flatten_hard_edge() {
        let mesh = ramp(20);
        let flat = classify(&mesh, &ZoneParams::default(), Zone::Flat).unwrap();
        let out = deform(&mesh, &flat, Deformation::Flatten, 0.0).unwrap();

        for &v in &flat.vertices {
            assert_relative_eq!(out.mesh.vertices[v as usize].position.z, 1.0);
        }
        assert_relative_eq!(out.mesh.vertices[10].position.z, 6.0);
        assert_eq!(out.vertices_modified, flat.len());
    }

    #[test]
    fn flatten_with_falloff_blends() {
        let mesh = ramp(20);
        let params = ZoneParams::default();
        let out = flatten_zone(&mesh, &params).unwrap();

        // Radius = 20 * 0.25 = 5: vertices 12..=15 are partially moved.
        let z = |i: usize| out.mesh.vertices[i].position.z;
        let original = |i: usize| mesh.vertices[i].position.z;
        assert_relative_eq!(z(20), 1.0);
        assert_relative_eq!(z(9), original(9));
        for i in 12..16 {
            assert!(z(i) < original(i));
            assert!(z(i) >= 1.0);
        }
    }

    #[test]
    fn flatten_large_mesh_in_parallel() {
        let mesh = big_sheet();
        assert!(mesh.vertex_count() > PARALLEL_THRESHOLD);
        let out = flatten_zone(&mesh, &ZoneParams::default().with_falloff(0.0)).unwrap();
        let max_z = out
            .mesh
            .vertices
            .iter()
            .map(|v| v.position.z)
            .fold(f64::NEG_INFINITY, f64::max);
        assert_relative_eq!(max_z, 0.0);
    }

    #[test]
    fn empty_region_is_rejected() {
        let mesh = ramp(4);
        let params = ZoneParams::default().with_flat_area(0.0);
        let flat = classify(&mesh, &params, Zone::Flat).unwrap();
        assert!(flat.is_empty());
        let err = deform(&mesh, &flat, Deformation::Flatten, 1.0).unwrap_err();
        assert!(matches!(err, MorphError::EmptyRegion { zone: Zone::Flat }));
    }

    #[test]
    fn negative_radius_is_rejected() {
        let mesh = ramp(4);
        let flat = classify(&mesh, &ZoneParams::default(), Zone::Flat).unwrap();
        let err = deform(&mesh, &flat, Deformation::Flatten, -1.0).unwrap_err();
        assert!(matches!(err, MorphError::InvalidParameter { name: "falloff_radius", .. }));
    }

    #[test]
    fn stale_region_is_rejected() {
        let flat = classify(&ramp(20), &ZoneParams::default(), Zone::Flat).unwrap();
        let err = deform(&ramp(4), &flat, Deformation::Flatten, 0.0).unwrap_err();
        assert!(matches!(err, MorphError::InvalidVertexIndex { .. }));
    }

    #[test]
    fn empty_mesh_propagates_zone_error() {
        let err = flatten_zone(&ScanMesh::new(), &ZoneParams::default()).unwrap_err();
        assert!(matches!(err, MorphError::Zone(ZoneError::EmptyMesh)));
    }

    #[test]
    fn twist_rotates_region_about_lateral_axis() {
        let mesh = ramp(20);
        let flat = classify(&mesh, &ZoneParams::default(), Zone::Flat).unwrap();
        let angle = 0.3;
        let out = deform(
            &mesh,
            &flat,
            Deformation::Twist {
                angle,
                axis: TwistAxis::Lateral,
            },
            0.0,
        )
        .unwrap();

        // Rotation about X preserves distance from the pivot line in YZ.
        let members: Vec<usize> = flat.vertices.iter().map(|&v| v as usize).collect();
        let pivot = members
            .iter()
            .fold(Vector3::zeros(), |acc, &i| acc + mesh.vertices[i].position.coords)
            / members.len() as f64;
        for &i in &members {
            let before = mesh.vertices[i].position.coords - pivot;
            let after = out.mesh.vertices[i].position.coords - pivot;
            assert_relative_eq!(before.norm(), after.norm(), epsilon = 1e-9);
            assert_relative_eq!(after.x, before.x, epsilon = 1e-12);
        }
        assert_eq!(out.mesh.vertices[0], mesh.vertices[0]);
    }

    #[test]
    fn twist_is_convergent() {
        let mesh = ramp(20);
        let params = ZoneParams::default();
        let mut session = TwistSession::default();

        let first = session.twist_zone(&mesh, &params, Zone::Flat, 0.25).unwrap();
        assert!(!first.is_noop());
        let second = session.twist_zone(&first.mesh, &params, Zone::Flat, 0.25).unwrap();
        assert!(second.is_noop());
        assert_eq!(second.mesh, first.mesh);
    }

    #[test]
    fn twist_applies_only_the_delta() {
        let mesh = ramp(20);
        let flat = classify(&mesh, &ZoneParams::default(), Zone::Flat).unwrap();
        let mut session = TwistSession::default();

        let a = session.twist(&mesh, &flat, 0.1, 0.0).unwrap();
        let b = session.twist(&a.mesh, &flat, 0.3, 0.0).unwrap();
        assert_relative_eq!(session.cumulative_angle(), 0.3);

        let mut direct = TwistSession::default();
        let c = direct.twist(&mesh, &flat, 0.3, 0.0).unwrap();
        for (p, q) in b.mesh.vertices.iter().zip(&c.mesh.vertices) {
            assert_relative_eq!(p.position, q.position, epsilon = 1e-9);
        }
    }

    #[test]
    fn changing_zone_resets_angle() {
        let mesh = ramp(20);
        let params = ZoneParams::default();
        let mut session = TwistSession::default();

        session.twist_zone(&mesh, &params, Zone::Flat, 0.2).unwrap();
        assert_eq!(session.zone(), Some(Zone::Flat));
        session.set_zone(Zone::Heel);
        assert_eq!(session.cumulative_angle(), 0.0);

        let out = session.twist_zone(&mesh, &params, Zone::Heel, 0.2).unwrap();
        assert!(!out.is_noop());
        assert_eq!(session.zone(), Some(Zone::Heel));
    }

    #[test]
    fn failed_twist_keeps_state() {
        let mesh = ramp(20);
        let mut session = TwistSession::default();
        session
            .twist_zone(&mesh, &ZoneParams::default(), Zone::Flat, 0.2)
            .unwrap();

        let empty = ZoneParams::default().with_flat_area(0.0);
        assert!(session.twist_zone(&mesh, &empty, Zone::Flat, 0.5).is_err());
        assert_eq!(session.cumulative_angle(), 0.2);
    }

    #[test]
    fn longitudinal_axis_keeps_length_coordinate() {
        let mesh = ScanMesh::from_positions(
            &[
                Point3::new(-1.0, 0.0, 0.0),
                Point3::new(1.0, 0.0, 0.0),
                Point3::new(-1.0, 10.0, 0.0),
                Point3::new(1.0, 10.0, 0.0),
            ],
            Vec::new(),
        );
        let mut session = TwistSession::new(TwistAxis::Longitudinal);
        let out = session
            .twist_zone(&mesh, &ZoneParams::default(), Zone::Flat, 0.5)
            .unwrap();
        for (a, b) in mesh.vertices.iter().zip(&out.mesh.vertices) {
            assert_relative_eq!(a.position.y, b.position.y, epsilon = 1e-12);
        }
        assert!(out.mesh.vertices[3].position.z.abs() > 0.1);
    }
}
