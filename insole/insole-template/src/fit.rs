//! Fitting an outline template onto a scan.

use insole_types::{Axis, Matrix4, ScanMesh, Transform3D, Vector3};
use tracing::{debug, info};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::{CurveTemplate, Laterality, OutlineCurve, TemplateError, TemplateResult};

/// Samples per Bézier segment used to measure curve bounds.
pub const FIT_SAMPLES_PER_SEGMENT: usize = 16;

/// Smallest extent either the template or the scan may have along a fitted
/// axis.
const MIN_EXTENT: f64 = 1e-6;

/// An outline placed over a scan.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct FittedOutline {
    /// The outline in world space.
    pub curve: OutlineCurve,
    /// The foot the outline was fitted for.
    pub side: Laterality,
    /// Scale applied across the foot.
    pub lateral_scale: f64,
    /// Scale applied along the foot.
    pub longitudinal_scale: f64,
    /// World vertical coordinate of the outline plane.
    pub height: f64,
}

/// Fit `template` to the world-space footprint of `mesh`.
///
/// The template is flattened onto its ground plane, scaled so its sampled
/// bounds match the scan's lateral and longitudinal extents, mirrored across
/// the lateral axis when `side` differs from the side the template was drawn
/// for, slid along the foot until its rearmost sample meets the scan's
/// rearmost vertex, and lifted to the scan's highest vertex. Laterally the
/// outline is centred on the scan.
///
/// # Errors
///
/// - [`TemplateError::EmptyMesh`] if the mesh has no vertices
/// - [`TemplateError::DegenerateTemplate`] if the template has fewer than two
///   control points
/// - [`TemplateError::IncompatibleBounds`] if the template or the scan is
///   (near) zero-sized across or along the foot
///
/// # Example
///
/// ```
/// use insole_types::{ScanMesh, Point3};
/// use insole_template::{fit_curve, CurveTemplate, Laterality};
///
/// let mesh = ScanMesh::from_positions(
///     &[
///         Point3::new(-45.0, -120.0, 0.0),
///         Point3::new(55.0, -120.0, 0.0),
///         Point3::new(55.0, 140.0, 25.0),
///         Point3::new(-45.0, 140.0, 0.0),
///     ],
///     vec![[0, 1, 2], [0, 2, 3]],
/// );
///
/// let fitted = fit_curve(&CurveTemplate::right_foot(), &mesh, Laterality::Right).unwrap();
/// assert_eq!(fitted.curve.len(), 8);
/// assert!((fitted.height - 25.0).abs() < 1e-12);
/// ```
pub fn fit_curve(
    template: &CurveTemplate,
    mesh: &ScanMesh,
    side: Laterality,
) -> TemplateResult<FittedOutline> {
    if mesh.is_empty() {
        return Err(TemplateError::EmptyMesh);
    }
    if template.curve.len() < 2 {
        return Err(TemplateError::DegenerateTemplate {
            count: template.curve.len(),
        });
    }

    let flat = flatten(&template.curve);
    let tb = flat.bounds(FIT_SAMPLES_PER_SEGMENT);
    let tsize = tb.size();
    check_extent(Axis::X, tsize.x)?;
    check_extent(Axis::Y, tsize.y)?;

    let axes = mesh.axes;
    let mb = mesh.world_bounds();
    let width = mb.extent(axes.lateral);
    let length = mb.extent(axes.longitudinal);
    check_extent(axes.lateral, width)?;
    check_extent(axes.longitudinal, length)?;

    let lateral_scale = width / tsize.x;
    let longitudinal_scale = length / tsize.y;
    let mirror = if side == template.side { 1.0 } else { -1.0 };

    // Template X/Y/Z onto the scan's lateral/longitudinal/vertical axes.
    let mut frame = Matrix4::zeros();
    frame[(axes.lateral.index(), 0)] = 1.0;
    frame[(axes.longitudinal.index(), 1)] = 1.0;
    frame[(axes.vertical.index(), 2)] = 1.0;
    frame[(3, 3)] = 1.0;

    let height = mb.max_along(axes.vertical);
    let target = axes.lateral.unit() * axes.lateral.of(&mb.center())
        + axes.vertical.unit() * height;

    let placement = Transform3D::translation(-tb.center().coords)
        .then(&Transform3D::scale(Vector3::new(
            mirror * lateral_scale,
            longitudinal_scale,
            1.0,
        )))
        .then(&Transform3D::from_matrix(frame))
        .then(&Transform3D::translation(target));
    let mut curve = flat.transformed(&placement);

    let rear = curve
        .bounds(FIT_SAMPLES_PER_SEGMENT)
        .min_along(axes.longitudinal);
    let shift = mb.min_along(axes.longitudinal) - rear;
    let delta = axes.longitudinal.unit() * shift;
    for point in &mut curve.points {
        point.translate(&delta);
    }

    debug!(
        lateral_scale,
        longitudinal_scale,
        shift,
        mirrored = mirror < 0.0,
        "Placed outline template"
    );
    info!(template = %template.name, %side, height, "Fitted outline");

    Ok(FittedOutline {
        curve,
        side,
        lateral_scale,
        longitudinal_scale,
        height,
    })
}

/// Fit the built-in right-foot template.
///
/// # Errors
///
/// See [`fit_curve`].
pub fn fit_outline(mesh: &ScanMesh, side: Laterality) -> TemplateResult<FittedOutline> {
    fit_curve(&CurveTemplate::right_foot(), mesh, side)
}

fn check_extent(axis: Axis, extent: f64) -> TemplateResult<()> {
    if extent.is_finite() && extent > MIN_EXTENT {
        Ok(())
    } else {
        Err(TemplateError::IncompatibleBounds { axis, extent })
    }
}

fn flatten(curve: &OutlineCurve) -> OutlineCurve {
    let mut flat = curve.clone();
    for point in &mut flat.points {
        point.position.z = 0.0;
        point.left.offset.z = 0.0;
        point.right.offset.z = 0.0;
    }
    flat
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use insole_types::{AxisFrame, Point3};

    fn footprint() -> ScanMesh {
        ScanMesh::from_positions(
            &[
                Point3::new(-40.0, -100.0, 0.0),
                Point3::new(60.0, -100.0, 2.0),
                Point3::new(60.0, 150.0, 30.0),
                Point3::new(-40.0, 150.0, 5.0),
            ],
            vec![[0, 1, 2], [0, 2, 3]],
        )
    }

    #[test]
    fn matches_scan_footprint() {
        let mesh = footprint();
        let fitted = fit_outline(&mesh, Laterality::Right).unwrap();
        let b = fitted.curve.bounds(FIT_SAMPLES_PER_SEGMENT);

        assert_relative_eq!(b.size().x, 100.0, epsilon = 1e-9);
        assert_relative_eq!(b.size().y, 250.0, epsilon = 1e-9);
        assert_relative_eq!(b.min.y, -100.0, epsilon = 1e-9);
        assert_relative_eq!(b.center().x, 10.0, epsilon = 1e-9);
    }

    #[test]
    fn lifted_to_highest_vertex() {
        let fitted = fit_outline(&footprint(), Laterality::Right).unwrap();
        assert_relative_eq!(fitted.height, 30.0);
        for p in &fitted.curve.points {
            assert_relative_eq!(p.position.z, 30.0, epsilon = 1e-9);
            assert_relative_eq!(p.left.offset.z, 0.0, epsilon = 1e-12);
            assert_relative_eq!(p.right.offset.z, 0.0, epsilon = 1e-12);
        }
    }

    #[test]
    fn left_is_mirror_of_right() {
        let mesh = footprint();
        let right = fit_outline(&mesh, Laterality::Right).unwrap();
        let left = fit_outline(&mesh, Laterality::Left).unwrap();

        // Both are centred on x = 10.
        for (r, l) in right.curve.points.iter().zip(&left.curve.points) {
            assert_relative_eq!(l.position.x, 20.0 - r.position.x, epsilon = 1e-9);
            assert_relative_eq!(l.position.y, r.position.y, epsilon = 1e-9);
            assert_relative_eq!(l.right.offset.x, -r.right.offset.x, epsilon = 1e-9);
        }
        assert_eq!(left.side, Laterality::Left);
    }

    #[test]
    fn template_drawn_left_mirrors_for_right() {
        let mut template = CurveTemplate::right_foot();
        template.side = Laterality::Left;
        let mesh = footprint();
        let a = fit_curve(&template, &mesh, Laterality::Right).unwrap();
        let b = fit_outline(&mesh, Laterality::Left).unwrap();
        for (p, q) in a.curve.points.iter().zip(&b.curve.points) {
            assert_relative_eq!(p.position, q.position, epsilon = 1e-9);
        }
    }

    #[test]
    fn follows_axis_frame() {
        // Foot lying along X, height along Y.
        let mesh = ScanMesh::from_positions(
            &[
                Point3::new(0.0, 0.0, -50.0),
                Point3::new(260.0, 12.0, 50.0),
            ],
            Vec::new(),
        )
        .with_axes(AxisFrame {
            longitudinal: Axis::X,
            lateral: Axis::Z,
            vertical: Axis::Y,
        });

        let fitted = fit_outline(&mesh, Laterality::Right).unwrap();
        let b = fitted.curve.bounds(FIT_SAMPLES_PER_SEGMENT);
        assert_relative_eq!(b.size().x, 260.0, epsilon = 1e-9);
        assert_relative_eq!(b.size().z, 100.0, epsilon = 1e-9);
        assert_relative_eq!(b.min.x, 0.0, epsilon = 1e-9);
        assert_relative_eq!(b.min.y, 12.0, epsilon = 1e-9);
        assert_relative_eq!(b.max.y, 12.0, epsilon = 1e-9);
    }

    #[test]
    fn flat_scan_is_incompatible() {
        let mesh = ScanMesh::from_positions(
            &[Point3::new(0.0, 0.0, 0.0), Point3::new(0.0, 200.0, 0.0)],
            Vec::new(),
        );
        let err = fit_outline(&mesh, Laterality::Right).unwrap_err();
        assert!(matches!(
            err,
            TemplateError::IncompatibleBounds { axis: Axis::X, .. }
        ));
    }

    #[test]
    fn degenerate_template() {
        let template = CurveTemplate::new("dot", Laterality::Right, OutlineCurve::default());
        let err = fit_curve(&template, &footprint(), Laterality::Right).unwrap_err();
        assert!(matches!(err, TemplateError::DegenerateTemplate { count: 0 }));
    }

    #[test]
    fn empty_mesh() {
        let err = fit_outline(&ScanMesh::new(), Laterality::Left).unwrap_err();
        assert!(matches!(err, TemplateError::EmptyMesh));
    }
}
