//! Stored outline templates.

use insole_types::Point3;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::{ControlPoint, HandleKind, Laterality, OutlineCurve};

/// A named outline authored for one foot.
///
/// Templates are drawn in their own frame: X is lateral, Y runs heel to toe
/// and Z is up. Fitting maps that frame onto the scan's [`AxisFrame`].
///
/// [`AxisFrame`]: insole_types::AxisFrame
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct CurveTemplate {
    /// Template name.
    pub name: String,
    /// The foot the outline was drawn for.
    pub side: Laterality,
    /// The outline in template space.
    pub curve: OutlineCurve,
}

impl CurveTemplate {
    /// Create a template.
    #[must_use]
    pub fn new(name: impl Into<String>, side: Laterality, curve: OutlineCurve) -> Self {
        Self {
            name: name.into(),
            side,
            curve,
        }
    }

    /// The built-in right-foot insole outline, eight points in millimetres.
    #[must_use]
    pub fn right_foot() -> Self {
        let points = RIGHT_FOOT
            .iter()
            .map(|&(p, l, r, kind)| {
                ControlPoint::from_absolute(
                    Point3::new(p[0], p[1], 0.0),
                    Point3::new(l[0], l[1], 0.0),
                    kind,
                    Point3::new(r[0], r[1], 0.0),
                    kind,
                )
            })
            .collect();
        Self::new("right_foot_insole", Laterality::Right, OutlineCurve::new(points))
    }
}

impl Default for CurveTemplate {
    fn default() -> Self {
        Self::right_foot()
    }
}

type Row = ([f64; 2], [f64; 2], [f64; 2], HandleKind);

const A: HandleKind = HandleKind::Aligned;
const F: HandleKind = HandleKind::Free;

// (point, left handle, right handle, kind), absolute coordinates.
#[rustfmt::skip]
const RIGHT_FOOT: [Row; 8] = [
    ([-37.0953,  -19.6058], [-30.2584,  -40.7425], [-52.2660,   27.2951], A),
    ([-59.1659,   89.6893], [-60.9224,   64.2939], [-57.4095,  115.0848], A),
    ([-18.7599,  129.3645], [-45.2403,  128.8769], [  9.4165,  129.8834], A),
    ([ 40.3677,   79.9308], [ 29.1940,  109.8954], [ 51.5415,   49.9663], F),
    ([ 47.8725,  -29.3620], [ 54.1114,   10.0252], [ 44.4008,  -62.8795], F),
    ([ 38.9151, -118.4133], [ 44.9316,  -95.7704], [ 32.8986, -141.0563], A),
    ([ -9.3265, -145.9773], [ 20.3347, -153.4514], [-25.7450, -141.8402], A),
    ([-30.3971,  -95.5412], [-29.2688, -120.8156], [-31.5255,  -70.2668], A),
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn right_foot_shape() {
        let t = CurveTemplate::right_foot();
        assert_eq!(t.curve.len(), 8);
        assert_eq!(t.side, Laterality::Right);

        let b = t.curve.bounds(16);
        // Roughly 110 mm wide and 280 mm long.
        assert!((100.0..120.0).contains(&b.size().x));
        assert!((270.0..290.0).contains(&b.size().y));
    }

    #[test]
    fn aligned_points_are_collinear() {
        let t = CurveTemplate::right_foot();
        for p in t.curve.points.iter().filter(|p| p.left.kind == HandleKind::Aligned) {
            assert!(p.handles_collinear(1e-3));
        }
    }

    #[test]
    fn template_is_flat() {
        let t = CurveTemplate::right_foot();
        assert!(t.curve.sample(4).iter().all(|p| p.z == 0.0));
    }
}
