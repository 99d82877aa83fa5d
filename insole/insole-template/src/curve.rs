//! Cyclic cubic Bézier outlines.
//!
//! An [`OutlineCurve`] is a closed loop of [`ControlPoint`]s. Each point
//! carries an incoming (`left`) and outgoing (`right`) handle stored as an
//! offset from the point, so moving a point carries its handles along.
//! Segment `i` runs from point `i` to point `i + 1`, wrapping at the end.

use insole_types::{Aabb, Point3, Transform3D, Vector3};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Handle constraint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum HandleKind {
    /// Kept collinear with the opposite handle of the same point.
    #[default]
    Aligned,
    /// Moves independently.
    Free,
}

/// A Bézier handle relative to its control point.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Handle {
    /// Offset from the control point.
    pub offset: Vector3<f64>,
    /// Constraint applied when the opposite handle is edited.
    pub kind: HandleKind,
}

impl Handle {
    /// Create a handle.
    #[must_use]
    pub const fn new(offset: Vector3<f64>, kind: HandleKind) -> Self {
        Self { offset, kind }
    }

    /// An aligned handle.
    #[must_use]
    pub const fn aligned(offset: Vector3<f64>) -> Self {
        Self::new(offset, HandleKind::Aligned)
    }

    /// A free handle.
    #[must_use]
    pub const fn free(offset: Vector3<f64>) -> Self {
        Self::new(offset, HandleKind::Free)
    }
}

/// A point on the outline with its two handles.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ControlPoint {
    /// Position of the point.
    pub position: Point3<f64>,
    /// Incoming handle.
    pub left: Handle,
    /// Outgoing handle.
    pub right: Handle,
}

impl ControlPoint {
    /// Create a control point.
    #[must_use]
    pub const fn new(position: Point3<f64>, left: Handle, right: Handle) -> Self {
        Self {
            position,
            left,
            right,
        }
    }

    /// Create a control point from absolute handle positions.
    #[must_use]
    pub fn from_absolute(
        position: Point3<f64>,
        left: Point3<f64>,
        left_kind: HandleKind,
        right: Point3<f64>,
        right_kind: HandleKind,
    ) -> Self {
        Self::new(
            position,
            Handle::new(left - position, left_kind),
            Handle::new(right - position, right_kind),
        )
    }

    /// Absolute position of the incoming handle.
    #[must_use]
    pub fn left_position(&self) -> Point3<f64> {
        self.position + self.left.offset
    }

    /// Absolute position of the outgoing handle.
    #[must_use]
    pub fn right_position(&self) -> Point3<f64> {
        self.position + self.right.offset
    }

    /// Move the point, carrying both handles.
    pub fn translate(&mut self, delta: &Vector3<f64>) {
        self.position += *delta;
    }

    /// Set the incoming handle offset.
    ///
    /// If the outgoing handle is [`HandleKind::Aligned`] it is rotated to
    /// point directly away from the new incoming handle, keeping its length.
    pub fn set_left(&mut self, offset: Vector3<f64>) {
        self.left.offset = offset;
        if self.right.kind == HandleKind::Aligned {
            self.right.offset = realign(&offset, &self.right.offset);
        }
    }

    /// Set the outgoing handle offset.
    ///
    /// If the incoming handle is [`HandleKind::Aligned`] it is rotated to
    /// point directly away from the new outgoing handle, keeping its length.
    pub fn set_right(&mut self, offset: Vector3<f64>) {
        self.right.offset = offset;
        if self.left.kind == HandleKind::Aligned {
            self.left.offset = realign(&offset, &self.left.offset);
        }
    }

    /// Whether the two handles lie on one line through the point, facing
    /// opposite ways. Zero-length handles count as collinear.
    #[must_use]
    pub fn handles_collinear(&self, tolerance: f64) -> bool {
        let l = self.left.offset;
        let r = self.right.offset;
        if l.norm() < f64::EPSILON || r.norm() < f64::EPSILON {
            return true;
        }
        l.cross(&r).norm() <= tolerance * l.norm() * r.norm() && l.dot(&r) <= 0.0
    }

    fn map(&self, transform: &Transform3D) -> Self {
        Self {
            position: transform.transform_point(&self.position),
            left: Handle::new(transform.transform_vector(&self.left.offset), self.left.kind),
            right: Handle::new(
                transform.transform_vector(&self.right.offset),
                self.right.kind,
            ),
        }
    }
}

// Opposite of `driver` with the length of `follower`.
fn realign(driver: &Vector3<f64>, follower: &Vector3<f64>) -> Vector3<f64> {
    let len = follower.norm();
    match driver.try_normalize(f64::EPSILON) {
        Some(dir) => -dir * len,
        None => *follower,
    }
}

/// A closed cubic Bézier outline.
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct OutlineCurve {
    /// Control points in loop order.
    pub points: Vec<ControlPoint>,
}

impl OutlineCurve {
    /// Create a curve from its control points.
    #[must_use]
    pub const fn new(points: Vec<ControlPoint>) -> Self {
        Self { points }
    }

    /// Number of control points.
    #[must_use]
    pub fn len(&self) -> usize {
        self.points.len()
    }

    /// Whether the curve has no control points.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Number of Bézier segments (equal to the point count for a closed loop
    /// of two or more points).
    #[must_use]
    pub fn segment_count(&self) -> usize {
        if self.points.len() < 2 {
            0
        } else {
            self.points.len()
        }
    }

    /// Evaluate segment `segment` at parameter `t` in `[0, 1]`.
    ///
    /// Returns `None` if the segment does not exist. `t` is clamped.
    #[must_use]
    pub fn evaluate(&self, segment: usize, t: f64) -> Option<Point3<f64>> {
        if segment >= self.segment_count() {
            return None;
        }
        let a = &self.points[segment];
        let b = &self.points[(segment + 1) % self.points.len()];

        let p0 = a.position.coords;
        let p1 = a.right_position().coords;
        let p2 = b.left_position().coords;
        let p3 = b.position.coords;

        let t = t.clamp(0.0, 1.0);
        let s = 1.0 - t;
        let coords = p0 * (s * s * s)
            + p1 * (3.0 * s * s * t)
            + p2 * (3.0 * s * t * t)
            + p3 * (t * t * t);
        Some(Point3::from(coords))
    }

    /// Sample the whole loop with `per_segment` points per segment.
    ///
    /// Each segment contributes its start point and `per_segment - 1`
    /// interior points; the loop is not closed by repeating the first sample.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn sample(&self, per_segment: usize) -> Vec<Point3<f64>> {
        let per_segment = per_segment.max(1);
        let mut samples = Vec::with_capacity(self.segment_count() * per_segment);
        for segment in 0..self.segment_count() {
            for step in 0..per_segment {
                let t = step as f64 / per_segment as f64;
                if let Some(p) = self.evaluate(segment, t) {
                    samples.push(p);
                }
            }
        }
        samples
    }

    /// Bounds of the sampled curve.
    ///
    /// Bézier curves stay inside the hull of their control polygon, so the
    /// sampled bounds are tighter than the bounds of points and handles.
    #[must_use]
    pub fn bounds(&self, per_segment: usize) -> Aabb {
        Aabb::from_points(self.sample(per_segment).iter())
    }

    /// Copy of the curve with points mapped as positions and handles as
    /// directions.
    #[must_use]
    pub fn transformed(&self, transform: &Transform3D) -> Self {
        Self {
            points: self.points.iter().map(|p| p.map(transform)).collect(),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use insole_types::Axis;

    fn square() -> OutlineCurve {
        let corner = |x: f64, y: f64, lx: f64, ly: f64| {
            ControlPoint::new(
                Point3::new(x, y, 0.0),
                Handle::aligned(Vector3::new(lx, ly, 0.0)),
                Handle::aligned(Vector3::new(-lx, -ly, 0.0)),
            )
        };
        OutlineCurve::new(vec![
            corner(0.0, 0.0, 1.0, -1.0),
            corner(10.0, 0.0, -1.0, -1.0),
            corner(10.0, 10.0, -1.0, 1.0),
            corner(0.0, 10.0, 1.0, 1.0),
        ])
    }

    #[test]
    fn evaluate_hits_endpoints() {
        let curve = square();
        let start = curve.evaluate(1, 0.0).unwrap();
        let end = curve.evaluate(1, 1.0).unwrap();
        assert_relative_eq!(start, Point3::new(10.0, 0.0, 0.0));
        assert_relative_eq!(end, Point3::new(10.0, 10.0, 0.0));
    }

    #[test]
    fn last_segment_wraps() {
        let curve = square();
        let end = curve.evaluate(3, 1.0).unwrap();
        assert_relative_eq!(end, Point3::new(0.0, 0.0, 0.0));
        assert!(curve.evaluate(4, 0.5).is_none());
    }

    #[test]
    fn straight_handles_give_straight_segment() {
        let p = |x: f64| {
            ControlPoint::new(
                Point3::new(x, 0.0, 0.0),
                Handle::free(Vector3::new(-1.0, 0.0, 0.0)),
                Handle::free(Vector3::new(1.0, 0.0, 0.0)),
            )
        };
        let curve = OutlineCurve::new(vec![p(0.0), p(3.0)]);
        let mid = curve.evaluate(0, 0.5).unwrap();
        assert_relative_eq!(mid, Point3::new(1.5, 0.0, 0.0), epsilon = 1e-12);
    }

    #[test]
    fn sample_count() {
        let curve = square();
        assert_eq!(curve.sample(8).len(), 32);
        assert_eq!(curve.sample(0).len(), 4);
        assert!(OutlineCurve::default().sample(8).is_empty());
    }

    #[test]
    fn bounds_contain_points() {
        let curve = square();
        let b = curve.bounds(16);
        assert!(b.min.x <= 0.0 && b.max.x >= 10.0);
        assert!(b.min.y <= 0.0 && b.max.y >= 10.0);
    }

    #[test]
    fn translate_carries_handles() {
        let mut p = square().points[0];
        let before = p.right_position();
        p.translate(&Vector3::new(5.0, 5.0, 0.0));
        assert_relative_eq!(p.right_position(), before + Vector3::new(5.0, 5.0, 0.0));
    }

    #[test]
    fn aligned_edit_keeps_collinear() {
        let mut p = square().points[0];
        let right_len = p.right.offset.norm();
        p.set_left(Vector3::new(0.0, 3.0, 0.0));
        assert!(p.handles_collinear(1e-12));
        assert_relative_eq!(p.right.offset, Vector3::new(0.0, -right_len, 0.0), epsilon = 1e-12);

        p.set_right(Vector3::new(2.0, 0.0, 0.0));
        assert!(p.handles_collinear(1e-12));
        assert_relative_eq!(p.left.offset, Vector3::new(-3.0, 0.0, 0.0), epsilon = 1e-12);
    }

    #[test]
    fn free_edit_leaves_opposite() {
        let mut p = ControlPoint::new(
            Point3::origin(),
            Handle::free(Vector3::new(-1.0, 0.0, 0.0)),
            Handle::free(Vector3::new(1.0, 0.0, 0.0)),
        );
        p.set_left(Vector3::new(0.0, 2.0, 0.0));
        assert_relative_eq!(p.right.offset, Vector3::new(1.0, 0.0, 0.0));
    }

    #[test]
    fn mirror_maps_handles_as_vectors() {
        let curve = square().transformed(&Transform3D::mirror(Axis::X));
        let p = curve.points[1];
        assert_relative_eq!(p.position, Point3::new(-10.0, 0.0, 0.0));
        assert_relative_eq!(p.left.offset, Vector3::new(1.0, -1.0, 0.0));
    }
}
