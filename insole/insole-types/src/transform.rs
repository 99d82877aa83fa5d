//! Affine object-to-world transform.

use nalgebra::{Matrix4, Point3, Vector3};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::Axis;

/// An affine transform stored as a 4x4 matrix.
///
/// A [`ScanMesh`](crate::ScanMesh) keeps its vertices in local space and maps
/// them to world space through one of these.
///
/// # Example
///
/// ```
/// use insole_types::{Transform3D, Point3, Vector3};
///
/// let t = Transform3D::translation(Vector3::new(0.0, 0.0, 5.0))
///     .then(&Transform3D::rotation_axis(Vector3::z(), std::f64::consts::FRAC_PI_2));
/// let p = t.transform_point(&Point3::new(1.0, 0.0, 0.0));
/// assert!((p - Point3::new(0.0, 1.0, 5.0)).norm() < 1e-12);
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Transform3D {
    matrix: Matrix4<f64>,
}

impl Default for Transform3D {
    fn default() -> Self {
        Self::identity()
    }
}

impl Transform3D {
    /// Wrap a raw homogeneous matrix.
    #[must_use]
    pub const fn from_matrix(matrix: Matrix4<f64>) -> Self {
        Self { matrix }
    }

    /// The identity transform.
    #[must_use]
    pub fn identity() -> Self {
        Self {
            matrix: Matrix4::identity(),
        }
    }

    /// Pure translation.
    #[must_use]
    pub fn translation(offset: Vector3<f64>) -> Self {
        Self {
            matrix: Matrix4::new_translation(&offset),
        }
    }

    /// Non-uniform scale about the origin.
    #[must_use]
    pub fn scale(factors: Vector3<f64>) -> Self {
        Self {
            matrix: Matrix4::new_nonuniform_scaling(&factors),
        }
    }

    /// Reflection across the plane through the origin normal to `axis`.
    #[must_use]
    pub fn mirror(axis: Axis) -> Self {
        let mut factors = Vector3::new(1.0, 1.0, 1.0);
        factors[axis.index()] = -1.0;
        Self::scale(factors)
    }

    /// Rotation by `angle` radians about `axis` through the origin
    /// (Rodrigues' formula). A zero axis yields the identity.
    #[must_use]
    pub fn rotation_axis(axis: Vector3<f64>, angle: f64) -> Self {
        let norm = axis.norm();
        if norm < f64::EPSILON {
            return Self::identity();
        }

        let k = axis / norm;
        let (s, c) = angle.sin_cos();
        let t = 1.0 - c;
        let (x, y, z) = (k.x, k.y, k.z);

        #[rustfmt::skip]
        let matrix = Matrix4::new(
            t*x*x + c,     t*x*y - s*z,   t*x*z + s*y,   0.0,
            t*x*y + s*z,   t*y*y + c,     t*y*z - s*x,   0.0,
            t*x*z - s*y,   t*y*z + s*x,   t*z*z + c,     0.0,
            0.0,           0.0,           0.0,           1.0,
        );
        Self { matrix }
    }

    /// Rotation by `angle` radians about the line through `pivot` along `axis`.
    #[must_use]
    pub fn rotation_about(pivot: &Point3<f64>, axis: Vector3<f64>, angle: f64) -> Self {
        Self::translation(-pivot.coords)
            .then(&Self::rotation_axis(axis, angle))
            .then(&Self::translation(pivot.coords))
    }

    /// Compose: apply `self` first, then `other`.
    #[must_use]
    pub fn then(&self, other: &Self) -> Self {
        Self {
            matrix: other.matrix * self.matrix,
        }
    }

    /// Inverse transform, if the matrix is invertible.
    #[must_use]
    pub fn inverse(&self) -> Option<Self> {
        self.matrix.try_inverse().map(Self::from_matrix)
    }

    /// Map a point.
    #[must_use]
    pub fn transform_point(&self, point: &Point3<f64>) -> Point3<f64> {
        let h = self.matrix * point.to_homogeneous();
        Point3::new(h.x, h.y, h.z)
    }

    /// Map a direction (ignores translation).
    #[must_use]
    pub fn transform_vector(&self, v: &Vector3<f64>) -> Vector3<f64> {
        self.matrix.fixed_view::<3, 3>(0, 0) * v
    }

    /// Translation component.
    #[must_use]
    pub fn translation_part(&self) -> Vector3<f64> {
        Vector3::new(self.matrix[(0, 3)], self.matrix[(1, 3)], self.matrix[(2, 3)])
    }

    /// Copy of this transform with the translation component zeroed.
    #[must_use]
    pub fn without_translation(&self) -> Self {
        let mut matrix = self.matrix;
        matrix[(0, 3)] = 0.0;
        matrix[(1, 3)] = 0.0;
        matrix[(2, 3)] = 0.0;
        Self { matrix }
    }

    /// True if the linear part has a negative determinant.
    #[must_use]
    pub fn is_reflection(&self) -> bool {
        self.matrix.fixed_view::<3, 3>(0, 0).clone_owned().determinant() < 0.0
    }

    /// True if this is exactly the identity.
    #[must_use]
    pub fn is_identity(&self) -> bool {
        self.matrix == Matrix4::identity()
    }

    /// Underlying matrix.
    #[must_use]
    pub const fn matrix(&self) -> &Matrix4<f64> {
        &self.matrix
    }
}
