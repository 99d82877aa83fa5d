//! Anatomical axis conventions.
//!
//! A foot scan is zoned along its heel-to-toe ("longitudinal") axis, its
//! left/right ("lateral") axis and its ground-normal ("vertical") axis. The
//! scanner conventionally delivers feet with the toe towards +Y and the sole
//! on the XY plane, but the frame can also be derived from bounding extents
//! for scans exported in another orientation.

use nalgebra::{Point3, Vector3};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// One of the three world coordinate axes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Axis {
    /// The X axis.
    X,
    /// The Y axis.
    Y,
    /// The Z axis.
    Z,
}

impl Axis {
    /// Component index (0, 1, 2).
    #[inline]
    #[must_use]
    pub const fn index(self) -> usize {
        match self {
            Self::X => 0,
            Self::Y => 1,
            Self::Z => 2,
        }
    }

    /// Unit vector along the axis.
    #[inline]
    #[must_use]
    pub fn unit(self) -> Vector3<f64> {
        let mut v = Vector3::zeros();
        v[self.index()] = 1.0;
        v
    }

    /// Coordinate of a point along this axis.
    #[inline]
    #[must_use]
    pub fn of(self, point: &Point3<f64>) -> f64 {
        point[self.index()]
    }

    /// Component of a vector along this axis.
    #[inline]
    #[must_use]
    pub fn of_vector(self, v: &Vector3<f64>) -> f64 {
        v[self.index()]
    }
}

/// Assignment of anatomical directions to world axes.
///
/// # Example
///
/// ```
/// use insole_types::{Axis, AxisFrame, Vector3};
///
/// // A scan lying with its length along X and its height along Y.
/// let frame = AxisFrame::from_extents(&Vector3::new(300.0, 60.0, 110.0));
/// assert_eq!(frame.longitudinal, Axis::X);
/// assert_eq!(frame.lateral, Axis::Z);
/// assert_eq!(frame.vertical, Axis::Y);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct AxisFrame {
    /// Heel-to-toe axis; the toe lies towards the maximum.
    pub longitudinal: Axis,
    /// Left/right axis.
    pub lateral: Axis,
    /// Ground-normal axis; the sole lies towards the minimum.
    pub vertical: Axis,
}

impl AxisFrame {
    /// Scanner convention: toe towards +Y, lateral along X, up along Z.
    pub const FOOT: Self = Self {
        longitudinal: Axis::Y,
        lateral: Axis::X,
        vertical: Axis::Z,
    };

    /// Derive a frame from bounding-box extents.
    ///
    /// The longest extent becomes longitudinal and the shortest of the
    /// remaining two vertical. Ties prefer Y, then X, then Z for the
    /// longitudinal axis and Z, then X, then Y for the vertical axis, so an
    /// isotropic box yields [`AxisFrame::FOOT`].
    #[must_use]
    pub fn from_extents(size: &Vector3<f64>) -> Self {
        let mut longitudinal = Axis::Y;
        for axis in [Axis::X, Axis::Z] {
            if axis.of_vector(size) > longitudinal.of_vector(size) {
                longitudinal = axis;
            }
        }

        let mut vertical: Option<Axis> = None;
        for axis in [Axis::Z, Axis::X, Axis::Y] {
            if axis == longitudinal {
                continue;
            }
            match vertical {
                Some(v) if axis.of_vector(size) >= v.of_vector(size) => {}
                _ => vertical = Some(axis),
            }
        }
        let vertical = vertical.unwrap_or(Axis::Z);

        let lateral = [Axis::X, Axis::Y, Axis::Z]
            .into_iter()
            .find(|a| *a != longitudinal && *a != vertical)
            .unwrap_or(Axis::X);

        Self {
            longitudinal,
            lateral,
            vertical,
        }
    }

    /// Whether the three axes are pairwise distinct.
    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.longitudinal != self.lateral
            && self.longitudinal != self.vertical
            && self.lateral != self.vertical
    }
}

impl Default for AxisFrame {
    fn default() -> Self {
        Self::FOOT
    }
}
