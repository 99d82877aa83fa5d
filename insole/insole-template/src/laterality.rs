//! Left/right foot detection.

use std::fmt;

use insole_types::ScanMesh;
use tracing::debug;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::{TemplateError, TemplateResult};

/// Which foot a scan belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Laterality {
    /// Left foot.
    Left,
    /// Right foot.
    Right,
}

impl Laterality {
    /// The other foot.
    #[must_use]
    pub const fn opposite(self) -> Self {
        match self {
            Self::Left => Self::Right,
            Self::Right => Self::Left,
        }
    }

    /// Single-letter code, `L` or `R`.
    #[must_use]
    pub const fn code(self) -> char {
        match self {
            Self::Left => 'L',
            Self::Right => 'R',
        }
    }
}

impl fmt::Display for Laterality {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Left => f.write_str("left"),
            Self::Right => f.write_str("right"),
        }
    }
}

/// Decide which foot a pruned scan belongs to.
///
/// After pruning the object origin sits at the vertex centroid. The arch side
/// of a foot carries less material than the outer side, so the centroid is
/// pulled towards the outer edge: when the origin lies farther from the
/// lateral minimum than from the lateral maximum the scan is a right foot.
/// Equal distances resolve to [`Laterality::Left`].
///
/// This heuristic assumes the scan has been recentred by `prune`; results on
/// an arbitrary origin are meaningless.
///
/// # Errors
///
/// Returns [`TemplateError::EmptyMesh`] if the mesh has no vertices.
///
/// # Example
///
/// ```
/// use insole_types::{Axis, ScanMesh, Point3};
/// use insole_template::{classify_side, Laterality};
///
/// let mesh = ScanMesh::from_positions(
///     &[
///         Point3::new(-60.0, 0.0, 0.0),
///         Point3::new(30.0, 0.0, 0.0),
///         Point3::new(30.0, 200.0, 0.0),
///     ],
///     vec![[0, 1, 2]],
/// );
/// assert_eq!(classify_side(&mesh).unwrap(), Laterality::Right);
/// assert_eq!(classify_side(&mesh.mirrored(Axis::X)).unwrap(), Laterality::Left);
/// ```
pub fn classify_side(mesh: &ScanMesh) -> TemplateResult<Laterality> {
    if mesh.is_empty() {
        return Err(TemplateError::EmptyMesh);
    }

    let lateral = mesh.axes.lateral;
    let bounds = mesh.world_bounds();
    let origin = lateral.of_vector(&mesh.transform.translation_part());

    let to_min = (origin - bounds.min_along(lateral)).abs();
    let to_max = (origin - bounds.max_along(lateral)).abs();

    let side = if to_min > to_max {
        Laterality::Right
    } else {
        Laterality::Left
    };

    debug!(?side, to_min, to_max, "Classified scan side");
    Ok(side)
}
