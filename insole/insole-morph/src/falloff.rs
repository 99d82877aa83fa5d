//! Smooth proportional falloff.
//!
//! A deformation applied to a zone fades out over `radius` beyond the zone's
//! longitudinal span:
//!
//! ```text
//! w(d) = smoothstep(1 - clamp(d / radius, 0, 1))
//! smoothstep(t) = 3t² - 2t³
//! ```
//!
//! where `d` is the longitudinal distance from a vertex to the span (zero
//! inside it).

use insole_types::ScanMesh;
use insole_zones::ZoneSelection;

/// Hermite smoothstep on `[0, 1]`.
#[inline]
#[must_use]
pub fn smoothstep(t: f64) -> f64 {
    let t = t.clamp(0.0, 1.0);
    t * t * (3.0 - 2.0 * t)
}

/// Falloff weight for a vertex `distance` outside the region.
///
/// A non-positive radius gives a hard edge: 1 inside, 0 outside.
///
/// # Example
///
/// ```
/// use insole_morph::falloff_weight;
///
/// assert_eq!(falloff_weight(0.0, 10.0), 1.0);
/// assert_eq!(falloff_weight(5.0, 10.0), 0.5);
/// assert_eq!(falloff_weight(12.0, 10.0), 0.0);
/// ```
#[must_use]
pub fn falloff_weight(distance: f64, radius: f64) -> f64 {
    if distance <= 0.0 {
        return 1.0;
    }
    if radius <= 0.0 {
        return 0.0;
    }
    smoothstep(1.0 - (distance / radius).clamp(0.0, 1.0))
}

/// Falloff field of one region along the longitudinal axis.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Falloff {
    /// Lowest longitudinal coordinate in the region.
    pub lo: f64,
    /// Highest longitudinal coordinate in the region.
    pub hi: f64,
    /// Distance over which the weight decays to zero.
    pub radius: f64,
}

impl Falloff {
    /// Falloff around the longitudinal span of `region`.
    ///
    /// Returns `None` if the region is empty.
    #[must_use]
    pub fn around(mesh: &ScanMesh, region: &ZoneSelection, radius: f64) -> Option<Self> {
        let mut members = region.vertices.iter().map(|&v| mesh.longitudinal(v as usize));
        let first = members.next()?;
        let (lo, hi) = members.fold((first, first), |(lo, hi), y| (lo.min(y), hi.max(y)));
        Some(Self { lo, hi, radius })
    }

    /// Distance from `long` to the span.
    #[inline]
    #[must_use]
    pub fn distance(&self, long: f64) -> f64 {
        if long < self.lo {
            self.lo - long
        } else if long > self.hi {
            long - self.hi
        } else {
            0.0
        }
    }

    /// Weight at longitudinal coordinate `long`.
    #[inline]
    #[must_use]
    pub fn weight(&self, long: f64) -> f64 {
        falloff_weight(self.distance(long), self.radius)
    }
}
