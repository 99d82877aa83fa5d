//! Longitudinal zone classification.
//!
//! Zones are derived from four cut planes along the longitudinal axis, all
//! expressed as fractions of the longitudinal extent:
//!
//! ```text
//!  heel                                                        toe
//!  min ──┬───────────┬──────────────────────┬──────────┬──── max
//!      heel_y   heel_falloff_y            mid_y     flat_y
//! ```
//!
//! The front family (`flat`, `mid`, `original`) and the heel family
//! (`heel`, `heel_mid`, `non_heel`) each partition the vertex set.
//! Classification reads local-space coordinates and is recomputed on every
//! call; nothing is cached on the mesh.

use insole_types::ScanMesh;
use tracing::debug;

use crate::error::{ZoneError, ZoneResult};
use crate::params::ZoneParams;
use crate::zone::{Zone, ZoneFamily};

/// Absolute cut planes for one mesh and parameter set.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ZoneCuts {
    /// Minimum longitudinal coordinate (heel extreme).
    pub min_long: f64,
    /// Maximum longitudinal coordinate (toe extreme).
    pub max_long: f64,
    /// `max_long - min_long`.
    pub extent: f64,
    /// Flat zone starts strictly above this.
    pub flat_y: f64,
    /// Mid zone spans `[mid_y, flat_y]`.
    pub mid_y: f64,
    /// Heel zone lies strictly below this.
    pub heel_y: f64,
    /// Heel blend band spans `[heel_y, heel_falloff_y]`.
    pub heel_falloff_y: f64,
}

impl ZoneCuts {
    /// Compute the cut planes for `mesh`.
    ///
    /// # Errors
    ///
    /// Returns [`ZoneError::EmptyMesh`] for a mesh without vertices and
    /// [`ZoneError::InvalidParameter`] for out-of-range fractions.
    pub fn compute(mesh: &ScanMesh, params: &ZoneParams) -> ZoneResult<Self> {
        if mesh.is_empty() {
            return Err(ZoneError::EmptyMesh);
        }
        params.validate()?;

        let (min_long, max_long) = (0..mesh.vertex_count())
            .map(|i| mesh.longitudinal(i))
            .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), y| {
                (lo.min(y), hi.max(y))
            });
        let extent = max_long - min_long;

        let flat_y = max_long - extent * params.flat_area;
        let mid_y = flat_y - extent * params.falloff / 2.0;
        let heel_y = min_long + extent * params.heel_area;
        let heel_falloff_y = heel_y + extent * params.heel_falloff;

        Ok(Self {
            min_long,
            max_long,
            extent,
            flat_y,
            mid_y,
            heel_y,
            heel_falloff_y,
        })
    }

    /// Zone of `family` containing longitudinal coordinate `long`.
    #[must_use]
    pub fn zone_of(&self, family: ZoneFamily, long: f64) -> Zone {
        match family {
            ZoneFamily::Front => {
                if long > self.flat_y {
                    Zone::Flat
                } else if long >= self.mid_y {
                    Zone::Mid
                } else {
                    Zone::Original
                }
            }
            ZoneFamily::Heel => {
                if long < self.heel_y {
                    Zone::Heel
                } else if long <= self.heel_falloff_y {
                    Zone::HeelMid
                } else {
                    Zone::NonHeel
                }
            }
        }
    }

    /// Membership predicate for `zone`.
    #[must_use]
    pub fn contains(&self, zone: Zone, long: f64) -> bool {
        self.zone_of(zone.family(), long) == zone
    }
}

/// The vertices of one zone together with its anchor vertex.
#[derive(Debug, Clone, PartialEq)]
pub struct ZoneSelection {
    /// The classified zone.
    pub zone: Zone,
    /// Member vertex indices, ascending.
    pub vertices: Vec<u32>,
    /// Extremal vertex whose height the deformer reads: the toe-most vertex
    /// for front zones, the heel-most vertex for heel zones.
    pub anchor: u32,
    /// Cut planes the selection was derived from.
    pub cuts: ZoneCuts,
}

impl ZoneSelection {
    /// Number of member vertices.
    #[must_use]
    pub fn len(&self) -> usize {
        self.vertices.len()
    }

    /// True if no vertex matched.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.vertices.is_empty()
    }

    /// Membership mask over `vertex_count` vertices.
    #[must_use]
    pub fn mask(&self, vertex_count: usize) -> Vec<bool> {
        let mut mask = vec![false; vertex_count];
        for &v in &self.vertices {
            if let Some(slot) = mask.get_mut(v as usize) {
                *slot = true;
            }
        }
        mask
    }
}

/// Classify the vertices of `mesh` belonging to `zone`.
///
/// # Errors
///
/// Returns [`ZoneError::EmptyMesh`] if the mesh has no vertices and
/// [`ZoneError::InvalidParameter`] if `params` is out of range. An empty zone
/// is not an error.
///
/// # Example
///
/// ```
/// use insole_types::{ScanMesh, Point3};
/// use insole_zones::{classify, Zone, ZoneParams};
///
/// let positions: Vec<Point3<f64>> =
///     (0..=8).map(|i| Point3::new(0.0, f64::from(i), 0.0)).collect();
/// let mesh = ScanMesh::from_positions(&positions, Vec::new());
///
/// let flat = classify(&mesh, &ZoneParams::default(), Zone::Flat).unwrap();
/// assert_eq!(flat.vertices, vec![7, 8]);
/// assert_eq!(flat.anchor, 8);
/// ```
#[allow(clippy::cast_possible_truncation)]
pub fn classify(mesh: &ScanMesh, params: &ZoneParams, zone: Zone) -> ZoneResult<ZoneSelection> {
    let cuts = ZoneCuts::compute(mesh, params)?;

    let vertices: Vec<u32> = (0..mesh.vertex_count())
        .filter(|&i| cuts.contains(zone, mesh.longitudinal(i)))
        .map(|i| i as u32)
        .collect();

    let anchor = anchor_vertex(mesh, zone.family());

    debug!(
        zone = %zone,
        members = vertices.len(),
        anchor,
        flat_y = cuts.flat_y,
        mid_y = cuts.mid_y,
        heel_y = cuts.heel_y,
        heel_falloff_y = cuts.heel_falloff_y,
        "classified zone"
    );

    Ok(ZoneSelection {
        zone,
        vertices,
        anchor,
        cuts,
    })
}

/// Extremal vertex for a zone family; first encountered wins ties.
///
/// The mesh must be non-empty.
#[allow(clippy::cast_possible_truncation)]
fn anchor_vertex(mesh: &ScanMesh, family: ZoneFamily) -> u32 {
    let mut best = 0;
    for i in 1..mesh.vertex_count() {
        let better = match family {
            ZoneFamily::Front => mesh.longitudinal(i) > mesh.longitudinal(best),
            ZoneFamily::Heel => mesh.longitudinal(i) < mesh.longitudinal(best),
        };
        if better {
            best = i;
        }
    }
    best as u32
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::cast_precision_loss)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use insole_types::{Axis, AxisFrame, Point3};
    use std::f64::consts::TAU;

    fn line(n: usize) -> ScanMesh {
        let positions: Vec<Point3<f64>> = (0..n)
            .map(|i| Point3::new(0.0, i as f64, 0.0))
            .collect();
        ScanMesh::from_positions(&positions, Vec::new())
    }

    /// 100 vertices on concentric rings of a unit disc in the XY plane.
    fn flat_disc() -> ScanMesh {
        let mut positions = vec![Point3::origin()];
        let rings = [(0.25, 9), (0.5, 18), (0.75, 27), (1.0, 45)];
        for (radius, count) in rings {
            for k in 0..count {
                let theta = TAU * (k as f64 + 0.5) / f64::from(count);
                positions.push(Point3::new(radius * theta.cos(), radius * theta.sin(), 0.0));
            }
        }
        ScanMesh::from_positions(&positions, Vec::new())
    }

    #[test]
    fn empty_mesh_fails() {
        let err = classify(&ScanMesh::new(), &ZoneParams::default(), Zone::Flat).unwrap_err();
        assert!(matches!(err, ZoneError::EmptyMesh));
    }

    #[test]
    fn cut_planes() {
        let cuts = ZoneCuts::compute(&line(101), &ZoneParams::default()).unwrap();
        assert_relative_eq!(cuts.extent, 100.0);
        assert_relative_eq!(cuts.flat_y, 75.0);
        assert_relative_eq!(cuts.mid_y, 62.5);
        assert_relative_eq!(cuts.heel_y, 25.0);
        assert_relative_eq!(cuts.heel_falloff_y, 50.0);
    }

    #[test]
    fn front_zones_on_line() {
        let mesh = line(101);
        let params = ZoneParams::default();
        let flat = classify(&mesh, &params, Zone::Flat).unwrap();
        let mid = classify(&mesh, &params, Zone::Mid).unwrap();
        let original = classify(&mesh, &params, Zone::Original).unwrap();

        assert_eq!(flat.vertices.first(), Some(&76));
        assert_eq!(flat.len(), 25);
        assert_eq!(mid.vertices.first(), Some(&63));
        assert_eq!(mid.vertices.last(), Some(&75));
        assert_eq!(original.vertices.last(), Some(&62));
        assert_eq!(flat.len() + mid.len() + original.len(), 101);
        assert_eq!(flat.anchor, 100);
    }

    #[test]
    fn heel_zones_on_line() {
        let mesh = line(101);
        let params = ZoneParams::default();
        let heel = classify(&mesh, &params, Zone::Heel).unwrap();
        let heel_mid = classify(&mesh, &params, Zone::HeelMid).unwrap();
        let non_heel = classify(&mesh, &params, Zone::NonHeel).unwrap();

        assert_eq!(heel.len(), 25);
        assert_eq!(heel_mid.vertices.first(), Some(&25));
        assert_eq!(heel_mid.vertices.last(), Some(&50));
        assert_eq!(non_heel.vertices.first(), Some(&51));
        assert_eq!(heel.anchor, 0);
    }

    #[test]
    fn flat_disc_top_quarter() {
        let mesh = flat_disc();
        assert_eq!(mesh.vertex_count(), 100);
        let params = ZoneParams::default().with_flat_area(0.25).with_falloff(0.1);
        let flat = classify(&mesh, &params, Zone::Flat).unwrap();

        let bounds = mesh.local_bounds();
        let threshold = bounds.max.y - 0.25 * bounds.extent(Axis::Y);
        let expected: Vec<u32> = (0..100u32)
            .filter(|&i| mesh.vertices[i as usize].position.y > threshold)
            .collect();

        assert!(!expected.is_empty());
        assert_eq!(flat.vertices, expected);
    }

    #[test]
    fn merged_falloffs_leave_zone_empty() {
        let params = ZoneParams::default()
            .with_heel_area(1.0)
            .with_heel_falloff(1.0);
        let non_heel = classify(&line(10), &params, Zone::NonHeel).unwrap();
        assert!(non_heel.is_empty());
    }

    #[test]
    fn anchor_ties_first_wins() {
        let mesh = ScanMesh::from_positions(
            &[
                Point3::new(0.0, 0.0, 0.0),
                Point3::new(1.0, 5.0, 0.0),
                Point3::new(2.0, 5.0, 0.0),
                Point3::new(3.0, 0.0, 0.0),
            ],
            Vec::new(),
        );
        let flat = classify(&mesh, &ZoneParams::default(), Zone::Flat).unwrap();
        assert_eq!(flat.anchor, 1);
        let heel = classify(&mesh, &ZoneParams::default(), Zone::Heel).unwrap();
        assert_eq!(heel.anchor, 0);
    }

    #[test]
    fn respects_axis_frame() {
        let positions: Vec<Point3<f64>> = (0..5)
            .map(|i| Point3::new(f64::from(i), 0.0, 0.0))
            .collect();
        let mesh = ScanMesh::from_positions(&positions, Vec::new()).with_axes(AxisFrame {
            longitudinal: Axis::X,
            lateral: Axis::Y,
            vertical: Axis::Z,
        });
        let flat = classify(&mesh, &ZoneParams::default(), Zone::Flat).unwrap();
        assert_eq!(flat.vertices, vec![4]);
    }

    #[test]
    fn mask_marks_members() {
        let flat = classify(&line(8), &ZoneParams::default(), Zone::Flat).unwrap();
        let mask = flat.mask(8);
        assert_eq!(mask.iter().filter(|&&m| m).count(), flat.len());
        assert!(mask[7]);
    }
}
