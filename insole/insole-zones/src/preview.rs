//! Per-vertex zone labelling for live previews.

use hashbrown::HashMap;
use insole_types::ScanMesh;
use tracing::{debug, warn};

use crate::classify::ZoneCuts;
use crate::error::ZoneResult;
use crate::params::ZoneParams;
use crate::zone::{Zone, ZoneFamily};

/// Zone label of every vertex for one zone family.
///
/// The presentation layer recomputes this after each parameter edit and
/// colours vertices by label.
#[derive(Debug, Clone)]
pub struct ZonePreview {
    family: ZoneFamily,
    labels: Vec<Zone>,
    counts: HashMap<Zone, usize>,
    cuts: ZoneCuts,
}

impl ZonePreview {
    /// Family the preview partitions.
    #[must_use]
    pub const fn family(&self) -> ZoneFamily {
        self.family
    }

    /// Label per vertex, in vertex order.
    #[must_use]
    pub fn labels(&self) -> &[Zone] {
        &self.labels
    }

    /// Label of one vertex.
    #[must_use]
    pub fn zone_of(&self, vertex: usize) -> Option<Zone> {
        self.labels.get(vertex).copied()
    }

    /// Number of vertices labelled `zone`.
    #[must_use]
    pub fn count(&self, zone: Zone) -> usize {
        self.counts.get(&zone).copied().unwrap_or(0)
    }

    /// Indices of vertices labelled `zone`.
    #[must_use]
    #[allow(clippy::cast_possible_truncation)]
    pub fn vertices_in(&self, zone: Zone) -> Vec<u32> {
        self.labels
            .iter()
            .enumerate()
            .filter(|(_, z)| **z == zone)
            .map(|(i, _)| i as u32)
            .collect()
    }

    /// Cut planes the labels were derived from.
    #[must_use]
    pub const fn cuts(&self) -> &ZoneCuts {
        &self.cuts
    }
}

/// Label every vertex with its zone in `family`.
///
/// # Errors
///
/// Same conditions as [`classify`](crate::classify).
///
/// # Example
///
/// ```
/// use insole_types::{ScanMesh, Point3};
/// use insole_zones::{recompute_preview, Zone, ZoneFamily, ZoneParams};
///
/// let positions: Vec<Point3<f64>> =
///     (0..=8).map(|i| Point3::new(0.0, f64::from(i), 0.0)).collect();
/// let mesh = ScanMesh::from_positions(&positions, Vec::new());
///
/// let preview = recompute_preview(&mesh, &ZoneParams::default(), ZoneFamily::Front).unwrap();
/// assert_eq!(preview.zone_of(8), Some(Zone::Flat));
/// assert_eq!(preview.zone_of(0), Some(Zone::Original));
/// ```
pub fn recompute_preview(
    mesh: &ScanMesh,
    params: &ZoneParams,
    family: ZoneFamily,
) -> ZoneResult<ZonePreview> {
    let cuts = ZoneCuts::compute(mesh, params)?;

    let labels: Vec<Zone> = (0..mesh.vertex_count())
        .map(|i| cuts.zone_of(family, mesh.longitudinal(i)))
        .collect();

    let mut counts: HashMap<Zone, usize> = HashMap::new();
    for &zone in &labels {
        *counts.entry(zone).or_insert(0) += 1;
    }

    for zone in family.zones() {
        if !counts.contains_key(&zone) {
            warn!(zone = %zone, "zone is empty for current parameters");
        }
    }
    debug!(?family, ?counts, "recomputed zone preview");

    Ok(ZonePreview {
        family,
        labels,
        counts,
        cuts,
    })
}
