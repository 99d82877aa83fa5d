//! The interactive insole workflow.

use insole_morph::{TwistSession, flatten_zone, smooth_laplacian};
use insole_repair::{extrude_base, fill_holes, prune_about_centroid};
use insole_template::{
    CurveRig, FittedOutline, FrontRig, Laterality, build_front_rig, classify_side, fit_outline,
};
use insole_types::ScanMesh;
use insole_zones::{Zone, ZoneFamily, ZonePreview, recompute_preview};
use tracing::{debug, info};

use crate::{InsoleError, InsoleParams, InsoleResult};

/// One scan on its way to becoming an insole.
///
/// The session owns the working mesh, the settings and the state that
/// carries over between steps (the twist applied so far, the detected side,
/// the fitted outline and its rigs). Every step either commits completely or
/// fails without changing anything.
///
/// A typical run is `cleanup`, `smooth`, `flatten_front`, a few `twist`
/// requests, `fill_holes`, `fit_outline`, rig edits, and finally
/// `extrude_base`.
///
/// # Example
///
/// ```
/// use insole::InsoleSession;
/// use insole::types::{ScanMesh, Point3};
///
/// let mut positions = Vec::new();
/// let mut faces = Vec::new();
/// for j in 0..=20u32 {
///     for i in 0..=4u32 {
///         let y = f64::from(j) * 10.0;
///         positions.push(Point3::new(f64::from(i) * 10.0, y, (y / 40.0).sin()));
///         if i < 4 && j < 20 {
///             let v = j * 5 + i;
///             faces.push([v, v + 1, v + 6]);
///             faces.push([v, v + 6, v + 5]);
///         }
///     }
/// }
///
/// let mut session = InsoleSession::new(ScanMesh::from_positions(&positions, faces));
/// session.cleanup().unwrap();
/// session.flatten_front().unwrap();
/// session.fit_outline().unwrap();
/// let walls = session.extrude_base().unwrap();
/// assert!(walls > 0);
/// ```
#[derive(Debug, Clone)]
pub struct InsoleSession {
    mesh: ScanMesh,
    params: InsoleParams,
    twist: TwistSession,
    side: Option<Laterality>,
    outline: Option<FittedOutline>,
    curve_rig: Option<CurveRig>,
    front_rig: Option<FrontRig>,
}

impl InsoleSession {
    /// Start a session with default settings.
    #[must_use]
    pub fn new(mesh: ScanMesh) -> Self {
        let params = InsoleParams::default();
        Self {
            mesh,
            params,
            twist: TwistSession::new(params.twist_axis),
            side: None,
            outline: None,
            curve_rig: None,
            front_rig: None,
        }
    }

    /// Start a session with `params`.
    ///
    /// # Errors
    ///
    /// See [`InsoleParams::validate`].
    pub fn with_params(mesh: ScanMesh, params: InsoleParams) -> InsoleResult<Self> {
        params.validate()?;
        let mut session = Self::new(mesh);
        session.twist = TwistSession::new(params.twist_axis);
        session.params = params;
        Ok(session)
    }

    // =========================================================================
    // State
    // =========================================================================

    /// The working mesh.
    #[must_use]
    pub const fn mesh(&self) -> &ScanMesh {
        &self.mesh
    }

    /// End the session, returning the mesh.
    #[must_use]
    pub fn into_mesh(self) -> ScanMesh {
        self.mesh
    }

    /// Current settings.
    #[must_use]
    pub const fn params(&self) -> &InsoleParams {
        &self.params
    }

    /// Replace the settings. Changing the twist axis forgets the applied
    /// twist angle.
    ///
    /// # Errors
    ///
    /// See [`InsoleParams::validate`]; the old settings stay in place.
    pub fn set_params(&mut self, params: InsoleParams) -> InsoleResult<()> {
        params.validate()?;
        if params.twist_axis != self.params.twist_axis {
            self.twist = TwistSession::new(params.twist_axis);
        }
        self.params = params;
        Ok(())
    }

    /// Twist bookkeeping.
    #[must_use]
    pub const fn twist_state(&self) -> &TwistSession {
        &self.twist
    }

    /// Side found by the last [`detect_side`](Self::detect_side).
    #[must_use]
    pub const fn side(&self) -> Option<Laterality> {
        self.side
    }

    /// The fitted outline, once [`fit_outline`](Self::fit_outline) ran.
    #[must_use]
    pub const fn outline(&self) -> Option<&FittedOutline> {
        self.outline.as_ref()
    }

    /// The outline's rig, once [`fit_outline`](Self::fit_outline) ran.
    #[must_use]
    pub const fn curve_rig(&self) -> Option<&CurveRig> {
        self.curve_rig.as_ref()
    }

    /// Mutable outline rig for anchor and handle edits.
    ///
    /// # Errors
    ///
    /// [`InsoleError::NoOutline`] before [`fit_outline`](Self::fit_outline).
    pub fn curve_rig_mut(&mut self) -> InsoleResult<&mut CurveRig> {
        self.curve_rig.as_mut().ok_or(InsoleError::NoOutline)
    }

    /// The front cage, once [`fit_outline`](Self::fit_outline) ran.
    #[must_use]
    pub const fn front_rig(&self) -> Option<&FrontRig> {
        self.front_rig.as_ref()
    }

    /// Mutable front cage for anchor edits.
    ///
    /// # Errors
    ///
    /// [`InsoleError::NoOutline`] before [`fit_outline`](Self::fit_outline).
    pub fn front_rig_mut(&mut self) -> InsoleResult<&mut FrontRig> {
        self.front_rig.as_mut().ok_or(InsoleError::NoOutline)
    }

    // =========================================================================
    // Steps
    // =========================================================================

    /// Keep only the component nearest the centroid and recentre the origin.
    /// Returns the number of vertices removed.
    ///
    /// # Errors
    ///
    /// [`InsoleError::Repair`] for an empty or malformed mesh.
    pub fn cleanup(&mut self) -> InsoleResult<usize> {
        let out = prune_about_centroid(&self.mesh)?;
        info!(removed = out.removed_vertices, "Cleanup done");
        self.mesh = out.mesh;
        Ok(out.removed_vertices)
    }

    /// Laplacian smoothing with the configured pass count. Returns the
    /// largest vertex movement.
    ///
    /// # Errors
    ///
    /// [`InsoleError::Morph`] for an empty mesh.
    pub fn smooth(&mut self) -> InsoleResult<f64> {
        let out = smooth_laplacian(&self.mesh, &self.params.smooth_params())?;
        info!(
            iterations = out.iterations_performed,
            max_displacement = out.max_displacement,
            "Smoothing done"
        );
        self.mesh = out.mesh;
        Ok(out.max_displacement)
    }

    /// Label every vertex with its zone in `family`.
    ///
    /// # Errors
    ///
    /// [`InsoleError::Zone`] for an empty mesh.
    pub fn preview(&self, family: ZoneFamily) -> InsoleResult<ZonePreview> {
        Ok(recompute_preview(&self.mesh, &self.params.zones, family)?)
    }

    /// Press the toe zone flat, then clean up. Returns the number of
    /// vertices the flattening moved.
    ///
    /// # Errors
    ///
    /// [`InsoleError::Morph`] if the toe zone is empty, or any cleanup
    /// error.
    pub fn flatten_front(&mut self) -> InsoleResult<usize> {
        let flat = flatten_zone(&self.mesh, &self.params.zones)?;
        let pruned = prune_about_centroid(&flat.mesh)?;
        info!(
            modified = flat.vertices_modified,
            removed = pruned.removed_vertices,
            "Front flattened"
        );
        self.mesh = pruned.mesh;
        Ok(flat.vertices_modified)
    }

    /// Choose the zone later [`twist`](Self::twist) calls rotate. Picking a
    /// different zone starts its angle from zero.
    pub fn set_twist_zone(&mut self, zone: Zone) {
        self.twist.set_zone(zone);
    }

    /// Rotate the twist zone so its total applied angle is `angle` radians.
    /// Returns the number of vertices moved.
    ///
    /// # Errors
    ///
    /// [`InsoleError::NoTwistZone`] if no zone was chosen, otherwise
    /// deformation errors.
    pub fn twist(&mut self, angle: f64) -> InsoleResult<usize> {
        let zone = self.twist.zone().ok_or(InsoleError::NoTwistZone)?;
        let mut twist = self.twist.clone();
        let out = twist.twist_zone(&self.mesh, &self.params.zones, zone, angle)?;
        debug!(%zone, angle, modified = out.vertices_modified, "Twist applied");
        self.mesh = out.mesh;
        self.twist = twist;
        Ok(out.vertices_modified)
    }

    /// Close every hole in the surface. Returns the number of holes filled.
    ///
    /// # Errors
    ///
    /// [`InsoleError::Repair`] if the mesh has no boundary or a loop cannot
    /// be traced.
    pub fn fill_holes(&mut self) -> InsoleResult<usize> {
        let out = fill_holes(&self.mesh, &self.params.trace_params())?;
        info!(
            holes = out.holes_filled,
            faces = out.faces_added,
            outer = out.outer.vertices.len(),
            "Holes filled"
        );
        self.mesh = out.mesh;
        Ok(out.holes_filled)
    }

    /// Decide whether the scan is a left or right foot and remember it.
    ///
    /// # Errors
    ///
    /// [`InsoleError::Template`] for an empty mesh.
    pub fn detect_side(&mut self) -> InsoleResult<Laterality> {
        let side = classify_side(&self.mesh)?;
        info!(%side, "Side detected");
        self.side = Some(side);
        Ok(side)
    }

    /// Fit the outline template and build both rigs.
    ///
    /// Uses the remembered side, detecting it first if needed.
    ///
    /// # Errors
    ///
    /// Side detection, fitting or cage errors; nothing is committed unless
    /// all three succeed.
    pub fn fit_outline(&mut self) -> InsoleResult<&FittedOutline> {
        let side = match self.side {
            Some(side) => side,
            None => classify_side(&self.mesh)?,
        };
        let fitted = fit_outline(&self.mesh, side)?;
        let front = build_front_rig(&self.mesh, &self.params.zones)?;
        let curve_rig = CurveRig::build(&fitted.curve);

        info!(%side, points = fitted.curve.len(), "Outline fitted");
        self.side = Some(side);
        self.curve_rig = Some(curve_rig);
        self.front_rig = Some(front);
        Ok(self.outline.insert(fitted))
    }

    /// Bake the front cage into the mesh and start a fresh cage.
    ///
    /// # Errors
    ///
    /// [`InsoleError::NoOutline`] before [`fit_outline`](Self::fit_outline),
    /// or cage errors.
    pub fn apply_front_rig(&mut self) -> InsoleResult<()> {
        let rig = self.front_rig.as_ref().ok_or(InsoleError::NoOutline)?;
        let mesh = rig.apply(&self.mesh)?;
        let fresh = build_front_rig(&mesh, &self.params.zones)?;
        info!("Front cage applied");
        self.mesh = mesh;
        self.front_rig = Some(fresh);
        Ok(())
    }

    /// Close the surface into a solid of the configured thickness. Returns
    /// the number of side-wall faces.
    ///
    /// # Errors
    ///
    /// [`InsoleError::Repair`] if the surface has no open boundary.
    pub fn extrude_base(&mut self) -> InsoleResult<usize> {
        let out = extrude_base(&self.mesh, self.params.thickness)?;
        info!(floor = out.floor, walls = out.wall_faces, "Base extruded");
        self.mesh = out.mesh;
        Ok(out.wall_faces)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use insole_morph::TwistAxis;
    use insole_template::CageRegion;
    use insole_types::{Point3, Vector3};

    // Open (cols+1) x (rows+1) grid, 10 mm spacing, gentle bump.
    fn sheet(cols: u32, rows: u32) -> ScanMesh {
        let mut positions = Vec::new();
        let mut faces = Vec::new();
        for j in 0..=rows {
            for i in 0..=cols {
                let x = f64::from(i) * 10.0;
                let y = f64::from(j) * 10.0;
                positions.push(Point3::new(x, y, (y / 30.0).sin() * 3.0));
                if i < cols && j < rows {
                    let v = j * (cols + 1) + i;
                    let w = cols + 1;
                    faces.push([v, v + 1, v + w + 1]);
                    faces.push([v, v + w + 1, v + w]);
                }
            }
        }
        ScanMesh::from_positions(&positions, faces)
    }

    #[test]
    fn cleanup_drops_islands() {
        let mut mesh = sheet(4, 10);
        let n = u32::try_from(mesh.vertex_count()).unwrap();
        for k in 0..3 {
            mesh.vertices
                .push(Point3::new(500.0 + f64::from(k), 0.0, 0.0).into());
        }
        mesh.faces.push([n, n + 1, n + 2]);

        let mut session = InsoleSession::new(mesh);
        assert_eq!(session.cleanup().unwrap(), 3);
        assert_eq!(session.mesh().vertex_count(), 55);
    }

    #[test]
    fn twist_requires_zone() {
        let mut session = InsoleSession::new(sheet(4, 10));
        assert!(matches!(session.twist(0.1), Err(InsoleError::NoTwistZone)));
    }

    #[test]
    fn twist_converges() {
        let mut session = InsoleSession::new(sheet(4, 20));
        session.set_twist_zone(Zone::Flat);
        assert!(session.twist(0.2).unwrap() > 0);
        let after_first = session.mesh().clone();
        assert_eq!(session.twist(0.2).unwrap(), 0);
        assert_eq!(session.mesh(), &after_first);
        assert_eq!(session.twist_state().cumulative_angle(), 0.2);
    }

    #[test]
    fn failed_step_keeps_state() {
        let mut session = InsoleSession::new(sheet(4, 10));
        let before = session.mesh().clone();
        // A closed-off extrusion has no boundary left to wall.
        session.extrude_base().unwrap();
        let solid = session.mesh().clone();
        assert_ne!(solid, before);
        assert!(session.extrude_base().is_err());
        assert_eq!(session.mesh(), &solid);
    }

    #[test]
    fn changing_axis_resets_twist() {
        let mut session = InsoleSession::new(sheet(4, 20));
        session.set_twist_zone(Zone::Flat);
        session.twist(0.1).unwrap();
        let params = InsoleParams::default().with_twist_axis(TwistAxis::Longitudinal);
        session.set_params(params).unwrap();
        assert_eq!(session.twist_state().cumulative_angle(), 0.0);
        assert_eq!(session.twist_state().zone(), None);
    }

    #[test]
    fn bad_params_rejected() {
        let mut session = InsoleSession::new(sheet(2, 2));
        let bad = InsoleParams::default().with_thickness(-3.0);
        assert!(session.set_params(bad).is_err());
        assert_eq!(session.params(), &InsoleParams::default());
        assert!(InsoleSession::with_params(sheet(2, 2), bad).is_err());
    }

    #[test]
    fn rigs_need_outline() {
        let mut session = InsoleSession::new(sheet(4, 10));
        assert!(matches!(session.front_rig_mut(), Err(InsoleError::NoOutline)));
        assert!(matches!(session.apply_front_rig(), Err(InsoleError::NoOutline)));
        session.fit_outline().unwrap();
        assert!(session.side().is_some());
        assert_eq!(session.curve_rig().unwrap().anchors().len(), 8);
    }

    #[test]
    fn front_rig_bakes_and_resets() {
        let mut session = InsoleSession::new(sheet(4, 20));
        session.cleanup().unwrap();
        session.fit_outline().unwrap();

        let rig = session.front_rig_mut().unwrap();
        let at = rig.anchor(CageRegion::Center).position;
        rig.move_anchor(CageRegion::Center, at + Vector3::new(0.0, 0.0, 5.0));
        let before = session.mesh().clone();
        session.apply_front_rig().unwrap();

        assert_ne!(session.mesh(), &before);
        assert!(!session.front_rig().unwrap().is_deformed());
    }
}
