//! Property-based tests for the session pipeline.
//!
//! Run with: cargo test -p insole -- proptest

#![allow(clippy::unwrap_used)]

use insole::prelude::*;
use insole::template::classify_side;
use proptest::prelude::*;

// =============================================================================
// Strategies
// =============================================================================

fn arb_cloud() -> impl Strategy<Value = ScanMesh> {
    prop::collection::vec(prop::array::uniform3(-100.0..100.0f64), 2..80).prop_map(|coords| {
        let positions: Vec<Point3<f64>> = coords
            .into_iter()
            .map(|[x, y, z]| Point3::new(x, y, z))
            .collect();
        ScanMesh::from_positions(&positions, Vec::new())
    })
}

fn sheet() -> ScanMesh {
    let mut positions = Vec::new();
    let mut faces = Vec::new();
    for j in 0..=20u32 {
        for i in 0..=5u32 {
            let y = f64::from(j) * 10.0;
            positions.push(Point3::new(f64::from(i) * 10.0, y, (y / 45.0).sin() * 2.0));
            if i < 5 && j < 20 {
                let v = j * 6 + i;
                faces.push([v, v + 1, v + 7]);
                faces.push([v, v + 7, v + 6]);
            }
        }
    }
    ScanMesh::from_positions(&positions, faces)
}

// =============================================================================
// Properties
// =============================================================================

proptest! {
    #[test]
    fn proptest_mirroring_flips_side(mesh in arb_cloud()) {
        let b = mesh.world_bounds();
        // Skip clouds balanced on the origin, where both mirrors read Left.
        prop_assume!((b.min.x.abs() - b.max.x.abs()).abs() > 1e-9);

        let side = classify_side(&mesh).unwrap();
        let flipped = classify_side(&mesh.mirrored(Axis::X)).unwrap();
        prop_assert_eq!(flipped, side.opposite());
    }

    #[test]
    fn proptest_twist_converges(angle in -0.4..0.4f64) {
        let mut session = InsoleSession::new(sheet());
        session.set_twist_zone(Zone::Flat);
        session.twist(angle).unwrap();
        let once = session.mesh().clone();

        prop_assert_eq!(session.twist(angle).unwrap(), 0);
        prop_assert_eq!(session.mesh(), &once);
        prop_assert_eq!(session.twist_state().cumulative_angle(), angle);
    }

    #[test]
    fn proptest_cleanup_is_idempotent(mesh in arb_cloud()) {
        let mut session = InsoleSession::new(mesh);
        session.cleanup().unwrap();
        let once = session.mesh().clone();
        prop_assert_eq!(session.cleanup().unwrap(), 0);
        prop_assert_eq!(session.mesh(), &once);
    }
}
