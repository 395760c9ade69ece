//! Property-based tests for resolver and material invariants using the
//! `proptest` crate.

use proptest::prelude::*;

use fep_core::features::{locate, FeatureKind, FeatureTag};
use fep_core::geometry::{PrincipalPlane, Vec3, GEOM_TOL};
use fep_core::materials::PlasticityCurve;
use fep_core::params::{EdgeDistancePolicy, JointDesignParams, SectionParams};
use fep_core::resolver::{
    derive_bolt_hole_diameter, derive_row_offsets, derive_section_dims, resolve, Member, Part,
    ResolvedGeometry,
};

// ---------------------------------------------------------------------------
// Strategy helpers
// ---------------------------------------------------------------------------

/// I-sections whose flanges are thinner than the depth and wider than the web.
fn arb_section() -> impl Strategy<Value = SectionParams> {
    (
        50.0f64..300.0,
        2.0f64..25.0,
        50.0f64..300.0,
        2.0f64..25.0,
        100.0f64..600.0,
        2.0f64..20.0,
        100.0f64..3000.0,
    )
        .prop_map(|(wt, tt, wb, tb, depth, tw, length)| SectionParams {
            flange_top_width_mm: wt,
            flange_top_thickness_mm: tt,
            flange_bottom_width_mm: wb,
            flange_bottom_thickness_mm: tb,
            depth_mm: depth,
            web_thickness_mm: tw,
            length_mm: length,
        })
}

/// Z-variations the reference specimen accepts under either policy.
fn arb_z() -> impl Strategy<Value = f64> {
    -20.0f64..20.0
}

fn arb_policy() -> impl Strategy<Value = EdgeDistancePolicy> {
    prop_oneof![
        Just(EdgeDistancePolicy::Compensating),
        Just(EdgeDistancePolicy::Fixed)
    ]
}

/// Valid hardening curve: strictly increasing strain from zero,
/// non-decreasing stress.
fn arb_curve() -> impl Strategy<Value = PlasticityCurve> {
    (
        100.0f64..600.0,
        prop::collection::vec((0.0f64..50.0, 0.001f64..0.05), 1..8),
    )
        .prop_map(|(yield_mpa, steps)| {
            let mut pairs = vec![(yield_mpa, 0.0)];
            let (mut stress, mut strain) = (yield_mpa, 0.0);
            for (ds, de) in steps {
                stress += ds;
                strain += de;
                pairs.push((stress, strain));
            }
            PlasticityCurve::from_pairs(&pairs)
        })
}

const TOL: f64 = 1e-9;

// ---------------------------------------------------------------------------
// Sections
// ---------------------------------------------------------------------------

proptest! {
    #[test]
    fn web_height_is_depth_minus_flanges(section in arb_section()) {
        let dims = derive_section_dims(Member::Column, &section).unwrap();
        let expected = section.depth_mm
            - section.flange_top_thickness_mm
            - section.flange_bottom_thickness_mm;
        prop_assert!((dims.web_height_mm - expected).abs() < TOL);
        prop_assert!(dims.web_height_mm > 0.0);
        prop_assert!(dims.flange_centroid_distance_mm > dims.web_height_mm);
        prop_assert!(dims.flange_centroid_distance_mm < section.depth_mm);
    }
}

proptest! {
    #[test]
    fn flanges_filling_the_depth_are_rejected(section in arb_section(), extra in 0.01f64..50.0) {
        let mut bad = section;
        bad.flange_bottom_thickness_mm = bad.depth_mm - bad.flange_top_thickness_mm + extra;
        prop_assert!(derive_section_dims(Member::Beam, &bad).is_err());
    }
}

// ---------------------------------------------------------------------------
// Bolts and rows
// ---------------------------------------------------------------------------

proptest! {
    #[test]
    fn hole_is_larger_than_bolt(d in 6.0f64..40.0, c in 0.1f64..5.0) {
        let hole = derive_bolt_hole_diameter(d, c).unwrap();
        prop_assert!((hole - (d + c)).abs() < TOL);
        prop_assert!(hole > d);
    }
}

proptest! {
    #[test]
    fn non_positive_clearance_is_rejected(d in 6.0f64..40.0, c in -5.0f64..=0.0) {
        prop_assert!(derive_bolt_hole_diameter(d, c).is_err());
    }
}

proptest! {
    #[test]
    fn row_gap_is_independent_of_z(
        n2 in 30.0f64..100.0,
        gap in 30.0f64..100.0,
        z in -25.0f64..25.0,
    ) {
        let n3 = n2 + gap;
        let base = derive_row_offsets(n2, n3, 0.0).unwrap();
        let shifted = derive_row_offsets(n2, n3, z).unwrap();
        prop_assert!((shifted.row2_to_row3_mm - base.row2_to_row3_mm).abs() < TOL);
        prop_assert!((shifted.row2_mm - (n2 + z)).abs() < TOL);
        prop_assert!(shifted.row2_mm < shifted.row3_mm);
    }
}

// ---------------------------------------------------------------------------
// Full resolution
// ---------------------------------------------------------------------------

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn resolution_is_deterministic(z in arb_z(), policy in arb_policy()) {
        let mut params = JointDesignParams::default();
        params.end_plate.z_variation_mm = z;
        params.end_plate.edge_distance_policy = policy;
        let a = resolve(&params).unwrap();
        let b = resolve(&params).unwrap();
        prop_assert_eq!(a, b);
    }

    #[test]
    fn bolts_stay_inside_the_plate(z in arb_z(), policy in arb_policy()) {
        let mut params = JointDesignParams::default();
        params.end_plate.z_variation_mm = z;
        params.end_plate.edge_distance_policy = policy;
        let g = resolve(&params).unwrap();
        let (hw, hh) = (params.end_plate.width_mm / 2.0, params.end_plate.height_mm / 2.0);
        let r = g.bolt.hole_diameter_mm / 2.0;
        for (_, x, y) in g.layout.bolt_positions() {
            prop_assert!(x.abs() + r <= hw + GEOM_TOL);
            prop_assert!(y.abs() + r <= hh + GEOM_TOL);
        }
    }

    #[test]
    fn column_holes_line_up_with_bolts(z in arb_z(), policy in arb_policy()) {
        let mut params = JointDesignParams::default();
        params.end_plate.z_variation_mm = z;
        params.end_plate.edge_distance_policy = policy;
        let g = resolve(&params).unwrap();
        prop_assert_eq!(g.holes.len(), g.placements.bolt_instances.len());
        for (hole, bolt) in g.holes.iter().zip(&g.placements.bolt_instances) {
            let on_face = g.placements.column.apply(hole.centre);
            prop_assert!((on_face.x - bolt.placement.translation.x).abs() < GEOM_TOL);
            prop_assert!((on_face.y - bolt.placement.translation.y).abs() < GEOM_TOL);
        }
    }

    #[test]
    fn compensating_policy_keeps_lower_rows_in_place(z in arb_z()) {
        let reference = resolve(&JointDesignParams::default()).unwrap();
        let mut params = JointDesignParams::default();
        params.end_plate.z_variation_mm = z;
        let g = resolve(&params).unwrap();
        prop_assert!((g.layout.rows[1].y_mm - reference.layout.rows[1].y_mm).abs() < GEOM_TOL);
        prop_assert!((g.layout.rows[2].y_mm - reference.layout.rows[2].y_mm).abs() < GEOM_TOL);
        prop_assert_eq!(g.notes.is_empty(), z == 0.0);
    }
}

// ---------------------------------------------------------------------------
// Feature pick points
// ---------------------------------------------------------------------------

/// Reference specimen with a shifted top row and resized members.
fn arb_params() -> impl Strategy<Value = JointDesignParams> {
    (arb_z(), arb_policy(), 1000.0f64..2500.0, 1500.0f64..3000.0).prop_map(
        |(z, policy, column_length, beam_length)| {
            let mut params = JointDesignParams::default();
            params.end_plate.z_variation_mm = z;
            params.end_plate.edge_distance_policy = policy;
            params.column.length_mm = column_length;
            params.beam.length_mm = beam_length;
            params
        },
    )
}

const PARTITIONED_REGIONS: [FeatureTag; 10] = [
    FeatureTag::EndPlateBeamFace,
    FeatureTag::ColumnTopSection,
    FeatureTag::ColumnBaseSection,
    FeatureTag::ColumnFlangeCells,
    FeatureTag::ColumnWebCells,
    FeatureTag::BeamTopFlangeFaces,
    FeatureTag::BeamBottomFlangeFaces,
    FeatureTag::BeamWebFaces,
    FeatureTag::EndPlateCells,
    FeatureTag::BoltCells,
];

fn datums_through(g: &ResolvedGeometry, part: Part, p: &Vec3) -> usize {
    g.datum_planes_of(part)
        .filter(|d| (p.component(d.plane.normal_axis()) - d.offset_mm).abs() < GEOM_TOL)
        .count()
}

fn plate_offsets(g: &ResolvedGeometry, plane: PrincipalPlane) -> Vec<f64> {
    g.datum_planes_of(Part::EndPlate)
        .filter(|d| d.plane == plane)
        .map(|d| d.offset_mm)
        .collect()
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn region_picks_sit_inside_partition_cells(params in arb_params()) {
        let g = resolve(&params).unwrap();
        for tag in PARTITIONED_REGIONS {
            let loc = locate(&tag, &g).unwrap();
            prop_assert!(matches!(loc.kind, FeatureKind::Face | FeatureKind::Cell));
            let part = tag.part().unwrap();
            for p in &loc.points {
                prop_assert_eq!(
                    datums_through(&g, part, p),
                    0,
                    "{:?} pick point {} on a partition",
                    tag,
                    p
                );
            }
        }
    }

    #[test]
    fn tied_plate_face_is_fully_covered(params in arb_params()) {
        let g = resolve(&params).unwrap();
        let face = locate(&FeatureTag::EndPlateBeamFace, &g).unwrap();
        let xs = plate_offsets(&g, PrincipalPlane::YZ);
        let ys = plate_offsets(&g, PrincipalPlane::XZ);
        let mut cells: Vec<(usize, usize)> = face
            .points
            .iter()
            .map(|p| {
                (
                    xs.iter().filter(|o| p.x > **o).count(),
                    ys.iter().filter(|o| p.y > **o).count(),
                )
            })
            .collect();
        cells.sort();
        cells.dedup();
        prop_assert_eq!(cells.len(), (xs.len() + 1) * (ys.len() + 1));
    }

    #[test]
    fn joint_zone_edges_avoid_partition_planes(params in arb_params()) {
        let g = resolve(&params).unwrap();
        for (tag, part) in [
            (FeatureTag::ColumnJointZoneEdges, Part::Column),
            (FeatureTag::BeamJointZoneEdges, Part::Beam),
            (FeatureTag::BeamEndEdges, Part::Beam),
        ] {
            let loc = locate(&tag, &g).unwrap();
            prop_assert_eq!(loc.kind, FeatureKind::Edge);
            for p in &loc.points {
                prop_assert_eq!(
                    datums_through(&g, part, p),
                    0,
                    "{:?} pick point {} on a partition",
                    tag,
                    p
                );
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Materials
// ---------------------------------------------------------------------------

proptest! {
    #[test]
    fn valid_curves_interpolate_monotonically(
        curve in arb_curve(),
        a in 0.0f64..0.5,
        b in 0.0f64..0.5,
    ) {
        prop_assert!(curve.validate("Steel").is_ok());
        let (lo, hi) = if a <= b { (a, b) } else { (b, a) };
        prop_assert!(curve.stress_at(lo) <= curve.stress_at(hi) + TOL);
        prop_assert!(curve.stress_at(lo) >= curve.yield_stress_mpa() - TOL);
        prop_assert!(curve.stress_at(hi) <= curve.ultimate_stress_mpa() + TOL);
    }
}

proptest! {
    #[test]
    fn repeated_strain_is_rejected(curve in arb_curve()) {
        let mut pairs = curve.as_table();
        let last = pairs[pairs.len() - 1];
        pairs.push((last.0 + 10.0, last.1));
        prop_assert!(PlasticityCurve::from_pairs(&pairs).validate("Steel").is_err());
    }
}
