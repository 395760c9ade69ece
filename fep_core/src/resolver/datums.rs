//! Partition datum planes, column hole cuts and analysis reference points.

use serde::{Deserialize, Serialize};

use super::{BoltGeometry, BoltLayout, Part, Placements, SectionDims, Side};
use crate::geometry::{PrincipalPlane, Vec3, GEOM_TOL};
use crate::params::JointDesignParams;

/// Cut depth past the inner flange face so column holes go fully through.
pub const HOLE_OVERCUT_MM: f64 = 10.0;

/// Part-local offset plane used to partition a part for meshing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DatumPlane {
    pub part: Part,
    pub plane: PrincipalPlane,
    pub offset_mm: f64,
    pub purpose: String,
}

/// Cylindrical cut through the column bearing flange, in column-local
/// coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HoleCut {
    pub row: u8,
    pub side: Side,
    /// Centre on the outer flange face
    pub centre: Vec3,
    /// Cut direction (into the flange)
    pub direction: Vec3,
    pub diameter_mm: f64,
    pub depth_mm: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ReferenceRole {
    /// Beam load section control point
    BeamLoad,
    ColumnTop,
    ColumnBase,
}

/// Assembly-level control point for a rigid-body coupling.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReferencePoint {
    pub name: String,
    pub role: ReferenceRole,
    pub position: Vec3,
}

struct PlaneSet {
    part: Part,
    plane: PrincipalPlane,
    planes: Vec<DatumPlane>,
}

impl PlaneSet {
    fn new(part: Part, plane: PrincipalPlane) -> Self {
        PlaneSet { part, plane, planes: Vec::new() }
    }

    /// Add a plane unless one already sits at the same offset.
    fn push(&mut self, offset_mm: f64, purpose: impl Into<String>) {
        if self.planes.iter().any(|d| (d.offset_mm - offset_mm).abs() < GEOM_TOL) {
            return;
        }
        self.planes.push(DatumPlane {
            part: self.part,
            plane: self.plane,
            offset_mm,
            purpose: purpose.into(),
        });
    }
}

/// Datum planes for every part, in part-local coordinates.
///
/// Planes at coincident offsets are emitted once.
pub fn derive_datum_planes(
    params: &JointDesignParams,
    column: &SectionDims,
    layout: &BoltLayout,
    bolt: &BoltGeometry,
) -> Vec<DatumPlane> {
    let mut out = Vec::new();

    let mut bolt_xy = PlaneSet::new(Part::Bolt, PrincipalPlane::XY);
    bolt_xy.push(0.0, "nut / shank");
    bolt_xy.push(bolt.grip_length_mm, "shank / head");
    let mut bolt_yz = PlaneSet::new(Part::Bolt, PrincipalPlane::YZ);
    bolt_yz.push(0.0, "bolt axis");
    let mut bolt_xz = PlaneSet::new(Part::Bolt, PrincipalPlane::XZ);
    bolt_xz.push(0.0, "bolt axis");

    // Column local Z runs down from the column top.
    let col = &params.column;
    let mid = col.length_mm / 2.0;
    let mut col_xz = PlaneSet::new(Part::Column, PrincipalPlane::XZ);
    col_xz.push(column.top_flange_inner_mm, "bearing flange / web");
    col_xz.push(-column.bottom_flange_inner_mm, "back flange / web");
    let mut col_xy = PlaneSet::new(Part::Column, PrincipalPlane::XY);
    for row in &layout.rows {
        col_xy.push(mid - row.y_mm, format!("bolt row {}", row.index));
    }
    col_xy.push(mid - params.end_plate.height_mm / 2.0, "end plate top");
    col_xy.push(mid + params.end_plate.height_mm / 2.0, "end plate bottom");
    let mut col_yz = PlaneSet::new(Part::Column, PrincipalPlane::YZ);
    let mut plate_yz = PlaneSet::new(Part::EndPlate, PrincipalPlane::YZ);
    plate_yz.push(0.0, "plate centre");
    let mut plate_xz = PlaneSet::new(Part::EndPlate, PrincipalPlane::XZ);
    plate_xz.push(0.0, "plate centre");
    for row in &layout.rows {
        for x in row.x_positions() {
            col_yz.push(x, format!("bolt gauge {}", row.gauge_mm));
            plate_yz.push(x, format!("bolt gauge {}", row.gauge_mm));
        }
        plate_xz.push(row.y_mm, format!("bolt row {}", row.index));
    }

    let mut beam_xy = PlaneSet::new(Part::Beam, PrincipalPlane::XY);
    beam_xy.push(params.beam.length_mm / 6.0, "joint zone");
    beam_xy.push(params.load.load_distance_mm - params.end_plate.thickness_mm, "load section");

    for set in [bolt_xy, bolt_yz, bolt_xz, col_xz, col_xy, col_yz, plate_yz, plate_xz, beam_xy] {
        out.extend(set.planes);
    }
    out
}

/// Hole cuts through the column bearing flange, one per bolt.
pub fn derive_column_holes(
    params: &JointDesignParams,
    layout: &BoltLayout,
    bolt: &BoltGeometry,
) -> Vec<HoleCut> {
    let col = &params.column;
    let mid = col.length_mm / 2.0;
    layout
        .bolt_positions()
        .map(|(row, x, y)| HoleCut {
            row,
            side: if x < 0.0 { Side::Left } else { Side::Right },
            centre: Vec3::new(x, col.depth_mm / 2.0, mid - y),
            direction: -Vec3::Y,
            diameter_mm: bolt.hole_diameter_mm,
            depth_mm: col.flange_top_thickness_mm + HOLE_OVERCUT_MM,
        })
        .collect()
}

/// Beam load point and column end control points.
pub fn derive_reference_points(
    params: &JointDesignParams,
    placements: &Placements,
) -> Vec<ReferencePoint> {
    let face_z = placements.column_face_z_mm();
    let load_z = face_z + params.load.load_distance_mm;
    vec![
        ReferencePoint {
            name: "RP-1".to_string(),
            role: ReferenceRole::BeamLoad,
            position: Vec3::new(0.0, placements.joint_height_mm(), load_z),
        },
        ReferencePoint {
            name: "RP-2".to_string(),
            role: ReferenceRole::ColumnTop,
            position: Vec3::new(0.0, params.column.length_mm, 0.0),
        },
        ReferencePoint {
            name: "RP-3".to_string(),
            role: ReferenceRole::ColumnBase,
            position: Vec3::ZERO,
        },
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resolver::resolve;

    #[test]
    fn test_bolt_partition_planes() {
        let params = JointDesignParams::default();
        let geometry = resolve(&params).unwrap();
        let bolt_xy: Vec<f64> = geometry
            .datum_planes
            .iter()
            .filter(|d| d.part == Part::Bolt && d.plane == PrincipalPlane::XY)
            .map(|d| d.offset_mm)
            .collect();
        assert_eq!(bolt_xy, vec![0.0, 20.0]);
    }

    #[test]
    fn test_coincident_gauges_deduplicated() {
        let params = JointDesignParams::default();
        let geometry = resolve(&params).unwrap();
        let plate_yz = geometry
            .datum_planes
            .iter()
            .filter(|d| d.part == Part::EndPlate && d.plane == PrincipalPlane::YZ)
            .count();
        // Centre plus +/- gauge/2.
        assert_eq!(plate_yz, 3);
    }

    #[test]
    fn test_column_row_planes() {
        let params = JointDesignParams::default();
        let geometry = resolve(&params).unwrap();
        let mut col_xy: Vec<f64> = geometry
            .datum_planes
            .iter()
            .filter(|d| d.part == Part::Column && d.plane == PrincipalPlane::XY)
            .map(|d| d.offset_mm)
            .collect();
        col_xy.sort_by(|a, b| a.total_cmp(b));
        assert_eq!(col_xy, vec![620.0, 685.0, 750.0, 815.0, 880.0]);
    }

    #[test]
    fn test_holes_through_bearing_flange() {
        let params = JointDesignParams::default();
        let geometry = resolve(&params).unwrap();
        assert_eq!(geometry.holes.len(), 6);
        let first = &geometry.holes[0];
        assert_eq!(first.centre, Vec3::new(-35.0, 120.0, 685.0));
        assert_eq!(first.depth_mm, 22.0);
        assert_eq!(first.diameter_mm, 18.0);
    }

    #[test]
    fn test_hole_centres_match_bolt_axes() {
        let params = JointDesignParams::default();
        let geometry = resolve(&params).unwrap();
        for (hole, bolt) in geometry.holes.iter().zip(&geometry.placements.bolt_instances) {
            let on_face = geometry.placements.column.apply(hole.centre);
            assert!((on_face.x - bolt.placement.translation.x).abs() < GEOM_TOL);
            assert!((on_face.y - bolt.placement.translation.y).abs() < GEOM_TOL);
        }
    }

    #[test]
    fn test_reference_points() {
        let params = JointDesignParams::default();
        let geometry = resolve(&params).unwrap();
        let load = &geometry.reference_points[0];
        assert_eq!(load.role, ReferenceRole::BeamLoad);
        assert_eq!(load.position, Vec3::new(0.0, 750.0, 1590.0));
    }
}
