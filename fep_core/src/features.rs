//! # Semantic Features
//!
//! Regions of the joint model are addressed by meaning ("the end-plate face
//! the beam is tied to", "every flange cell of the column") and resolved to
//! pick points plus a normal. A host picks the faces, edges or cells that
//! contain the pick points, so the selection survives any change of
//! dimensions or partitioning order.
//!
//! ## Example
//!
//! ```rust
//! use fep_core::features::{locate, FeatureKind, FeatureTag};
//! use fep_core::params::JointDesignParams;
//! use fep_core::resolver::resolve;
//!
//! let geometry = resolve(&JointDesignParams::default()).unwrap();
//! let face = locate(&FeatureTag::EndPlateBeamFace, &geometry).unwrap();
//! assert_eq!(face.kind, FeatureKind::Face);
//! assert_eq!(face.points[0].z, 8.0);
//! ```

use serde::{Deserialize, Serialize};

use crate::errors::{JointError, JointResult};
use crate::geometry::{PrincipalPlane, Vec3, GEOM_TOL};
use crate::resolver::{Part, ReferenceRole, ResolvedGeometry, SectionDims, Side};

/// Named region of the model.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "feature")]
pub enum FeatureTag {
    /// End-plate face the beam is welded to
    EndPlateBeamFace,
    /// Beam shell edges at the plate-side end
    BeamEndEdges,
    /// Beam shell edges at the load section
    BeamLoadSectionEdges,
    ColumnTopSection,
    ColumnBaseSection,
    /// Axis of one bolt
    BoltHoleAxis { row: u8, side: Side },
    ColumnFlangeCells,
    ColumnWebCells,
    BeamTopFlangeFaces,
    BeamBottomFlangeFaces,
    BeamWebFaces,
    /// Column flange-tip edges inside the end-plate height
    ColumnJointZoneEdges,
    /// Beam flange edges between the plate and the joint-zone datum
    BeamJointZoneEdges,
    EndPlateCells,
    BoltCells,
}

impl FeatureTag {
    /// Part the feature lives on.
    pub fn part(&self) -> Option<Part> {
        match self {
            FeatureTag::ColumnTopSection
            | FeatureTag::ColumnBaseSection
            | FeatureTag::ColumnFlangeCells
            | FeatureTag::ColumnWebCells
            | FeatureTag::ColumnJointZoneEdges => Some(Part::Column),
            FeatureTag::EndPlateBeamFace | FeatureTag::EndPlateCells => Some(Part::EndPlate),
            FeatureTag::BeamEndEdges
            | FeatureTag::BeamLoadSectionEdges
            | FeatureTag::BeamTopFlangeFaces
            | FeatureTag::BeamBottomFlangeFaces
            | FeatureTag::BeamWebFaces
            | FeatureTag::BeamJointZoneEdges => Some(Part::Beam),
            FeatureTag::BoltCells => Some(Part::Bolt),
            FeatureTag::BoltHoleAxis { .. } => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FeatureKind {
    Face,
    Edge,
    Cell,
    Axis,
}

/// Coordinate frame the pick points are expressed in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Frame {
    Assembly,
    Part(Part),
}

/// Pick points and outward normal of a resolved feature.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureLocator {
    pub frame: Frame,
    pub kind: FeatureKind,
    pub points: Vec<Vec3>,
    pub normal: Option<Vec3>,
}

impl FeatureLocator {
    fn on_part(part: Part, kind: FeatureKind, points: Vec<Vec3>, normal: Option<Vec3>) -> Self {
        FeatureLocator {
            frame: Frame::Part(part),
            kind,
            points,
            normal,
        }
    }
}

/// Midpoints between consecutive cut positions, including both ends.
fn interval_midpoints(start: f64, end: f64, cuts: impl IntoIterator<Item = f64>) -> Vec<f64> {
    let mut stops: Vec<f64> = cuts
        .into_iter()
        .filter(|c| *c > start + GEOM_TOL && *c < end - GEOM_TOL)
        .collect();
    stops.push(start);
    stops.push(end);
    stops.sort_by(|a, b| a.total_cmp(b));
    stops.dedup_by(|a, b| (*a - *b).abs() < GEOM_TOL);
    stops.windows(2).map(|w| (w[0] + w[1]) / 2.0).collect()
}

fn datum_offsets(geometry: &ResolvedGeometry, part: Part, plane: PrincipalPlane) -> Vec<f64> {
    geometry
        .datum_planes_of(part)
        .filter(|d| d.plane == plane)
        .map(|d| d.offset_mm)
        .collect()
}

/// Pick levels of an I-section in part-local XY.
///
/// Flange levels sit at mid-thickness, which for the shell beam is the
/// flange mid-plane.
struct SectionLevels {
    flanges: [(f64, f64); 2],
    web_y: f64,
    half_web: f64,
}

impl SectionLevels {
    fn new(dims: &SectionDims, half_depth: f64) -> Self {
        SectionLevels {
            flanges: [
                ((half_depth + dims.top_flange_inner_mm) / 2.0, dims.top_flange_width_mm / 2.0),
                (
                    -(half_depth + dims.bottom_flange_inner_mm) / 2.0,
                    dims.bottom_flange_width_mm / 2.0,
                ),
            ],
            web_y: (dims.top_flange_inner_mm - dims.bottom_flange_inner_mm) / 2.0,
            half_web: dims.web_thickness_mm / 2.0,
        }
    }
}

/// Resolve a feature tag against the resolved geometry.
///
/// Face and cell pick points lie strictly inside one partition cell. Edge
/// pick points lie strictly between the partitions that cut the edge, so no
/// pick point ever lands on a vertex. Partitioned surfaces get one pick point
/// per cell.
///
/// # Errors
///
/// `InvalidInput` when the tag names a bolt that is not in the layout.
pub fn locate(tag: &FeatureTag, geometry: &ResolvedGeometry) -> JointResult<FeatureLocator> {
    let boxes = &geometry.part_boxes;
    let col = &boxes.column;
    let beam = &boxes.beam;
    let plate = &boxes.end_plate;
    let col_length = col.max.z;
    let beam_length = beam.max.z;

    let column = SectionLevels::new(&geometry.column, col.max.y);
    let beam_levels = SectionLevels::new(&geometry.beam, beam.max.y);
    let col_xy = datum_offsets(geometry, Part::Column, PrincipalPlane::XY);
    let col_yz = datum_offsets(geometry, Part::Column, PrincipalPlane::YZ);
    let beam_xy = datum_offsets(geometry, Part::Beam, PrincipalPlane::XY);

    // Flanges split at the web junction; the web edge runs between flanges.
    let beam_section = |z: f64| {
        let mut points: Vec<Vec3> = beam_levels
            .flanges
            .iter()
            .flat_map(|&(y, half_w)| {
                [Vec3::new(-half_w / 2.0, y, z), Vec3::new(half_w / 2.0, y, z)]
            })
            .collect();
        points.push(Vec3::new(0.0, beam_levels.web_y, z));
        points
    };
    let column_section = |z: f64| {
        let mut points = Vec::new();
        for &(y, half_w) in &column.flanges {
            let xs = interval_midpoints(-half_w, half_w, col_yz.iter().copied());
            points.extend(xs.into_iter().map(|x| Vec3::new(x, y, z)));
        }
        let web_xs = interval_midpoints(-column.half_web, column.half_web, col_yz.iter().copied());
        points.extend(web_xs.into_iter().map(|x| Vec3::new(x, column.web_y, z)));
        points
    };
    let plate_grid = |z: f64| -> Vec<Vec3> {
        let xs = interval_midpoints(
            plate.min.x,
            plate.max.x,
            datum_offsets(geometry, Part::EndPlate, PrincipalPlane::YZ),
        );
        let ys = interval_midpoints(
            plate.min.y,
            plate.max.y,
            datum_offsets(geometry, Part::EndPlate, PrincipalPlane::XZ),
        );
        ys.iter()
            .flat_map(|&y| xs.iter().map(move |&x| Vec3::new(x, y, z)))
            .collect()
    };

    let locator = match *tag {
        FeatureTag::EndPlateBeamFace => FeatureLocator::on_part(
            Part::EndPlate,
            FeatureKind::Face,
            plate_grid(plate.max.z),
            Some(Vec3::Z),
        ),
        FeatureTag::BeamEndEdges => FeatureLocator::on_part(
            Part::Beam,
            FeatureKind::Edge,
            beam_section(0.0),
            Some(-Vec3::Z),
        ),
        FeatureTag::BeamLoadSectionEdges => {
            let load = geometry
                .reference_point(ReferenceRole::BeamLoad)
                .map(|rp| rp.position.z - geometry.placements.beam.translation.z)
                .unwrap_or(beam_length);
            FeatureLocator::on_part(
                Part::Beam,
                FeatureKind::Edge,
                beam_section(load),
                Some(Vec3::Z),
            )
        }
        FeatureTag::ColumnTopSection => FeatureLocator::on_part(
            Part::Column,
            FeatureKind::Face,
            column_section(0.0),
            Some(-Vec3::Z),
        ),
        FeatureTag::ColumnBaseSection => FeatureLocator::on_part(
            Part::Column,
            FeatureKind::Face,
            column_section(col_length),
            Some(Vec3::Z),
        ),
        FeatureTag::BoltHoleAxis { row, side } => {
            let bolt = geometry
                .placements
                .bolt_instances
                .iter()
                .find(|b| b.row == row && b.side == side)
                .ok_or_else(|| {
                    JointError::invalid_input(
                        "feature",
                        format!("{:?}", tag),
                        "No bolt at this row and side",
                    )
                })?;
            let start = bolt.placement.translation;
            FeatureLocator {
                frame: Frame::Assembly,
                kind: FeatureKind::Axis,
                points: vec![start, start + Vec3::Z * geometry.bolt.grip_length_mm],
                normal: Some(Vec3::Z),
            }
        }
        FeatureTag::ColumnFlangeCells | FeatureTag::ColumnWebCells => {
            let zs = interval_midpoints(0.0, col_length, col_xy.iter().copied());
            let mut points = Vec::new();
            if *tag == FeatureTag::ColumnWebCells {
                let xs =
                    interval_midpoints(-column.half_web, column.half_web, col_yz.iter().copied());
                for &z in &zs {
                    points.extend(xs.iter().map(|&x| Vec3::new(x, column.web_y, z)));
                }
            } else {
                for &(y, half_w) in &column.flanges {
                    let xs = interval_midpoints(-half_w, half_w, col_yz.iter().copied());
                    for &z in &zs {
                        points.extend(xs.iter().map(|&x| Vec3::new(x, y, z)));
                    }
                }
            }
            FeatureLocator::on_part(Part::Column, FeatureKind::Cell, points, None)
        }
        FeatureTag::BeamTopFlangeFaces | FeatureTag::BeamBottomFlangeFaces => {
            let ((y, half_w), normal) = if *tag == FeatureTag::BeamTopFlangeFaces {
                (beam_levels.flanges[0], Vec3::Y)
            } else {
                (beam_levels.flanges[1], -Vec3::Y)
            };
            let zs = interval_midpoints(0.0, beam_length, beam_xy.iter().copied());
            let quarter = half_w / 2.0;
            let points = zs
                .iter()
                .flat_map(|&z| [Vec3::new(-quarter, y, z), Vec3::new(quarter, y, z)])
                .collect();
            FeatureLocator::on_part(Part::Beam, FeatureKind::Face, points, Some(normal))
        }
        FeatureTag::BeamWebFaces => {
            let zs = interval_midpoints(0.0, beam_length, beam_xy.iter().copied());
            let points = zs.iter().map(|&z| Vec3::new(0.0, beam_levels.web_y, z)).collect();
            FeatureLocator::on_part(Part::Beam, FeatureKind::Face, points, Some(Vec3::X))
        }
        FeatureTag::ColumnJointZoneEdges => {
            // The plate top and bottom planes bound the joint zone.
            let (lo, hi) = if col_xy.is_empty() {
                (0.0, col_length)
            } else {
                (
                    col_xy.iter().copied().fold(f64::INFINITY, f64::min),
                    col_xy.iter().copied().fold(f64::NEG_INFINITY, f64::max),
                )
            };
            let zs = interval_midpoints(lo, hi, col_xy.iter().copied());
            let [(_, top_half), (_, bottom_half)] = column.flanges;
            let points = zs
                .iter()
                .flat_map(|&z| {
                    [
                        Vec3::new(-top_half, col.max.y, z),
                        Vec3::new(top_half, col.max.y, z),
                        Vec3::new(-bottom_half, col.min.y, z),
                        Vec3::new(bottom_half, col.min.y, z),
                    ]
                })
                .collect();
            FeatureLocator::on_part(Part::Column, FeatureKind::Edge, points, None)
        }
        FeatureTag::BeamJointZoneEdges => {
            let zone_end = beam_xy
                .iter()
                .copied()
                .filter(|z| *z > GEOM_TOL)
                .fold(beam_length, f64::min);
            let z = zone_end / 2.0;
            let points = beam_levels
                .flanges
                .iter()
                .flat_map(|&(y, half_w)| {
                    [
                        Vec3::new(-half_w, y, z),
                        Vec3::new(0.0, y, z),
                        Vec3::new(half_w, y, z),
                    ]
                })
                .collect();
            FeatureLocator::on_part(Part::Beam, FeatureKind::Edge, points, None)
        }
        FeatureTag::EndPlateCells => FeatureLocator::on_part(
            Part::EndPlate,
            FeatureKind::Cell,
            plate_grid(plate.max.z / 2.0),
            None,
        ),
        FeatureTag::BoltCells => {
            let bolt = &geometry.bolt;
            let r = bolt.shank_diameter_mm / 4.0;
            let zs = [
                -bolt.nut_thickness_mm / 2.0,
                bolt.grip_length_mm / 2.0,
                bolt.grip_length_mm + bolt.head_thickness_mm / 2.0,
            ];
            let points = zs
                .iter()
                .flat_map(|&z| {
                    [
                        Vec3::new(r, r, z),
                        Vec3::new(-r, r, z),
                        Vec3::new(-r, -r, z),
                        Vec3::new(r, -r, z),
                    ]
                })
                .collect();
            FeatureLocator::on_part(Part::Bolt, FeatureKind::Cell, points, None)
        }
    };
    Ok(locator)
}
