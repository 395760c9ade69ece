//! Instance placements and assembly conflict checks.
//!
//! Assembly frame: `+Y` is up along the column axis with the column base at
//! `y = 0`; `+Z` points from the column towards the beam; `X` completes the
//! right-handed set. Part-local frames:
//!
//! - Column: section in XY (bearing flange towards `+Y`), extruded `+Z`
//!   from the top. Placed by a quarter turn about `X` and lifted by its height.
//! - End plate: outline in XY centred on the origin, extruded `+Z`.
//! - Beam: section in XY, extruded `+Z` from the plate-side end.
//! - Bolt: axis along `+Z`, shank from `0` to the grip length.

use serde::{Deserialize, Serialize};
use tracing::debug;

use super::{BoltGeometry, BoltLayout, SectionDims};
use crate::errors::{JointError, JointResult};
use crate::geometry::{Aabb, Axis, Placement, Rotation, Vec3, GEOM_TOL};
use crate::params::JointDesignParams;

/// Side of the beam web a bolt sits on, looking along `-Z`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Side {
    Left,
    Right,
}

impl Side {
    fn of(x: f64) -> Side {
        if x < 0.0 {
            Side::Left
        } else {
            Side::Right
        }
    }
}

/// One placed bolt.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoltInstance {
    pub row: u8,
    pub side: Side,
    pub placement: Placement,
}

impl BoltInstance {
    /// Host instance name, e.g. `Bolt-R1-L`.
    pub fn name(&self) -> String {
        let side = match self.side {
            Side::Left => 'L',
            Side::Right => 'R',
        };
        format!("Bolt-R{}-{}", self.row, side)
    }
}

/// Placements of every part instance in the assembly.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Placements {
    pub column: Placement,
    pub beam: Placement,
    pub end_plate: Placement,
    /// Reference bolt (first row, right side)
    pub bolt: Placement,
    pub bolt_instances: Vec<BoltInstance>,
}

impl Placements {
    /// Height of the plate centre above the column base.
    pub fn joint_height_mm(&self) -> f64 {
        self.end_plate.translation.y
    }

    /// Z of the column bearing-flange face (and of the plate inner face).
    pub fn column_face_z_mm(&self) -> f64 {
        self.end_plate.translation.z
    }
}

/// Part-local bounding boxes.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PartBoxes {
    pub column: Aabb,
    pub beam: Aabb,
    pub end_plate: Aabb,
    pub bolt: Aabb,
}

impl PartBoxes {
    pub fn new(
        params: &JointDesignParams,
        column: &SectionDims,
        beam: &SectionDims,
        bolt: &BoltGeometry,
    ) -> Self {
        PartBoxes {
            column: column_local_box(params, column),
            beam: beam_local_box(params, beam),
            end_plate: plate_local_box(params),
            bolt: bolt_local_box(bolt),
        }
    }
}

fn column_local_box(params: &JointDesignParams, dims: &SectionDims) -> Aabb {
    let c = &params.column;
    let half_w = dims.max_flange_width_mm / 2.0;
    Aabb::new(
        Vec3::new(-half_w, -c.depth_mm / 2.0, 0.0),
        Vec3::new(half_w, c.depth_mm / 2.0, c.length_mm),
    )
}

fn beam_local_box(params: &JointDesignParams, dims: &SectionDims) -> Aabb {
    let b = &params.beam;
    let half_w = dims.max_flange_width_mm / 2.0;
    Aabb::new(
        Vec3::new(-half_w, -b.depth_mm / 2.0, 0.0),
        Vec3::new(half_w, b.depth_mm / 2.0, b.length_mm),
    )
}

fn plate_local_box(params: &JointDesignParams) -> Aabb {
    let p = &params.end_plate;
    Aabb::new(
        Vec3::new(-p.width_mm / 2.0, -p.height_mm / 2.0, 0.0),
        Vec3::new(p.width_mm / 2.0, p.height_mm / 2.0, p.thickness_mm),
    )
}

fn bolt_local_box(bolt: &BoltGeometry) -> Aabb {
    let r = bolt.head_diameter_mm.max(bolt.nut_diameter_mm) / 2.0;
    Aabb::new(
        Vec3::new(-r, -r, -bolt.nut_thickness_mm),
        Vec3::new(r, r, bolt.grip_length_mm + bolt.head_thickness_mm),
    )
}

fn assembly_error(first: &str, second: &str, reason: String) -> JointError {
    JointError::invalid_assembly(first, second, reason)
}

/// Compute every instance placement and check the assembly for conflicts.
///
/// # Errors
///
/// `InvalidAssembly` naming the two conflicting parts when:
/// - the plate does not bear flush on the column flange or leaves the column span
/// - the beam section does not fit on the plate
/// - a hole breaks out of the column flange
/// - a nut or bolt head clashes with a web or flange
/// - the load point is not on the beam
pub fn derive_placement_vectors(
    params: &JointDesignParams,
    column: &SectionDims,
    beam: &SectionDims,
    layout: &BoltLayout,
    bolt: &BoltGeometry,
) -> JointResult<Placements> {
    let col = &params.column;
    let plate = &params.end_plate;
    let joint_y = col.length_mm / 2.0;
    let face_z = col.depth_mm / 2.0;

    let column_placement = Placement::rotated(
        Rotation { axis: Axis::X, angle_deg: 90.0 },
        Vec3::new(0.0, col.length_mm, 0.0),
    );
    let plate_placement = Placement::translation(Vec3::new(0.0, joint_y, face_z));
    let beam_placement =
        Placement::translation(Vec3::new(0.0, joint_y, face_z + plate.thickness_mm));
    let bolt_z = face_z - col.flange_top_thickness_mm;

    let bolt_instances: Vec<BoltInstance> = layout
        .bolt_positions()
        .map(|(row, x, y)| BoltInstance {
            row,
            side: Side::of(x),
            placement: Placement::translation(Vec3::new(x, joint_y + y, bolt_z)),
        })
        .collect();
    let reference_bolt = bolt_instances
        .iter()
        .find(|b| b.row == 1 && b.side == Side::Right)
        .map(|b| b.placement)
        .ok_or_else(|| JointError::Pipeline {
            reason: "Bolt layout has no first-row bolt".to_string(),
        })?;

    let column_box = column_local_box(params, column).placed(&column_placement);
    let plate_box = plate_local_box(params).placed(&plate_placement);
    let beam_box = beam_local_box(params, beam).placed(&beam_placement);

    // Plate against the column flange face: zero overlap along Z.
    let bearing = column_box.overlap_along(&plate_box, Axis::Z);
    if bearing > GEOM_TOL {
        return Err(assembly_error(
            "end plate",
            "column",
            format!("End plate penetrates the column flange by {:.3} mm", bearing),
        ));
    }
    if bearing < -GEOM_TOL {
        return Err(assembly_error(
            "end plate",
            "column",
            format!("Gap of {:.3} mm between the end plate and the column flange", -bearing),
        ));
    }
    if plate_box.min.y < column_box.min.y - GEOM_TOL
        || plate_box.max.y > column_box.max.y + GEOM_TOL
    {
        return Err(assembly_error(
            "end plate",
            "column",
            format!(
                "End plate of height {} mm extends past the ends of a {} mm column",
                plate.height_mm, col.length_mm
            ),
        ));
    }

    let beam_on_plate = plate_box.overlap_along(&beam_box, Axis::Z);
    if beam_on_plate.abs() > GEOM_TOL {
        return Err(assembly_error(
            "beam",
            "end plate",
            format!("Beam end is {:.3} mm off the plate face", beam_on_plate),
        ));
    }
    if beam_box.extent(Axis::Y) > plate_box.extent(Axis::Y) + GEOM_TOL {
        return Err(assembly_error(
            "beam",
            "end plate",
            format!(
                "Beam depth {} mm exceeds the flush plate height {} mm",
                params.beam.depth_mm, plate.height_mm
            ),
        ));
    }
    if beam_box.extent(Axis::X) > plate_box.extent(Axis::X) + GEOM_TOL {
        return Err(assembly_error(
            "beam",
            "end plate",
            format!(
                "Beam flange width {} mm exceeds the plate width {} mm",
                beam.max_flange_width_mm, plate.width_mm
            ),
        ));
    }

    let hole_r = bolt.hole_diameter_mm / 2.0;
    let beam_web_half = params.beam.web_thickness_mm / 2.0;
    let column_web_half = col.web_thickness_mm / 2.0;
    for instance in &bolt_instances {
        let name = instance.name();
        let centre = instance.placement.translation;
        let x = centre.x.abs();
        let y = centre.y - joint_y;

        if x + hole_r >= col.flange_top_width_mm / 2.0 {
            return Err(assembly_error(
                &name,
                "column flange",
                "Hole breaks out of the column flange edge".to_string(),
            ));
        }
        if x - bolt.nut_diameter_mm / 2.0 < column_web_half {
            return Err(assembly_error(
                &name,
                "column web",
                "Nut clashes with the column web".to_string(),
            ));
        }
        if bolt.nut_thickness_mm >= column.web_height_mm {
            return Err(assembly_error(
                &name,
                "column flange",
                "Nut does not fit between the column flanges".to_string(),
            ));
        }
        if x - bolt.head_diameter_mm / 2.0 < beam_web_half {
            return Err(assembly_error(
                &name,
                "beam web",
                "Bolt head clashes with the beam web".to_string(),
            ));
        }
        let inner = if y >= 0.0 {
            beam.top_flange_inner_mm
        } else {
            beam.bottom_flange_inner_mm
        };
        if y.abs() + bolt.head_diameter_mm / 2.0 > inner + GEOM_TOL {
            return Err(assembly_error(
                &name,
                "beam flange",
                format!("Bolt head at {:.1} mm from the beam axis clashes with the beam flange", y),
            ));
        }

        // Nut bears on the inner flange face, head on the plate outer face.
        let nut_face = centre.z;
        let head_face = centre.z + bolt.grip_length_mm;
        if (nut_face - (face_z - col.flange_top_thickness_mm)).abs() > GEOM_TOL
            || (head_face - plate_box.max.z).abs() > GEOM_TOL
        {
            return Err(assembly_error(
                &name,
                "end plate",
                "Grip does not span the clamped plies".to_string(),
            ));
        }
    }

    let load_local_z = params.load.load_distance_mm - plate.thickness_mm;
    if load_local_z <= 0.0 || load_local_z > params.beam.length_mm {
        return Err(assembly_error(
            "load point",
            "beam",
            format!(
                "Load distance {} mm does not fall on the {} mm beam",
                params.load.load_distance_mm, params.beam.length_mm
            ),
        ));
    }

    debug!(joint_y, face_z, bolts = bolt_instances.len(), "placements resolved");
    Ok(Placements {
        column: column_placement,
        beam: beam_placement,
        end_plate: plate_placement,
        bolt: reference_bolt,
        bolt_instances,
    })
}
