//! # Dimension Resolver
//!
//! Turns [`JointDesignParams`] into a fully derived, mutually consistent
//! [`ResolvedGeometry`]: section dimensions, the bolt body, row offsets, the
//! bolt layout on the plate, instance placements, partition datum planes,
//! column hole cuts and reference points.
//!
//! Resolution is a pure function of the parameters. It fails on the first
//! inconsistency so that nothing reaches the CAE host from an invalid design.
//!
//! ## Example
//!
//! ```rust
//! use fep_core::params::JointDesignParams;
//! use fep_core::resolver::resolve;
//!
//! let mut params = JointDesignParams::default();
//! params.end_plate.z_variation_mm = 10.0;
//!
//! let geometry = resolve(&params).unwrap();
//! assert_eq!(geometry.rows.row2_mm, 75.0);
//! assert_eq!(geometry.rows.row2_to_row3_mm, 65.0);
//! assert_eq!(geometry.notes.len(), 1);
//! ```

pub mod bolt;
pub mod datums;
pub mod placement;
pub mod rows;
pub mod section;

pub use bolt::{
    derive_bolt_geometry, derive_bolt_grip_length, derive_bolt_hole_diameter, BoltGeometry,
};
pub use datums::{
    derive_column_holes, derive_datum_planes, derive_reference_points, DatumPlane, HoleCut,
    ReferencePoint, ReferenceRole,
};
pub use placement::{derive_placement_vectors, BoltInstance, PartBoxes, Placements, Side};
pub use rows::{derive_bolt_layout, derive_row_offsets, BoltLayout, BoltRow, RowOffsets};
pub use section::{derive_section_dims, Member, SectionDims};

use serde::{Deserialize, Serialize};
use tracing::{debug, info_span};

use crate::errors::JointResult;
use crate::params::JointDesignParams;

/// Part kinds of the joint model.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Part {
    Column,
    Beam,
    EndPlate,
    Bolt,
}

impl Part {
    pub const ALL: [Part; 4] = [Part::Column, Part::Beam, Part::EndPlate, Part::Bolt];

    /// Part name inside the host model.
    pub fn name(&self) -> &'static str {
        match self {
            Part::Column => "Column",
            Part::Beam => "Beam",
            Part::EndPlate => "End_Plate",
            Part::Bolt => "Bolt",
        }
    }
}

impl std::fmt::Display for Part {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// Non-fatal observation made while resolving.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GeometryNote {
    pub code: String,
    pub message: String,
}

impl GeometryNote {
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        GeometryNote {
            code: code.into(),
            message: message.into(),
        }
    }
}

/// Every derived dimension and placement of one joint model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResolvedGeometry {
    pub column: SectionDims,
    pub beam: SectionDims,
    pub bolt: BoltGeometry,
    pub rows: RowOffsets,
    pub layout: BoltLayout,
    pub placements: Placements,
    pub part_boxes: PartBoxes,
    pub datum_planes: Vec<DatumPlane>,
    pub holes: Vec<HoleCut>,
    pub reference_points: Vec<ReferencePoint>,
    #[serde(default)]
    pub notes: Vec<GeometryNote>,
}

impl ResolvedGeometry {
    pub fn reference_point(&self, role: ReferenceRole) -> Option<&ReferencePoint> {
        self.reference_points.iter().find(|rp| rp.role == role)
    }

    pub fn datum_planes_of(&self, part: Part) -> impl Iterator<Item = &DatumPlane> {
        self.datum_planes.iter().filter(move |d| d.part == part)
    }
}

/// Resolve every derived dimension of the joint.
///
/// Checks run in dependency order: scalar inputs and material curves,
/// sections, end plate, bolt, rows, layout, then assembly placements.
///
/// # Errors
///
/// The first design error found; see [`crate::errors::JointError`].
pub fn resolve(params: &JointDesignParams) -> JointResult<ResolvedGeometry> {
    let span = info_span!("resolve", model = %params.model_name);
    let _guard = span.enter();

    params.validate_inputs()?;

    let column = derive_section_dims(Member::Column, &params.column)?;
    let beam = derive_section_dims(Member::Beam, &params.beam)?;
    rows::check_end_plate(&params.end_plate)?;

    let bolt = derive_bolt_geometry(
        &params.bolt,
        params.end_plate.thickness_mm,
        params.column.flange_top_thickness_mm,
    )?;

    let plate = &params.end_plate;
    let rows = derive_row_offsets(
        plate.nominal_second_row_mm,
        plate.nominal_third_row_mm,
        plate.z_variation_mm,
    )?;
    let (layout, notes) = derive_bolt_layout(plate, &rows, bolt.hole_diameter_mm)?;

    let placements = derive_placement_vectors(params, &column, &beam, &layout, &bolt)?;
    let part_boxes = PartBoxes::new(params, &column, &beam, &bolt);
    let datum_planes = derive_datum_planes(params, &column, &layout, &bolt);
    let holes = derive_column_holes(params, &layout, &bolt);
    let reference_points = derive_reference_points(params, &placements);

    debug!(
        datum_planes = datum_planes.len(),
        holes = holes.len(),
        notes = notes.len(),
        "geometry resolved"
    );
    Ok(ResolvedGeometry {
        column,
        beam,
        bolt,
        rows,
        layout,
        placements,
        part_boxes,
        datum_planes,
        holes,
        reference_points,
        notes,
    })
}
