//! Bolt row offsets and the bolt layout on the end plate.
//!
//! Rows are numbered from the top of the plate. Offsets are measured from the
//! first row downwards; positions on the plate are measured from the plate
//! centre, positive up.

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use super::GeometryNote;
use crate::errors::{JointError, JointResult};
use crate::params::{EdgeDistancePolicy, EndPlateParams};

/// Offsets of rows 2 and 3 below the first row, after Z-variation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RowOffsets {
    pub row2_mm: f64,
    pub row3_mm: f64,
    pub row2_to_row3_mm: f64,
}

/// Shift both nominal row offsets by `z_variation_mm`.
///
/// The spacing between rows 2 and 3 does not depend on the Z-variation.
///
/// ```rust
/// use fep_core::resolver::derive_row_offsets;
///
/// let rows = derive_row_offsets(65.0, 130.0, 10.0).unwrap();
/// assert_eq!((rows.row2_mm, rows.row3_mm, rows.row2_to_row3_mm), (75.0, 140.0, 65.0));
/// ```
pub fn derive_row_offsets(
    nominal_second_mm: f64,
    nominal_third_mm: f64,
    z_variation_mm: f64,
) -> JointResult<RowOffsets> {
    let row2_mm = nominal_second_mm + z_variation_mm;
    let row3_mm = nominal_third_mm + z_variation_mm;
    if !row2_mm.is_finite() || !row3_mm.is_finite() {
        return Err(JointError::invalid_row_spacing(
            row2_mm,
            row3_mm,
            "Row offsets must be finite",
        ));
    }
    if row2_mm >= row3_mm {
        return Err(JointError::invalid_row_spacing(
            row2_mm,
            row3_mm,
            "Third row must lie below the second row",
        ));
    }
    if row2_mm <= 0.0 {
        return Err(JointError::invalid_row_spacing(
            row2_mm,
            row3_mm,
            "Second row must lie below the first row",
        ));
    }
    Ok(RowOffsets {
        row2_mm,
        row3_mm,
        row2_to_row3_mm: row3_mm - row2_mm,
    })
}

/// One horizontal pair of bolts.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoltRow {
    /// 1-based, from the top of the plate
    pub index: u8,
    /// Row centre above the plate centre
    pub y_mm: f64,
    pub gauge_mm: f64,
}

impl BoltRow {
    /// Horizontal positions of the two bolt centres.
    pub fn x_positions(&self) -> [f64; 2] {
        [-self.gauge_mm / 2.0, self.gauge_mm / 2.0]
    }
}

/// Bolt rows positioned on the end plate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BoltLayout {
    pub rows: Vec<BoltRow>,
    /// Plate top edge to first-row centre
    pub top_edge_distance_mm: f64,
    /// Third-row centre to plate bottom edge
    pub bottom_edge_distance_mm: f64,
    pub policy: EdgeDistancePolicy,
}

impl BoltLayout {
    /// First-row centre above the plate centre.
    pub fn first_row_y_mm(&self) -> f64 {
        self.rows.first().map(|r| r.y_mm).unwrap_or_default()
    }

    /// Every bolt position as `(row, x, y)` on the plate.
    pub fn bolt_positions(&self) -> impl Iterator<Item = (u8, f64, f64)> + '_ {
        self.rows
            .iter()
            .flat_map(|row| row.x_positions().into_iter().map(move |x| (row.index, x, row.y_mm)))
    }
}

/// Validate the plate outline itself.
pub(crate) fn check_end_plate(plate: &EndPlateParams) -> JointResult<()> {
    let dims = [
        ("width_mm", plate.width_mm),
        ("height_mm", plate.height_mm),
        ("thickness_mm", plate.thickness_mm),
        ("gauge_top_mm", plate.gauge_top_mm),
        ("gauge_bottom_mm", plate.gauge_bottom_mm),
        ("first_row_edge_distance_mm", plate.first_row_edge_distance_mm),
    ];
    for (field, value) in dims {
        if value <= 0.0 || !value.is_finite() {
            return Err(JointError::invalid_section(
                "end plate",
                field,
                value,
                "Dimension must be positive",
            ));
        }
    }
    Ok(())
}

/// Place the three bolt rows on the plate and check hole clearances.
///
/// # Errors
///
/// - `InvalidRowSpacing` when holes in adjacent rows overlap
/// - `InvalidAssembly` when a hole breaks out of a plate edge or the two
///   holes of a row overlap
pub fn derive_bolt_layout(
    plate: &EndPlateParams,
    rows: &RowOffsets,
    hole_diameter_mm: f64,
) -> JointResult<(BoltLayout, Vec<GeometryNote>)> {
    let mut notes = Vec::new();
    let z = plate.z_variation_mm;

    let top_edge_distance_mm = match plate.edge_distance_policy {
        EdgeDistancePolicy::Compensating => {
            if z != 0.0 {
                let message = format!(
                    "First-row edge distance reduced from {} mm to {} mm; rows 2 and 3 stay put",
                    plate.first_row_edge_distance_mm,
                    plate.first_row_edge_distance_mm - z
                );
                warn!(z_variation_mm = z, "{message}");
                notes.push(GeometryNote::new("EDGE_DISTANCE_COMPENSATED", message));
            }
            plate.first_row_edge_distance_mm - z
        }
        EdgeDistancePolicy::Fixed => plate.first_row_edge_distance_mm,
    };

    let first_y = plate.height_mm / 2.0 - top_edge_distance_mm;
    let layout = BoltLayout {
        rows: vec![
            BoltRow { index: 1, y_mm: first_y, gauge_mm: plate.gauge_top_mm },
            BoltRow { index: 2, y_mm: first_y - rows.row2_mm, gauge_mm: plate.gauge_bottom_mm },
            BoltRow { index: 3, y_mm: first_y - rows.row3_mm, gauge_mm: plate.gauge_bottom_mm },
        ],
        top_edge_distance_mm,
        bottom_edge_distance_mm: plate.height_mm / 2.0 + (first_y - rows.row3_mm),
        policy: plate.edge_distance_policy,
    };

    let radius = hole_diameter_mm / 2.0;
    if layout.top_edge_distance_mm <= radius {
        return Err(JointError::invalid_assembly(
            "bolt row 1",
            "end plate",
            format!(
                "Hole breaks out of the plate top edge (edge distance {} mm)",
                layout.top_edge_distance_mm
            ),
        ));
    }
    if layout.bottom_edge_distance_mm <= radius {
        return Err(JointError::invalid_assembly(
            "bolt row 3",
            "end plate",
            format!(
                "Hole breaks out of the plate bottom edge (edge distance {} mm)",
                layout.bottom_edge_distance_mm
            ),
        ));
    }
    if rows.row2_mm <= hole_diameter_mm || rows.row2_to_row3_mm <= hole_diameter_mm {
        return Err(JointError::invalid_row_spacing(
            rows.row2_mm,
            rows.row3_mm,
            format!("Holes of adjacent rows overlap (hole diameter {} mm)", hole_diameter_mm),
        ));
    }
    for row in &layout.rows {
        if row.gauge_mm <= hole_diameter_mm {
            return Err(JointError::invalid_assembly(
                format!("bolt row {}", row.index),
                format!("bolt row {}", row.index),
                format!("Holes across the {} mm gauge overlap", row.gauge_mm),
            ));
        }
        if row.gauge_mm / 2.0 + radius >= plate.width_mm / 2.0 {
            return Err(JointError::invalid_assembly(
                format!("bolt row {}", row.index),
                "end plate",
                "Hole breaks out of the plate side edge",
            ));
        }
    }

    debug!(
        top_edge_mm = layout.top_edge_distance_mm,
        bottom_edge_mm = layout.bottom_edge_distance_mm,
        "bolt layout resolved"
    );
    Ok((layout, notes))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_nominal_offsets() {
        let rows = derive_row_offsets(65.0, 130.0, 0.0).unwrap();
        assert_eq!(rows.row2_mm, 65.0);
        assert_eq!(rows.row3_mm, 130.0);
        assert_eq!(rows.row2_to_row3_mm, 65.0);
    }

    #[test]
    fn test_positive_z_variation() {
        let rows = derive_row_offsets(65.0, 130.0, 10.0).unwrap();
        assert_eq!(rows.row2_mm, 75.0);
        assert_eq!(rows.row3_mm, 140.0);
        assert_eq!(rows.row2_to_row3_mm, 65.0);
    }

    #[test]
    fn test_crossed_rows_rejected() {
        let err = derive_row_offsets(130.0, 130.0, 0.0).unwrap_err();
        assert_eq!(err.error_code(), "INVALID_ROW_SPACING");
        assert!(derive_row_offsets(140.0, 130.0, 0.0).is_err());
    }

    #[test]
    fn test_second_row_above_first_rejected() {
        assert!(derive_row_offsets(65.0, 130.0, -65.0).is_err());
    }

    #[test]
    fn test_reference_layout() {
        let plate = EndPlateParams::default();
        let rows = derive_row_offsets(65.0, 130.0, 0.0).unwrap();
        let (layout, notes) = derive_bolt_layout(&plate, &rows, 18.0).unwrap();
        let ys: Vec<f64> = layout.rows.iter().map(|r| r.y_mm).collect();
        assert_eq!(ys, vec![65.0, 0.0, -65.0]);
        assert_eq!(layout.bottom_edge_distance_mm, 65.0);
        assert!(notes.is_empty());
        assert_eq!(layout.bolt_positions().count(), 6);
    }

    #[test]
    fn test_compensating_policy_moves_only_first_row() {
        let plate = EndPlateParams {
            z_variation_mm: 10.0,
            ..EndPlateParams::default()
        };
        let rows = derive_row_offsets(65.0, 130.0, 10.0).unwrap();
        let (layout, notes) = derive_bolt_layout(&plate, &rows, 18.0).unwrap();
        let ys: Vec<f64> = layout.rows.iter().map(|r| r.y_mm).collect();
        assert_eq!(ys, vec![75.0, 0.0, -65.0]);
        assert_eq!(layout.top_edge_distance_mm, 55.0);
        assert_eq!(notes.len(), 1);
        assert_eq!(notes[0].code, "EDGE_DISTANCE_COMPENSATED");
    }

    #[test]
    fn test_fixed_policy_moves_lower_rows() {
        let plate = EndPlateParams {
            z_variation_mm: 10.0,
            edge_distance_policy: EdgeDistancePolicy::Fixed,
            ..EndPlateParams::default()
        };
        let rows = derive_row_offsets(65.0, 130.0, 10.0).unwrap();
        let (layout, notes) = derive_bolt_layout(&plate, &rows, 18.0).unwrap();
        let ys: Vec<f64> = layout.rows.iter().map(|r| r.y_mm).collect();
        assert_eq!(ys, vec![65.0, -10.0, -75.0]);
        assert_eq!(layout.bottom_edge_distance_mm, 55.0);
        assert!(notes.is_empty());
    }

    #[test]
    fn test_hole_breaking_out_of_top_edge() {
        let plate = EndPlateParams {
            z_variation_mm: 60.0,
            ..EndPlateParams::default()
        };
        let rows = derive_row_offsets(65.0, 130.0, 60.0).unwrap();
        let err = derive_bolt_layout(&plate, &rows, 18.0).unwrap_err();
        assert_eq!(err.error_code(), "INVALID_ASSEMBLY");
    }

    #[test]
    fn test_overlapping_rows() {
        let plate = EndPlateParams {
            nominal_second_row_mm: 15.0,
            ..EndPlateParams::default()
        };
        let rows = derive_row_offsets(15.0, 130.0, 0.0).unwrap();
        let err = derive_bolt_layout(&plate, &rows, 18.0).unwrap_err();
        assert_eq!(err.error_code(), "INVALID_ROW_SPACING");
    }

    #[test]
    fn test_gauge_too_wide_for_plate() {
        let plate = EndPlateParams {
            gauge_top_mm: 110.0,
            ..EndPlateParams::default()
        };
        let rows = derive_row_offsets(65.0, 130.0, 0.0).unwrap();
        assert!(derive_bolt_layout(&plate, &rows, 18.0).is_err());
    }
}
