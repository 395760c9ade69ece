//! Bolt hole and bolt body derivations.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::errors::{JointError, JointResult};
use crate::params::BoltParams;

/// Resolved bolt body.
///
/// The bolt part is a stack along its local +Z axis: nut `[-t_nut, 0]`,
/// shank `[0, grip]`, head `[grip, grip + t_head]`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoltGeometry {
    pub shank_diameter_mm: f64,
    pub hole_diameter_mm: f64,
    /// Shank span between the nut and head bearing faces
    pub grip_length_mm: f64,
    pub head_diameter_mm: f64,
    pub head_thickness_mm: f64,
    pub nut_diameter_mm: f64,
    pub nut_thickness_mm: f64,
    /// Nut + grip + head
    pub total_length_mm: f64,
}

/// Hole diameter = bolt diameter + clearance.
///
/// ```rust
/// use fep_core::resolver::derive_bolt_hole_diameter;
///
/// assert_eq!(derive_bolt_hole_diameter(16.0, 2.0).unwrap(), 18.0);
/// assert!(derive_bolt_hole_diameter(16.0, 0.0).is_err());
/// ```
pub fn derive_bolt_hole_diameter(bolt_diameter_mm: f64, clearance_mm: f64) -> JointResult<f64> {
    if bolt_diameter_mm <= 0.0 || !bolt_diameter_mm.is_finite() {
        return Err(JointError::invalid_bolt(
            "shank_diameter_mm",
            bolt_diameter_mm,
            "Bolt diameter must be positive",
        ));
    }
    if clearance_mm <= 0.0 || !clearance_mm.is_finite() {
        return Err(JointError::invalid_bolt(
            "hole_clearance_mm",
            clearance_mm,
            "Hole clearance must be positive so the hole exceeds the bolt diameter",
        ));
    }
    Ok(bolt_diameter_mm + clearance_mm)
}

/// Grip length = end-plate thickness + column flange thickness.
pub fn derive_bolt_grip_length(plate_thickness_mm: f64, flange_thickness_mm: f64) -> f64 {
    plate_thickness_mm + flange_thickness_mm
}

/// Full bolt body for the given grip.
///
/// # Errors
///
/// `InvalidBolt` when a head or nut dimension is non-positive, or when the
/// head or nut would pass through the hole.
pub fn derive_bolt_geometry(
    bolt: &BoltParams,
    plate_thickness_mm: f64,
    column_flange_thickness_mm: f64,
) -> JointResult<BoltGeometry> {
    let hole_diameter_mm =
        derive_bolt_hole_diameter(bolt.shank_diameter_mm, bolt.hole_clearance_mm)?;

    let sizes = [
        ("head_diameter_mm", bolt.head_diameter_mm),
        ("head_thickness_mm", bolt.head_thickness_mm),
        ("nut_diameter_mm", bolt.nut_diameter_mm),
        ("nut_thickness_mm", bolt.nut_thickness_mm),
    ];
    for (field, value) in sizes {
        if value <= 0.0 || !value.is_finite() {
            return Err(JointError::invalid_bolt(field, value, "Dimension must be positive"));
        }
    }
    for (field, value) in [
        ("head_diameter_mm", bolt.head_diameter_mm),
        ("nut_diameter_mm", bolt.nut_diameter_mm),
    ] {
        if value <= hole_diameter_mm {
            return Err(JointError::invalid_bolt(
                field,
                value,
                format!(
                    "Must exceed the hole diameter ({} mm) to bear on the plate",
                    hole_diameter_mm
                ),
            ));
        }
    }

    let grip_length_mm = derive_bolt_grip_length(plate_thickness_mm, column_flange_thickness_mm);
    let geometry = BoltGeometry {
        shank_diameter_mm: bolt.shank_diameter_mm,
        hole_diameter_mm,
        grip_length_mm,
        head_diameter_mm: bolt.head_diameter_mm,
        head_thickness_mm: bolt.head_thickness_mm,
        nut_diameter_mm: bolt.nut_diameter_mm,
        nut_thickness_mm: bolt.nut_thickness_mm,
        total_length_mm: bolt.nut_thickness_mm + grip_length_mm + bolt.head_thickness_mm,
    };
    debug!(hole_diameter_mm, grip_length_mm, "bolt resolved");
    Ok(geometry)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hole_diameter() {
        assert_eq!(derive_bolt_hole_diameter(16.0, 2.0).unwrap(), 18.0);
    }

    #[test]
    fn test_zero_and_negative_clearance() {
        for clearance in [0.0, -1.0] {
            let err = derive_bolt_hole_diameter(16.0, clearance).unwrap_err();
            assert_eq!(err.error_code(), "INVALID_BOLT");
        }
    }

    #[test]
    fn test_grip_length() {
        assert_eq!(derive_bolt_grip_length(8.0, 12.0), 20.0);
    }

    #[test]
    fn test_reference_bolt() {
        let g = derive_bolt_geometry(&BoltParams::default(), 8.0, 12.0).unwrap();
        assert_eq!(g.hole_diameter_mm, 18.0);
        assert_eq!(g.grip_length_mm, 20.0);
        assert_eq!(g.total_length_mm, 40.0);
    }

    #[test]
    fn test_head_smaller_than_hole() {
        let bolt = BoltParams {
            head_diameter_mm: 17.0,
            ..BoltParams::default()
        };
        match derive_bolt_geometry(&bolt, 8.0, 12.0).unwrap_err() {
            JointError::InvalidBolt { field, .. } => assert_eq!(field, "head_diameter_mm"),
            other => panic!("unexpected error {other:?}"),
        }
    }
}
