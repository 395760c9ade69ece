//! Cross-section derivations for the column and the beam.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::errors::{JointError, JointResult};
use crate::params::SectionParams;

/// Which I-section member a derivation refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Member {
    Column,
    Beam,
}

impl std::fmt::Display for Member {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Member::Column => write!(f, "column"),
            Member::Beam => write!(f, "beam"),
        }
    }
}

/// Dimensions derived from one I-section.
///
/// The section is centred at mid-depth: the top flange occupies
/// `[depth/2 - t_top, depth/2]`, the bottom flange `[-depth/2, -depth/2 + t_bottom]`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SectionDims {
    /// Clear web height between the flanges
    pub web_height_mm: f64,
    /// Distance between flange mid-planes (shell idealisation)
    pub flange_centroid_distance_mm: f64,
    /// Mid-depth to the inner face of the top flange
    pub top_flange_inner_mm: f64,
    /// Mid-depth to the inner face of the bottom flange
    pub bottom_flange_inner_mm: f64,
    pub top_flange_width_mm: f64,
    pub bottom_flange_width_mm: f64,
    pub web_thickness_mm: f64,
    /// Wider of the two flanges
    pub max_flange_width_mm: f64,
}

/// Compute the clear web height and related section dimensions.
///
/// # Errors
///
/// `InvalidSection` when any dimension is non-positive, the flanges are at
/// least as thick as the whole section, or the web is thicker than a flange
/// is wide.
///
/// # Example
///
/// ```rust
/// use fep_core::params::SectionParams;
/// use fep_core::resolver::{derive_section_dims, Member};
///
/// let column = SectionParams::symmetric(120.0, 12.0, 240.0, 10.0, 1500.0);
/// let dims = derive_section_dims(Member::Column, &column).unwrap();
/// assert_eq!(dims.web_height_mm, 216.0);
/// ```
pub fn derive_section_dims(member: Member, section: &SectionParams) -> JointResult<SectionDims> {
    for (field, value) in section.fields() {
        if value <= 0.0 || !value.is_finite() {
            return Err(JointError::invalid_section(
                member.to_string(),
                field,
                value,
                "Dimension must be positive",
            ));
        }
    }

    let flanges = section.flange_top_thickness_mm + section.flange_bottom_thickness_mm;
    let web_height_mm = section.depth_mm - flanges;
    if web_height_mm <= 0.0 {
        return Err(JointError::invalid_section(
            member.to_string(),
            "flange_top_thickness_mm + flange_bottom_thickness_mm",
            flanges,
            format!("Flange thicknesses must sum to less than the depth ({} mm)", section.depth_mm),
        ));
    }

    let narrow_flange = section.flange_top_width_mm.min(section.flange_bottom_width_mm);
    if section.web_thickness_mm >= narrow_flange {
        return Err(JointError::invalid_section(
            member.to_string(),
            "web_thickness_mm",
            section.web_thickness_mm,
            format!("Web must be thinner than the narrower flange is wide ({} mm)", narrow_flange),
        ));
    }

    let half = section.depth_mm / 2.0;
    let dims = SectionDims {
        web_height_mm,
        flange_centroid_distance_mm: section.depth_mm - flanges / 2.0,
        top_flange_inner_mm: half - section.flange_top_thickness_mm,
        bottom_flange_inner_mm: half - section.flange_bottom_thickness_mm,
        top_flange_width_mm: section.flange_top_width_mm,
        bottom_flange_width_mm: section.flange_bottom_width_mm,
        web_thickness_mm: section.web_thickness_mm,
        max_flange_width_mm: section.flange_top_width_mm.max(section.flange_bottom_width_mm),
    };
    debug!(%member, web_height_mm, "section resolved");
    Ok(dims)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn reference() -> SectionParams {
        SectionParams::symmetric(120.0, 12.0, 240.0, 10.0, 1500.0)
    }

    #[test]
    fn test_web_height() {
        let dims = derive_section_dims(Member::Column, &reference()).unwrap();
        assert_eq!(dims.web_height_mm, 216.0);
        assert_eq!(dims.flange_centroid_distance_mm, 228.0);
        assert_eq!(dims.top_flange_inner_mm, 108.0);
        assert_eq!(dims.bottom_flange_inner_mm, 108.0);
    }

    #[test]
    fn test_unequal_flanges() {
        let mut s = reference();
        s.flange_top_thickness_mm = 16.0;
        s.flange_bottom_width_mm = 150.0;
        let dims = derive_section_dims(Member::Beam, &s).unwrap();
        assert_eq!(dims.web_height_mm, 212.0);
        assert_eq!(dims.top_flange_inner_mm, 104.0);
        assert_eq!(dims.max_flange_width_mm, 150.0);
        assert_eq!(dims.top_flange_width_mm, 120.0);
        assert_eq!(dims.bottom_flange_width_mm, 150.0);
    }

    #[test]
    fn test_flanges_exceeding_depth() {
        let mut s = reference();
        s.flange_top_thickness_mm = 120.0;
        s.flange_bottom_thickness_mm = 120.0;
        let err = derive_section_dims(Member::Column, &s).unwrap_err();
        assert_eq!(err.error_code(), "INVALID_SECTION");
    }

    #[test]
    fn test_non_positive_dimension() {
        let mut s = reference();
        s.web_thickness_mm = 0.0;
        match derive_section_dims(Member::Beam, &s).unwrap_err() {
            JointError::InvalidSection { member, field, .. } => {
                assert_eq!(member, "beam");
                assert_eq!(field, "web_thickness_mm");
            }
            other => panic!("unexpected error {other:?}"),
        }
    }

    #[test]
    fn test_web_wider_than_flange() {
        let mut s = reference();
        s.web_thickness_mm = 130.0;
        assert!(derive_section_dims(Member::Column, &s).is_err());
    }
}
