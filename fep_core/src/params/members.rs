//! Member, end-plate and bolt parameters (all lengths in millimetres).

use serde::{Deserialize, Serialize};

/// I-section member (column or beam).
///
/// ## JSON Example
///
/// ```json
/// {
///   "flange_top_width_mm": 120.0,
///   "flange_top_thickness_mm": 12.0,
///   "flange_bottom_width_mm": 120.0,
///   "flange_bottom_thickness_mm": 12.0,
///   "depth_mm": 240.0,
///   "web_thickness_mm": 10.0,
///   "length_mm": 1500.0
/// }
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SectionParams {
    /// Width of the top flange. For the column this is the flange the end
    /// plate bears against.
    pub flange_top_width_mm: f64,
    pub flange_top_thickness_mm: f64,
    pub flange_bottom_width_mm: f64,
    pub flange_bottom_thickness_mm: f64,
    /// Overall section depth, outer flange face to outer flange face
    pub depth_mm: f64,
    pub web_thickness_mm: f64,
    /// Member height (column) or length (beam)
    pub length_mm: f64,
}

impl SectionParams {
    /// Doubly symmetric I-section.
    pub fn symmetric(
        flange_width_mm: f64,
        flange_thickness_mm: f64,
        depth_mm: f64,
        web_thickness_mm: f64,
        length_mm: f64,
    ) -> Self {
        SectionParams {
            flange_top_width_mm: flange_width_mm,
            flange_top_thickness_mm: flange_thickness_mm,
            flange_bottom_width_mm: flange_width_mm,
            flange_bottom_thickness_mm: flange_thickness_mm,
            depth_mm,
            web_thickness_mm,
            length_mm,
        }
    }

    /// Named fields, for validation messages.
    pub fn fields(&self) -> [(&'static str, f64); 7] {
        [
            ("flange_top_width_mm", self.flange_top_width_mm),
            ("flange_top_thickness_mm", self.flange_top_thickness_mm),
            ("flange_bottom_width_mm", self.flange_bottom_width_mm),
            ("flange_bottom_thickness_mm", self.flange_bottom_thickness_mm),
            ("depth_mm", self.depth_mm),
            ("web_thickness_mm", self.web_thickness_mm),
            ("length_mm", self.length_mm),
        ]
    }
}

/// How the first-row edge distance responds to the Z-variation knob.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum EdgeDistancePolicy {
    /// Edge distance shrinks by the Z-variation while the row offsets grow by
    /// it, so rows 2 and 3 keep their position on the plate and only the
    /// first row moves.
    #[default]
    Compensating,
    /// Edge distance stays nominal and the whole lower bolt group moves.
    Fixed,
}

/// Flush end plate with three bolt rows of two bolts each.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EndPlateParams {
    pub width_mm: f64,
    pub height_mm: f64,
    pub thickness_mm: f64,
    /// Horizontal centre-to-centre spacing of the first-row bolts
    pub gauge_top_mm: f64,
    /// Horizontal centre-to-centre spacing of the second- and third-row bolts
    pub gauge_bottom_mm: f64,
    /// Plate top edge to first-row bolt centre, before Z-variation
    pub first_row_edge_distance_mm: f64,
    /// First row to second row, before Z-variation
    pub nominal_second_row_mm: f64,
    /// First row to third row, before Z-variation
    pub nominal_third_row_mm: f64,
    /// Additive shift applied uniformly to the row offsets
    pub z_variation_mm: f64,
    #[serde(default)]
    pub edge_distance_policy: EdgeDistancePolicy,
}

impl EndPlateParams {
    /// Set the Z-variation from the study's lever-arm values.
    ///
    /// ```rust
    /// use fep_core::params::JointDesignParams;
    ///
    /// let plate = JointDesignParams::default().end_plate.with_lever_arm(179.0, 189.0);
    /// assert_eq!(plate.z_variation_mm, 10.0);
    /// ```
    pub fn with_lever_arm(mut self, original_z_mm: f64, new_z_mm: f64) -> Self {
        self.z_variation_mm = new_z_mm - original_z_mm;
        self
    }
}

/// Hexagon bolt with nut, modelled as a stepped cylinder.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoltParams {
    pub shank_diameter_mm: f64,
    pub head_diameter_mm: f64,
    pub head_thickness_mm: f64,
    pub nut_diameter_mm: f64,
    pub nut_thickness_mm: f64,
    /// Hole diameter minus shank diameter
    pub hole_clearance_mm: f64,
}

impl Default for BoltParams {
    fn default() -> Self {
        BoltParams {
            shank_diameter_mm: 16.0,
            head_diameter_mm: 24.0,
            head_thickness_mm: 10.0,
            nut_diameter_mm: 24.0,
            nut_thickness_mm: 10.0,
            hole_clearance_mm: 2.0,
        }
    }
}

impl Default for EndPlateParams {
    fn default() -> Self {
        EndPlateParams {
            width_mm: 120.0,
            height_mm: 260.0,
            thickness_mm: 8.0,
            gauge_top_mm: 70.0,
            gauge_bottom_mm: 70.0,
            first_row_edge_distance_mm: 65.0,
            nominal_second_row_mm: 65.0,
            nominal_third_row_mm: 130.0,
            z_variation_mm: 0.0,
            edge_distance_policy: EdgeDistancePolicy::Compensating,
        }
    }
}
