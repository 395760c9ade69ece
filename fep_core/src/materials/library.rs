//! Reference steels of the flush end-plate parametric study.
//!
//! True-stress / true-plastic-strain tables (MPa, -) for the column and beam
//! flanges and webs, the end plate and the bolts. Density is in t/mm³ so that
//! it is consistent with N, mm and MPa.

use once_cell::sync::Lazy;

use super::{MaterialModel, MaterialRole, MaterialSet, PlasticityCurve};

/// Steel density (t/mm³).
pub const STEEL_DENSITY: f64 = 7.85e-9;

/// Poisson ratio used for every steel in the study.
pub const STEEL_POISSON: f64 = 0.3;

/// Hot-rolled section steel (flanges and webs).
pub const SECTION_STEEL_CURVE: [(f64, f64); 13] = [
    (324.883797, 0.0),
    (342.263405, 0.001986836),
    (372.640806, 0.004168264),
    (403.927543, 0.008251454),
    (436.871142, 0.015530915),
    (472.714356, 0.027949365),
    (513.453487, 0.048276771),
    (562.200436, 0.080231161),
    (623.679429, 0.128434998),
    (704.895798, 0.198070686),
    (816.021472, 0.294140858),
    (971.55, 0.420409985),
    (1270.0, 0.686797181),
];

/// End-plate steel.
pub const END_PLATE_CURVE: [(f64, f64); 13] = [
    (319.160569, 0.0),
    (336.231125, 0.001987108),
    (366.703443, 0.004193395),
    (398.090211, 0.00833728),
    (431.147856, 0.015741831),
    (467.135196, 0.028390912),
    (508.07507, 0.049107916),
    (557.120339, 0.081671038),
    (619.054958, 0.130755713),
    (700.967089, 0.201566892),
    (813.138202, 0.299072753),
    (970.2, 0.426931416),
    (1260.0, 0.686847181),
];

/// High-strength bolt steel.
pub const BOLT_CURVE: [(f64, f64); 13] = [
    (588.480037, 0.0),
    (620.221932, 0.001969588),
    (639.92125, 0.003119448),
    (660.066409, 0.004869265),
    (680.884675, 0.007497904),
    (702.708338, 0.011397498),
    (726.018148, 0.017111364),
    (751.50272, 0.025380009),
    (780.139135, 0.037193653),
    (813.301382, 0.053846562),
    (852.905183, 0.076983358),
    (901.6, 0.108620591),
    (1610.0, 0.68473987),
];

fn steel(role: MaterialRole, elastic_modulus_mpa: f64, curve: &[(f64, f64)]) -> MaterialModel {
    MaterialModel {
        name: role.default_name().to_string(),
        density: STEEL_DENSITY,
        elastic_modulus_mpa,
        poisson_ratio: STEEL_POISSON,
        plastic: PlasticityCurve::from_pairs(curve),
    }
}

static REFERENCE_SET: Lazy<MaterialSet> = Lazy::new(|| MaterialSet {
    flange: steel(MaterialRole::Flange, 200_000.0, &SECTION_STEEL_CURVE),
    web: steel(MaterialRole::Web, 200_000.0, &SECTION_STEEL_CURVE),
    end_plate: steel(MaterialRole::EndPlate, 198_000.0, &END_PLATE_CURVE),
    bolt: steel(MaterialRole::Bolt, 191_500.0, &BOLT_CURVE),
});

/// The study's reference material set.
pub fn reference_set() -> MaterialSet {
    REFERENCE_SET.clone()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reference_curves_are_valid() {
        let set = reference_set();
        for (role, mat) in set.iter() {
            assert!(mat.validate().is_ok(), "{} curve rejected", role);
        }
    }

    #[test]
    fn test_reference_moduli() {
        let set = reference_set();
        assert_eq!(set.bolt.elastic_modulus_mpa, 191_500.0);
        assert_eq!(set.end_plate.elastic_modulus_mpa, 198_000.0);
        assert_eq!(set.flange.plastic.len(), 13);
        assert!(set.bolt.plastic.yield_stress_mpa() > set.flange.plastic.yield_stress_mpa());
    }
}
