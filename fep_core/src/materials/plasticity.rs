//! True-stress / true-plastic-strain hardening curves.
//!
//! Curves are stored as ordered `(stress, plastic strain)` points. The first
//! point is the initial yield (plastic strain zero); later points describe
//! isotropic hardening.

use serde::{Deserialize, Serialize};

use crate::errors::{JointError, JointResult};

/// One point of a hardening curve.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PlasticPoint {
    /// True stress (MPa)
    pub stress_mpa: f64,
    /// True plastic strain (-)
    pub strain: f64,
}

/// Piecewise-linear plasticity curve.
///
/// ## JSON Example
///
/// ```json
/// { "points": [ { "stress_mpa": 355.0, "strain": 0.0 },
///               { "stress_mpa": 470.0, "strain": 0.18 } ] }
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlasticityCurve {
    pub points: Vec<PlasticPoint>,
}

impl PlasticityCurve {
    /// Build a curve from `(stress, strain)` pairs, as material tables are
    /// usually written.
    pub fn from_pairs(pairs: &[(f64, f64)]) -> Self {
        PlasticityCurve {
            points: pairs
                .iter()
                .map(|&(stress_mpa, strain)| PlasticPoint { stress_mpa, strain })
                .collect(),
        }
    }

    /// Two-point curve from yield and ultimate stress.
    ///
    /// ```rust
    /// use fep_core::materials::PlasticityCurve;
    ///
    /// let curve = PlasticityCurve::bilinear(355.0, 470.0, 0.18);
    /// assert!(curve.validate("S355").is_ok());
    /// assert_eq!(curve.ultimate_stress_mpa(), 470.0);
    /// ```
    pub fn bilinear(yield_mpa: f64, ultimate_mpa: f64, ultimate_strain: f64) -> Self {
        PlasticityCurve::from_pairs(&[(yield_mpa, 0.0), (ultimate_mpa, ultimate_strain)])
    }

    /// Check the physical hardening assumptions.
    ///
    /// * the curve is non-empty and starts at zero plastic strain
    /// * plastic strain strictly increases
    /// * stress is non-negative and never decreases
    pub fn validate(&self, material: &str) -> JointResult<()> {
        let first = self
            .points
            .first()
            .ok_or_else(|| JointError::invalid_curve(material, 0, "Curve has no points"))?;

        if first.strain != 0.0 {
            return Err(JointError::invalid_curve(
                material,
                0,
                format!("First plastic strain must be 0, got {}", first.strain),
            ));
        }

        for (i, p) in self.points.iter().enumerate() {
            if !p.stress_mpa.is_finite() || !p.strain.is_finite() {
                return Err(JointError::invalid_curve(material, i, "Non-finite stress or strain"));
            }
            if p.stress_mpa < 0.0 {
                return Err(JointError::invalid_curve(
                    material,
                    i,
                    format!("Negative stress {} MPa", p.stress_mpa),
                ));
            }
            if i == 0 {
                continue;
            }
            let prev = &self.points[i - 1];
            if p.strain <= prev.strain {
                return Err(JointError::invalid_curve(
                    material,
                    i,
                    format!(
                        "Plastic strain must strictly increase ({} after {})",
                        p.strain, prev.strain
                    ),
                ));
            }
            if p.stress_mpa < prev.stress_mpa {
                return Err(JointError::invalid_curve(
                    material,
                    i,
                    format!(
                        "Stress must not decrease ({} MPa after {} MPa)",
                        p.stress_mpa, prev.stress_mpa
                    ),
                ));
            }
        }
        Ok(())
    }

    /// Initial yield stress (first point). Zero for an empty curve.
    pub fn yield_stress_mpa(&self) -> f64 {
        self.points.first().map(|p| p.stress_mpa).unwrap_or(0.0)
    }

    /// Stress at the last tabulated point. Zero for an empty curve.
    pub fn ultimate_stress_mpa(&self) -> f64 {
        self.points.last().map(|p| p.stress_mpa).unwrap_or(0.0)
    }

    /// Linearly interpolated stress at a plastic strain, held constant
    /// outside the tabulated range (the usual solver convention).
    pub fn stress_at(&self, strain: f64) -> f64 {
        let (first, last) = match (self.points.first(), self.points.last()) {
            (Some(f), Some(l)) => (f, l),
            _ => return 0.0,
        };
        if strain <= first.strain {
            return first.stress_mpa;
        }
        if strain >= last.strain {
            return last.stress_mpa;
        }
        for w in self.points.windows(2) {
            let (a, b) = (&w[0], &w[1]);
            if strain <= b.strain {
                let t = (strain - a.strain) / (b.strain - a.strain);
                return a.stress_mpa + t * (b.stress_mpa - a.stress_mpa);
            }
        }
        last.stress_mpa
    }

    /// `(stress, strain)` table in host order.
    pub fn as_table(&self) -> Vec<(f64, f64)> {
        self.points.iter().map(|p| (p.stress_mpa, p.strain)).collect()
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn curve_with_strains(strains: &[f64]) -> PlasticityCurve {
        let pairs: Vec<(f64, f64)> = strains
            .iter()
            .enumerate()
            .map(|(i, &e)| (355.0 + 10.0 * i as f64, e))
            .collect();
        PlasticityCurve::from_pairs(&pairs)
    }

    #[test]
    fn test_monotonic_strain_passes() {
        let curve = curve_with_strains(&[0.0, 0.002, 0.004, 0.008]);
        assert!(curve.validate("Flange").is_ok());
    }

    #[test]
    fn test_non_monotonic_strain_fails() {
        let curve = curve_with_strains(&[0.0, 0.002, 0.004, 0.001]);
        let err = curve.validate("Flange").unwrap_err();
        assert_eq!(err.error_code(), "INVALID_MATERIAL_CURVE");
        match err {
            JointError::InvalidMaterialCurve { index, material, .. } => {
                assert_eq!(index, 3);
                assert_eq!(material, "Flange");
            }
            other => panic!("unexpected error {other:?}"),
        }
    }

    #[test]
    fn test_repeated_strain_fails() {
        let curve = curve_with_strains(&[0.0, 0.002, 0.002]);
        assert!(curve.validate("Web").is_err());
    }

    #[test]
    fn test_nonzero_first_strain_fails() {
        let curve = curve_with_strains(&[0.001, 0.002]);
        assert!(curve.validate("Web").is_err());
    }

    #[test]
    fn test_negative_stress_fails() {
        let curve = PlasticityCurve::from_pairs(&[(-1.0, 0.0), (400.0, 0.01)]);
        assert!(curve.validate("Bolt").is_err());
    }

    #[test]
    fn test_softening_fails() {
        let curve = PlasticityCurve::from_pairs(&[(400.0, 0.0), (390.0, 0.01)]);
        assert!(curve.validate("Bolt").is_err());
    }

    #[test]
    fn test_empty_curve_fails() {
        let curve = PlasticityCurve { points: vec![] };
        assert!(curve.validate("End Plate").is_err());
        assert_eq!(curve.yield_stress_mpa(), 0.0);
    }

    #[test]
    fn test_stress_interpolation() {
        let curve = PlasticityCurve::bilinear(355.0, 470.0, 0.18);
        assert_eq!(curve.stress_at(-1.0), 355.0);
        assert!((curve.stress_at(0.09) - 412.5).abs() < 1e-9);
        assert_eq!(curve.stress_at(1.0), 470.0);
    }
}
