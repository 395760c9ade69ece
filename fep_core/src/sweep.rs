//! # Z-Variation Sweep
//!
//! Resolves one base design over a range of Z-variations, the way the
//! parametric study moves the lower bolt rows. Each point is resolved
//! independently on scoped worker threads; failed points are reported
//! alongside the valid ones rather than aborting the study.
//!
//! ## Example
//!
//! ```rust
//! use fep_core::params::JointDesignParams;
//! use fep_core::sweep::{run_sweep, z_values};
//!
//! let params = JointDesignParams::default();
//! let zs = z_values(-10.0, 10.0, 5.0).unwrap();
//! let points = run_sweep(&params, &zs).unwrap();
//!
//! assert_eq!(points.len(), 5);
//! assert!(points.iter().all(|p| p.outcome.is_ok()));
//! ```

use std::thread;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::errors::{JointError, JointResult};
use crate::params::JointDesignParams;
use crate::resolver::{resolve, ResolvedGeometry};

/// Upper bound on the number of points in one sweep.
pub const MAX_SWEEP_POINTS: usize = 10_000;

/// Bolt-row summary of one valid sweep point.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SweepSummary {
    pub row2_mm: f64,
    pub row3_mm: f64,
    pub row2_to_row3_mm: f64,
    pub top_edge_distance_mm: f64,
    pub bottom_edge_distance_mm: f64,
    /// Row centres above the plate centre, row 1 first
    pub row_y_mm: Vec<f64>,
    pub note_codes: Vec<String>,
}

impl SweepSummary {
    fn from_geometry(geometry: &ResolvedGeometry) -> Self {
        SweepSummary {
            row2_mm: geometry.rows.row2_mm,
            row3_mm: geometry.rows.row3_mm,
            row2_to_row3_mm: geometry.rows.row2_to_row3_mm,
            top_edge_distance_mm: geometry.layout.top_edge_distance_mm,
            bottom_edge_distance_mm: geometry.layout.bottom_edge_distance_mm,
            row_y_mm: geometry.layout.rows.iter().map(|r| r.y_mm).collect(),
            note_codes: geometry.notes.iter().map(|n| n.code.clone()).collect(),
        }
    }
}

/// One Z-variation and its resolution outcome.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SweepPoint {
    pub z_variation_mm: f64,
    pub outcome: Result<SweepSummary, JointError>,
}

/// Inclusive range `from..=to` in steps of `step`.
///
/// # Errors
///
/// `InvalidInput` for non-finite bounds, a non-positive step, `from > to`,
/// or more than [`MAX_SWEEP_POINTS`] points.
pub fn z_values(from: f64, to: f64, step: f64) -> JointResult<Vec<f64>> {
    if !from.is_finite() || !to.is_finite() {
        return Err(JointError::invalid_input(
            "sweep range",
            format!("{from}..{to}"),
            "Bounds must be finite",
        ));
    }
    if !step.is_finite() || step <= 0.0 {
        return Err(JointError::invalid_input("sweep step", step.to_string(), "Must be positive"));
    }
    if from > to {
        return Err(JointError::invalid_input(
            "sweep range",
            format!("{from}..{to}"),
            "Start must not exceed end",
        ));
    }

    // Tolerate rounding so that `to` itself is included.
    let intervals = ((to - from) / step + 1e-9).floor();
    if intervals >= MAX_SWEEP_POINTS as f64 {
        return Err(JointError::invalid_input(
            "sweep step",
            step.to_string(),
            format!("More than {} points", MAX_SWEEP_POINTS),
        ));
    }
    Ok((0..=intervals as usize).map(|i| from + i as f64 * step).collect())
}

/// Resolve `base` once per Z-variation, in parallel.
///
/// Points come back in the order of `zs`.
///
/// # Errors
///
/// `Pipeline` when a worker thread panics; resolution failures are carried
/// per point.
pub fn run_sweep(base: &JointDesignParams, zs: &[f64]) -> JointResult<Vec<SweepPoint>> {
    let workers = thread::available_parallelism().map(|n| n.get()).unwrap_or(1);
    let chunk = zs.len().div_ceil(workers).max(1);
    info!(points = zs.len(), workers, "running Z-variation sweep");

    thread::scope(|scope| {
        let handles: Vec<_> = zs
            .chunks(chunk)
            .map(|part| {
                scope.spawn(move || part.iter().map(|&z| sweep_point(base, z)).collect::<Vec<_>>())
            })
            .collect();

        let mut points = Vec::with_capacity(zs.len());
        for handle in handles {
            let chunk_points = handle.join().map_err(|_| JointError::Pipeline {
                reason: "Sweep worker panicked".to_string(),
            })?;
            points.extend(chunk_points);
        }
        Ok(points)
    })
}

fn sweep_point(base: &JointDesignParams, z: f64) -> SweepPoint {
    let mut params = base.clone();
    params.end_plate.z_variation_mm = z;
    let outcome = resolve(&params).map(|g| SweepSummary::from_geometry(&g));
    if let Err(e) = &outcome {
        debug!(z, code = e.error_code(), "sweep point rejected");
    }
    SweepPoint {
        z_variation_mm: z,
        outcome,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::params::EdgeDistancePolicy;

    #[test]
    fn test_z_values_inclusive() {
        assert_eq!(z_values(-10.0, 10.0, 10.0).unwrap(), vec![-10.0, 0.0, 10.0]);
        assert_eq!(z_values(0.0, 0.3, 0.1).unwrap().len(), 4);
        assert_eq!(z_values(5.0, 5.0, 1.0).unwrap(), vec![5.0]);
    }

    #[test]
    fn test_z_values_rejects_bad_ranges() {
        assert!(z_values(0.0, 10.0, 0.0).is_err());
        assert!(z_values(0.0, 10.0, f64::NAN).is_err());
        assert!(z_values(10.0, 0.0, 1.0).is_err());
        assert!(z_values(0.0, 1e9, 1.0).is_err());
    }

    #[test]
    fn test_sweep_keeps_gap_constant() {
        let params = JointDesignParams::default();
        let points = run_sweep(&params, &z_values(-20.0, 20.0, 5.0).unwrap()).unwrap();
        assert_eq!(points.len(), 9);
        for point in &points {
            let summary = point.outcome.as_ref().unwrap();
            assert!((summary.row2_to_row3_mm - 65.0).abs() < 1e-9);
        }
        // Compensating policy: rows 2 and 3 stay put, only row 1 moves.
        let first = points[0].outcome.as_ref().unwrap();
        let last = points[8].outcome.as_ref().unwrap();
        assert_eq!(first.row_y_mm[1], last.row_y_mm[1]);
        assert_ne!(first.row_y_mm[0], last.row_y_mm[0]);
    }

    #[test]
    fn test_sweep_reports_invalid_points_in_order() {
        let params = JointDesignParams::default();
        let zs = [0.0, 10.0, -80.0];
        let points = run_sweep(&params, &zs).unwrap();
        assert_eq!(points.iter().map(|p| p.z_variation_mm).collect::<Vec<_>>(), zs.to_vec());
        assert!(points[0].outcome.is_ok());
        assert_eq!(points[1].outcome.as_ref().unwrap().note_codes.len(), 1);
        assert_eq!(points[2].outcome.as_ref().unwrap_err().error_code(), "INVALID_ROW_SPACING");
    }

    #[test]
    fn test_fixed_policy_moves_lower_rows() {
        let mut params = JointDesignParams::default();
        params.end_plate.edge_distance_policy = EdgeDistancePolicy::Fixed;
        let points = run_sweep(&params, &[0.0, 10.0]).unwrap();
        let a = points[0].outcome.as_ref().unwrap();
        let b = points[1].outcome.as_ref().unwrap();
        assert_eq!(a.row_y_mm[0], b.row_y_mm[0]);
        assert!((a.row_y_mm[2] - b.row_y_mm[2] - 10.0).abs() < 1e-9);
        assert!(b.note_codes.is_empty());
    }
}
