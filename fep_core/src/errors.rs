//! # Error Types
//!
//! Structured error types for fep_core. Design errors (bad sections, bolts,
//! row spacings, assemblies and material curves) are raised while resolving
//! the joint geometry, before a single command reaches the CAE host. Host
//! failures are carried through verbatim.
//!
//! ## Example
//!
//! ```rust
//! use fep_core::errors::{JointError, JointResult};
//!
//! fn check_clearance(clearance_mm: f64) -> JointResult<()> {
//!     if clearance_mm <= 0.0 {
//!         return Err(JointError::invalid_bolt(
//!             "hole_clearance_mm",
//!             clearance_mm,
//!             "Hole clearance must be positive",
//!         ));
//!     }
//!     Ok(())
//! }
//!
//! assert_eq!(check_clearance(0.0).unwrap_err().error_code(), "INVALID_BOLT");
//! ```

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Result type alias for fep_core operations
pub type JointResult<T> = Result<T, JointError>;

/// Structured error type for resolution, build and file operations.
#[derive(Error, Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", content = "details")]
pub enum JointError {
    /// A member cross-section is not physically meaningful
    #[error("Invalid {member} section '{field}' = {value}: {reason}")]
    InvalidSection {
        member: String,
        field: String,
        value: f64,
        reason: String,
    },

    /// Bolt diameter, clearance or head/nut size is invalid
    #[error("Invalid bolt '{field}' = {value}: {reason}")]
    InvalidBolt {
        field: String,
        value: f64,
        reason: String,
    },

    /// Bolt rows are not strictly ordered or overlap
    #[error("Invalid bolt row spacing: row2 = {row2_mm} mm, row3 = {row3_mm} mm - {reason}")]
    InvalidRowSpacing {
        row2_mm: f64,
        row3_mm: f64,
        reason: String,
    },

    /// Two solid bodies would be placed in geometric conflict
    #[error("Invalid assembly between {first} and {second}: {reason}")]
    InvalidAssembly {
        first: String,
        second: String,
        reason: String,
    },

    /// A plasticity curve is not monotonic or has negative stress
    #[error("Invalid plasticity curve for '{material}' at point {index}: {reason}")]
    InvalidMaterialCurve {
        material: String,
        index: usize,
        reason: String,
    },

    /// A scalar input is invalid (out of range, non-finite, empty name)
    #[error("Invalid input for '{field}': {value} - {reason}")]
    InvalidInput {
        field: String,
        value: String,
        reason: String,
    },

    /// The CAE host rejected a command; the message is the host's own
    #[error("Host error during {stage} ({command}): {message}")]
    Host {
        stage: String,
        command: String,
        message: String,
    },

    /// The build pipeline is inconsistent (cycle, missing dependency)
    #[error("Pipeline error: {reason}")]
    Pipeline { reason: String },

    /// File I/O error
    #[error("File error: {operation} on '{path}' - {reason}")]
    FileError {
        operation: String,
        path: String,
        reason: String,
    },

    /// JSON serialization/deserialization error
    #[error("Serialization error: {reason}")]
    SerializationError { reason: String },

    /// Schema version mismatch
    #[error("Version mismatch: file version {file_version}, expected {expected_version}")]
    VersionMismatch {
        file_version: String,
        expected_version: String,
    },
}

impl JointError {
    /// Create an InvalidSection error
    pub fn invalid_section(
        member: impl Into<String>,
        field: impl Into<String>,
        value: f64,
        reason: impl Into<String>,
    ) -> Self {
        JointError::InvalidSection {
            member: member.into(),
            field: field.into(),
            value,
            reason: reason.into(),
        }
    }

    /// Create an InvalidBolt error
    pub fn invalid_bolt(field: impl Into<String>, value: f64, reason: impl Into<String>) -> Self {
        JointError::InvalidBolt {
            field: field.into(),
            value,
            reason: reason.into(),
        }
    }

    /// Create an InvalidRowSpacing error
    pub fn invalid_row_spacing(row2_mm: f64, row3_mm: f64, reason: impl Into<String>) -> Self {
        JointError::InvalidRowSpacing {
            row2_mm,
            row3_mm,
            reason: reason.into(),
        }
    }

    /// Create an InvalidAssembly error
    pub fn invalid_assembly(
        first: impl Into<String>,
        second: impl Into<String>,
        reason: impl Into<String>,
    ) -> Self {
        JointError::InvalidAssembly {
            first: first.into(),
            second: second.into(),
            reason: reason.into(),
        }
    }

    /// Create an InvalidMaterialCurve error
    pub fn invalid_curve(
        material: impl Into<String>,
        index: usize,
        reason: impl Into<String>,
    ) -> Self {
        JointError::InvalidMaterialCurve {
            material: material.into(),
            index,
            reason: reason.into(),
        }
    }

    /// Create an InvalidInput error
    pub fn invalid_input(
        field: impl Into<String>,
        value: impl Into<String>,
        reason: impl Into<String>,
    ) -> Self {
        JointError::InvalidInput {
            field: field.into(),
            value: value.into(),
            reason: reason.into(),
        }
    }

    /// Create a Host error
    pub fn host(
        stage: impl Into<String>,
        command: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        JointError::Host {
            stage: stage.into(),
            command: command.into(),
            message: message.into(),
        }
    }

    /// Create a FileError
    pub fn file_error(
        operation: impl Into<String>,
        path: impl Into<String>,
        reason: impl Into<String>,
    ) -> Self {
        JointError::FileError {
            operation: operation.into(),
            path: path.into(),
            reason: reason.into(),
        }
    }

    /// True for errors caused by the design parameters themselves.
    ///
    /// These are deterministic: re-running with the same parameters fails the
    /// same way, so callers should never retry them.
    pub fn is_design_error(&self) -> bool {
        matches!(
            self,
            JointError::InvalidSection { .. }
                | JointError::InvalidBolt { .. }
                | JointError::InvalidRowSpacing { .. }
                | JointError::InvalidAssembly { .. }
                | JointError::InvalidMaterialCurve { .. }
                | JointError::InvalidInput { .. }
        )
    }

    /// Get a short error code for programmatic handling
    pub fn error_code(&self) -> &'static str {
        match self {
            JointError::InvalidSection { .. } => "INVALID_SECTION",
            JointError::InvalidBolt { .. } => "INVALID_BOLT",
            JointError::InvalidRowSpacing { .. } => "INVALID_ROW_SPACING",
            JointError::InvalidAssembly { .. } => "INVALID_ASSEMBLY",
            JointError::InvalidMaterialCurve { .. } => "INVALID_MATERIAL_CURVE",
            JointError::InvalidInput { .. } => "INVALID_INPUT",
            JointError::Host { .. } => "HOST_ERROR",
            JointError::Pipeline { .. } => "PIPELINE_ERROR",
            JointError::FileError { .. } => "FILE_ERROR",
            JointError::SerializationError { .. } => "SERIALIZATION_ERROR",
            JointError::VersionMismatch { .. } => "VERSION_MISMATCH",
        }
    }
}

impl From<serde_json::Error> for JointError {
    fn from(e: serde_json::Error) -> Self {
        JointError::SerializationError { reason: e.to_string() }
    }
}
