//! # File I/O Module
//!
//! Reads and writes parameter sets and model documents as JSON:
//! - **Atomic saves**: write to a `.tmp` sibling, sync, rename over the target
//! - **Version validation**: files from an incompatible schema are rejected
//!
//! ## Example
//!
//! ```rust,no_run
//! use fep_core::file_io::{load_params, save_params};
//! use fep_core::params::JointDesignParams;
//! use std::path::Path;
//!
//! let params = JointDesignParams::default();
//! save_params(&params, Path::new("joint.json"))?;
//!
//! let loaded = load_params(Path::new("joint.json"))?;
//! assert_eq!(loaded, params);
//! # Ok::<(), fep_core::errors::JointError>(())
//! ```

use std::fs::{self, File};
use std::io::{Read, Write};
use std::path::{Path, PathBuf};

use semver::Version;
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::debug;

use crate::document::ModelDocument;
use crate::errors::{JointError, JointResult};
use crate::params::{JointDesignParams, SCHEMA_VERSION};

/// Save a parameter set with atomic write semantics.
pub fn save_params(params: &JointDesignParams, path: &Path) -> JointResult<()> {
    write_json_atomic(params, path)
}

/// Load a parameter set and check its schema version.
///
/// Only the file format is checked here; design consistency is the
/// resolver's job.
///
/// # Errors
///
/// * `FileError` - I/O error
/// * `SerializationError` - invalid JSON or missing fields
/// * `VersionMismatch` - file schema is incompatible
pub fn load_params(path: &Path) -> JointResult<JointDesignParams> {
    let params: JointDesignParams = read_json(path)?;
    validate_version(&params.schema_version)?;
    Ok(params)
}

/// Save a built model document with atomic write semantics.
pub fn save_document(document: &ModelDocument, path: &Path) -> JointResult<()> {
    write_json_atomic(document, path)
}

/// Load a model document and check its schema version.
pub fn load_document(path: &Path) -> JointResult<ModelDocument> {
    let document: ModelDocument = read_json(path)?;
    validate_version(&document.meta.version)?;
    Ok(document)
}

/// Temporary sibling used during an atomic save, e.g. `joint.json.tmp`.
fn tmp_path_for(path: &Path) -> PathBuf {
    let mut name = path.file_name().map(|n| n.to_os_string()).unwrap_or_default();
    name.push(".tmp");
    path.with_file_name(name)
}

/// Serialize to pretty JSON, write to a temp file, sync, rename over `path`.
fn write_json_atomic<T: Serialize>(value: &T, path: &Path) -> JointResult<()> {
    let json = serde_json::to_string_pretty(value)?;
    let tmp_path = tmp_path_for(path);

    let tmp_error = |operation: &str, e: std::io::Error| {
        JointError::file_error(operation, tmp_path.display().to_string(), e.to_string())
    };

    let mut tmp_file = File::create(&tmp_path).map_err(|e| tmp_error("create temp file", e))?;

    tmp_file
        .write_all(json.as_bytes())
        .map_err(|e| tmp_error("write temp file", e))?;

    tmp_file
        .sync_all()
        .map_err(|e| tmp_error("sync temp file", e))?;
    drop(tmp_file);

    fs::rename(&tmp_path, path).map_err(|e| {
        let _ = fs::remove_file(&tmp_path);
        JointError::file_error("rename to final", path.display().to_string(), e.to_string())
    })?;

    debug!(path = %path.display(), bytes = json.len(), "saved");
    Ok(())
}

fn read_json<T: DeserializeOwned>(path: &Path) -> JointResult<T> {
    let mut file = File::open(path)
        .map_err(|e| JointError::file_error("open", path.display().to_string(), e.to_string()))?;

    let mut contents = String::new();
    file.read_to_string(&mut contents)
        .map_err(|e| JointError::file_error("read", path.display().to_string(), e.to_string()))?;

    serde_json::from_str(&contents).map_err(|e| JointError::SerializationError {
        reason: format!("Invalid JSON in {}: {}", path.display(), e),
    })
}

/// Check that a file's schema version can be read by this build.
///
/// Major versions must match. While the schema is 0.x, a file with a newer
/// minor version is rejected as well.
pub fn validate_version(file_version: &str) -> JointResult<()> {
    let mismatch = || JointError::VersionMismatch {
        file_version: file_version.to_string(),
        expected_version: SCHEMA_VERSION.to_string(),
    };

    let file = Version::parse(file_version).map_err(|_| mismatch())?;
    let current = Version::parse(SCHEMA_VERSION).map_err(|_| mismatch())?;

    if file.major != current.major {
        return Err(mismatch());
    }
    if current.major == 0 && file.minor > current.minor {
        return Err(mismatch());
    }
    Ok(())
}
