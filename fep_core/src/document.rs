//! # Model Document
//!
//! The `ModelDocument` is the root container written out after a build: the
//! parameters the model was built from, the resolved geometry and the
//! ordered host commands. Documents serialize to human-readable JSON.
//!
//! ## Structure
//!
//! ```text
//! ModelDocument
//! ├── meta: DocumentMeta (version, id, model name, timestamps)
//! ├── params: JointDesignParams
//! ├── geometry: ResolvedGeometry
//! ├── commands: Vec<HostCommand> (in issue order)
//! └── submitted_jobs: Vec<String>
//! ```
//!
//! ## Example
//!
//! ```rust
//! use fep_core::document::ModelDocument;
//! use fep_core::params::JointDesignParams;
//! use fep_core::resolver::resolve;
//!
//! let params = JointDesignParams::default();
//! let geometry = resolve(&params).unwrap();
//! let doc = ModelDocument::new(params, geometry);
//!
//! let json = serde_json::to_string_pretty(&doc).unwrap();
//! assert!(json.contains("FEP_Joint"));
//! ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::params::{JointDesignParams, SCHEMA_VERSION};
use crate::pipeline::HostCommand;
use crate::resolver::ResolvedGeometry;

/// Document header.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DocumentMeta {
    /// Schema version (for migration compatibility)
    pub version: String,
    pub id: Uuid,
    pub model_name: String,
    pub created: DateTime<Utc>,
    pub modified: DateTime<Utc>,
}

/// A built joint model as recorded from the host session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelDocument {
    pub meta: DocumentMeta,
    pub params: JointDesignParams,
    pub geometry: ResolvedGeometry,
    pub commands: Vec<HostCommand>,
    #[serde(default)]
    pub submitted_jobs: Vec<String>,
}

impl ModelDocument {
    /// Create an empty document for a resolved model.
    pub fn new(params: JointDesignParams, geometry: ResolvedGeometry) -> Self {
        let now = Utc::now();
        ModelDocument {
            meta: DocumentMeta {
                version: SCHEMA_VERSION.to_string(),
                id: Uuid::new_v4(),
                model_name: params.model_name.clone(),
                created: now,
                modified: now,
            },
            params,
            geometry,
            commands: Vec::new(),
            submitted_jobs: Vec::new(),
        }
    }

    /// Append commands in issue order.
    pub fn extend_commands(&mut self, commands: impl IntoIterator<Item = HostCommand>) {
        self.commands.extend(commands);
        self.touch();
    }

    /// Commands with the given operation name.
    pub fn commands_of<'a>(&'a self, op: &'a str) -> impl Iterator<Item = &'a HostCommand> + 'a {
        self.commands.iter().filter(move |c| c.op() == op)
    }

    pub fn command_count(&self) -> usize {
        self.commands.len()
    }

    /// Update the modified timestamp.
    pub fn touch(&mut self) {
        self.meta.modified = Utc::now();
    }
}
