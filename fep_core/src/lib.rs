//! # fep_core - Flush End-Plate Joint Model Builder
//!
//! `fep_core` turns the independent design parameters of a steel flush
//! end-plate beam-to-column joint into a consistent finite-element model.
//! Every input and output is JSON-serializable.
//!
//! ## Design Philosophy
//!
//! - **Resolve first**: every derived dimension is computed and checked
//!   before the CAE host sees a single command
//! - **Pure resolver**: geometry resolution has no side effects and can run
//!   concurrently
//! - **Semantic regions**: faces, edges and cells are addressed by what they
//!   are, never by index masks
//! - **Rich Errors**: structured error types, not just strings
//!
//! ## Quick Start
//!
//! ```rust
//! use fep_core::params::JointDesignParams;
//! use fep_core::pipeline::{BuildOptions, ModelBuilder, RecordingHost};
//!
//! let params = JointDesignParams::default();
//! let builder = ModelBuilder::new(&params).unwrap();
//! assert_eq!(builder.geometry().column.web_height_mm, 216.0);
//!
//! let mut host = RecordingHost::new();
//! builder.build(&mut host, BuildOptions::default()).unwrap();
//! let doc = host.into_document(params.clone(), builder.geometry().clone());
//! assert!(doc.command_count() > 0);
//! ```
//!
//! ## Modules
//!
//! - [`params`] - Design parameters and the reference specimen
//! - [`materials`] - Elastic-plastic material models and the reference library
//! - [`resolver`] - Dimension resolver
//! - [`features`] - Semantic regions and their locators
//! - [`pipeline`] - Stage graph, host boundary and model builder
//! - [`document`] - Built model document
//! - [`sweep`] - Z-variation studies
//! - [`geometry`] - Vectors, placements and boxes
//! - [`errors`] - Structured error types
//! - [`file_io`] - JSON files with atomic saves

pub mod document;
pub mod errors;
pub mod features;
pub mod file_io;
pub mod geometry;
pub mod materials;
pub mod params;
pub mod pipeline;
pub mod resolver;
pub mod sweep;

pub use document::ModelDocument;
pub use errors::{JointError, JointResult};
pub use file_io::{load_document, load_params, save_document, save_params};
pub use params::JointDesignParams;
pub use resolver::{resolve, ResolvedGeometry};
