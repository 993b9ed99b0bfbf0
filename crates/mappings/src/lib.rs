//! Aggregation and validation of web feature mapping files.
//!
//! Independent producers each write one JSON file keyed by feature
//! identifier. This crate composes their per-source schemas into a combined
//! schema, merges the files into one canonical document keyed by feature
//! identifier, and validates both the inputs and the result against the
//! schema registry and the external feature registry.

/// Generated artifact rendering and atomic persistence.
pub mod artifact;
/// Combined schema composition.
pub mod compose;
/// Project configuration.
pub mod config;
/// Registry/file drift detection.
pub mod consistency;
mod error;
/// External feature identifier registry.
pub mod features;
/// Combined document merge.
pub mod merge;
/// Run-level orchestration.
pub mod pipeline;
/// Schema registry loading.
pub mod registry;
/// Mapping file discovery and parsing.
pub mod source;
/// Schema and identifier validation.
pub mod validate;

pub use artifact::{Artifact, Freshness, Staged, WriteOutcome};
pub use compose::compose;
pub use config::Config;
pub use error::{ConsistencyWarning, Error, Result, Violation};
pub use features::FeatureIndex;
pub use merge::{CombinedDocument, merge};
pub use pipeline::{ArtifactStatus, Persist, RunReport, Workspace};
pub use registry::SchemaRegistry;
pub use source::{DiscoveryOptions, SourceMapping};
pub use validate::{SchemaValidator, SourceReport, Validator};
