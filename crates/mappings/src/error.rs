//! Error and diagnostic types shared by every stage of a run.
//!
//! Pipeline-level failures ([`Error`]) abort a run immediately. Data-level
//! findings ([`Violation`]) are collected exhaustively and only turned into
//! an [`Error::Validation`] once every file has been checked.

use std::path::PathBuf;

/// Errors raised while loading, composing, merging or persisting mappings.
#[derive(Debug, thiserror::Error)]
pub enum Error {
	/// The schema registry is not JSON or lacks a `properties` object.
	#[error("failed to parse schema registry {}: {reason}", path.display())]
	RegistryParse {
		/// Registry file, or `<memory>` for in-process documents.
		path: PathBuf,
		/// What was wrong with it.
		reason: String,
	},

	/// A registry entry does not resolve to a single wildcard value schema.
	#[error("cannot compose schema for source '{source_name}': {reason}")]
	SchemaComposition {
		/// Offending registry entry.
		source_name: String,
		/// What was wrong with it.
		reason: String,
	},

	/// A mapping file is not valid JSON or not a JSON object.
	#[error("failed to parse source mapping {}: {reason}", path.display())]
	SourceParse {
		/// Offending file.
		path: PathBuf,
		/// Parser message.
		reason: String,
	},

	/// Two discovered files derive the same source name.
	#[error("duplicate source name '{source_name}' derived from {} and {}", first.display(), second.display())]
	DuplicateSource {
		/// Derived source name.
		source_name: String,
		/// File discovered first.
		first: PathBuf,
		/// File discovered second.
		second: PathBuf,
	},

	/// The mapping file name pattern is not a valid glob.
	#[error("invalid mapping file pattern '{pattern}': {reason}")]
	InvalidPattern {
		/// Pattern as configured.
		pattern: String,
		/// Glob compiler message.
		reason: String,
	},

	/// The external feature identifier registry could not be read.
	#[error("failed to load feature registry {}: {reason}", path.display())]
	FeatureRegistry {
		/// Registry file.
		path: PathBuf,
		/// What was wrong with it.
		reason: String,
	},

	/// A schema could not be compiled into a validator.
	#[error("invalid JSON schema for {subject}: {reason}")]
	InvalidSchema {
		/// What the schema governs.
		subject: String,
		/// Compiler message.
		reason: String,
	},

	/// One or more documents violate their schema or reference unknown features.
	#[error("{} validation error{}", violations.len(), if violations.len() == 1 { "" } else { "s" })]
	Validation {
		/// Every violation found, in check order.
		violations: Vec<Violation>,
	},

	/// The project configuration file is malformed.
	#[error("invalid configuration {}: {reason}", path.display())]
	Config {
		/// Configuration file.
		path: PathBuf,
		/// Parser message.
		reason: String,
	},

	/// Filesystem failure outside of JSON parsing.
	#[error("I/O error on {}: {source}", path.display())]
	Io {
		/// Path being read or written.
		path: PathBuf,
		/// Underlying error.
		#[source]
		source: std::io::Error,
	},
}

impl Error {
	pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
		Self::Io { path: path.into(), source }
	}
}

/// Result type for mapping operations.
pub type Result<T> = std::result::Result<T, Error>;

/// A single data-level finding.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Violation {
	/// The document does not conform to its schema at `path`.
	Schema {
		/// Source name, or the combined document's label.
		document: String,
		/// JSON pointer into the document; empty for the root.
		path: String,
		/// Validator message.
		message: String,
	},
	/// A top-level key is absent from the external feature registry.
	UnknownIdentifier {
		/// Source name, or the combined document's label.
		document: String,
		/// The unknown feature identifier.
		feature: String,
	},
}

impl Violation {
	/// Document the violation was found in.
	pub fn document(&self) -> &str {
		match self {
			Self::Schema { document, .. } | Self::UnknownIdentifier { document, .. } => document,
		}
	}
}

impl std::fmt::Display for Violation {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		match self {
			Self::Schema { document, path, message } => {
				let path = if path.is_empty() { "root" } else { path.as_str() };
				write!(f, "{document}: {path}: {message}")
			}
			Self::UnknownIdentifier { document, feature } => {
				write!(f, "{document}: feature ID \"{feature}\" does not exist in web-features")
			}
		}
	}
}

/// Non-fatal drift between the schema registry and the files on disk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConsistencyWarning {
	/// The registry declares a source but no mapping file was discovered.
	DeclaredButAbsent {
		/// Declared source name.
		source_name: String,
	},
	/// A mapping file was discovered with no registry entry; it is not schema-checked.
	MissingSchema {
		/// Discovered source name.
		source_name: String,
	},
}

impl std::fmt::Display for ConsistencyWarning {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		match self {
			Self::DeclaredButAbsent { source_name } => {
				write!(f, "schema definition exists for \"{source_name}\" but no corresponding mapping file was found")
			}
			Self::MissingSchema { source_name } => {
				write!(f, "no schema definition found for \"{source_name}\", skipping schema validation")
			}
		}
	}
}
