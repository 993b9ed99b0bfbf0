//! Schema and identifier validation.
//!
//! Nothing here stops at the first problem: every check returns the full
//! list of [`Violation`]s so a run can report them all at once.

use serde_json::Value;

use crate::compose::COMBINED_SCHEMA_DIALECT;
use crate::features::FeatureIndex;
use crate::registry::SchemaRegistry;
use crate::source::SourceMapping;
use crate::{Error, Result, Violation};

/// Label used for violations found in the combined document.
pub const COMBINED_DOCUMENT: &str = "combined";

/// A compiled JSON schema.
pub struct SchemaValidator {
	validator: jsonschema::Validator,
}

impl std::fmt::Debug for SchemaValidator {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("SchemaValidator").finish_non_exhaustive()
	}
}

impl SchemaValidator {
	/// Compiles `schema`, with format assertions enabled.
	///
	/// Schemas without a `$schema` keyword are treated as draft-07.
	pub fn new(subject: &str, schema: &Value) -> Result<Self> {
		let with_dialect;
		let schema = match schema {
			Value::Object(map) if !map.contains_key("$schema") => {
				let mut map = map.clone();
				map.insert("$schema".to_string(), Value::String(COMBINED_SCHEMA_DIALECT.to_string()));
				with_dialect = Value::Object(map);
				&with_dialect
			}
			_ => schema,
		};

		let validator = jsonschema::options()
			.should_validate_formats(true)
			.build(schema)
			.map_err(|e| Error::InvalidSchema {
				subject: subject.to_string(),
				reason: e.to_string(),
			})?;
		Ok(Self { validator })
	}

	/// Every schema violation in `instance`, labelled with `document`.
	pub fn violations(&self, document: &str, instance: &Value) -> Vec<Violation> {
		self.validator
			.iter_errors(instance)
			.map(|error| Violation::Schema {
				document: document.to_string(),
				path: error.instance_path().to_string(),
				message: error.to_string(),
			})
			.collect()
	}
}

/// One [`Violation::UnknownIdentifier`] per identifier missing from `features`.
pub fn unknown_identifiers<'a>(document: &str, ids: impl IntoIterator<Item = &'a str>, features: &FeatureIndex) -> Vec<Violation> {
	ids.into_iter()
		.filter(|id| !features.contains(id))
		.map(|id| Violation::UnknownIdentifier {
			document: document.to_string(),
			feature: id.to_string(),
		})
		.collect()
}

/// Outcome of checking one source mapping.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceReport {
	/// Source name.
	pub source_name: String,
	/// `false` when the registry has no schema for the source.
	pub schema_checked: bool,
	/// Schema violations followed by unknown identifiers.
	pub violations: Vec<Violation>,
}

impl SourceReport {
	/// Returns `true` if no violations were found.
	pub fn is_valid(&self) -> bool {
		self.violations.is_empty()
	}
}

/// Checks documents against the registry and the feature index.
#[derive(Debug, Clone, Copy)]
pub struct Validator<'a> {
	registry: &'a SchemaRegistry,
	features: &'a FeatureIndex,
}

impl<'a> Validator<'a> {
	/// Creates a validator over `registry` and `features`.
	pub fn new(registry: &'a SchemaRegistry, features: &'a FeatureIndex) -> Self {
		Self { registry, features }
	}

	/// Validates one mapping against its registry schema and the feature index.
	///
	/// A source the registry does not declare skips schema validation but
	/// still gets the identifier check.
	pub fn check_source(&self, source: &SourceMapping) -> Result<SourceReport> {
		let name = source.name();
		let mut violations = Vec::new();

		let schema_checked = match self.registry.source_schema(name) {
			Some(schema) => {
				let validator = SchemaValidator::new(name, &schema)?;
				violations.extend(validator.violations(name, &source.to_value()));
				true
			}
			None => false,
		};
		violations.extend(unknown_identifiers(name, source.feature_ids(), self.features));

		Ok(SourceReport {
			source_name: name.to_string(),
			schema_checked,
			violations,
		})
	}

	/// Validates a combined document against `combined_schema` and the feature index.
	pub fn check_combined(&self, combined_schema: &Value, document: &Value) -> Result<Vec<Violation>> {
		let validator = SchemaValidator::new("combined schema", combined_schema)?;
		let mut violations = validator.violations(COMBINED_DOCUMENT, document);
		if let Value::Object(features) = document {
			violations.extend(unknown_identifiers(COMBINED_DOCUMENT, features.keys().map(String::as_str), self.features));
		}
		Ok(violations)
	}
}
