//! Combined schema composition.
//!
//! Every registry definition is a container schema: a single wildcard
//! `patternProperties` entry mapping any feature identifier to the source's
//! value schema. Composition lifts those value schemas into one object
//! schema keyed by source name, which then governs each per-identifier
//! bucket of the combined document.

use serde_json::{Map, Value, json};
use tracing::debug;

use crate::registry::SchemaRegistry;
use crate::{Error, Result};

/// Dialect of the generated schema.
pub const COMBINED_SCHEMA_DIALECT: &str = "http://json-schema.org/draft-07/schema#";
/// `title` of the generated schema.
pub const COMBINED_SCHEMA_TITLE: &str = "Combined Web Feature Mappings Data";
/// `description` of the generated schema.
pub const COMBINED_SCHEMA_DESCRIPTION: &str = "Schema for the combined web feature mappings document.";

/// Pattern property keys accepted as "any feature identifier".
const WILDCARD_PATTERNS: &[&str] = &[".*", "^.*$", "^(.*)$"];

/// Composes the combined schema from `registry`.
///
/// Output depends only on the registry contents, in registry order, so an
/// unchanged registry always serializes to identical bytes.
pub fn compose(registry: &SchemaRegistry) -> Result<Value> {
	let mut properties = Map::new();
	for source_name in registry.source_names() {
		let value_ref = value_schema_ref(registry, source_name)?;
		debug!(source = source_name, value_ref = %value_ref, "composed source");
		properties.insert(source_name.to_string(), json!({ "$ref": value_ref }));
	}

	let bucket = json!({
		"type": "object",
		"properties": properties,
		"additionalProperties": false,
	});

	Ok(json!({
		"$schema": COMBINED_SCHEMA_DIALECT,
		"title": COMBINED_SCHEMA_TITLE,
		"description": COMBINED_SCHEMA_DESCRIPTION,
		"type": "object",
		"definitions": registry.definitions(),
		"additionalProperties": bucket,
	}))
}

/// Returns the value schema reference declared by `source_name`'s container schema.
pub fn value_schema_ref(registry: &SchemaRegistry, source_name: &str) -> Result<String> {
	let fail = |reason: String| Error::SchemaComposition {
		source_name: source_name.to_string(),
		reason,
	};

	let container_ref = registry
		.schema_ref(source_name)
		.ok_or_else(|| fail("registry entry has no string `$ref`".to_string()))?;
	let (container_name, container) = registry
		.resolve(container_ref)
		.ok_or_else(|| fail(format!("`{container_ref}` does not resolve to a definition")))?;

	let patterns = container
		.get("patternProperties")
		.and_then(Value::as_object)
		.ok_or_else(|| fail(format!("definition `{container_name}` has no `patternProperties`")))?;

	let mut entries = patterns.iter();
	let (pattern, value_schema) = match (entries.next(), entries.next()) {
		(Some(entry), None) => entry,
		_ => {
			return Err(fail(format!(
				"definition `{container_name}` must declare exactly one pattern property, found {}",
				patterns.len()
			)));
		}
	};
	if !WILDCARD_PATTERNS.contains(&pattern.as_str()) {
		return Err(fail(format!("pattern `{pattern}` in `{container_name}` is not a wildcard")));
	}

	let value_ref = value_schema
		.get("$ref")
		.and_then(Value::as_str)
		.ok_or_else(|| fail(format!("wildcard value schema in `{container_name}` has no `$ref`")))?;
	if registry.resolve(value_ref).is_none() {
		return Err(fail(format!("value schema `{value_ref}` does not resolve to a definition")));
	}

	Ok(value_ref.to_string())
}

#[cfg(test)]
mod tests;
