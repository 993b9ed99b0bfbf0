//! Schema registry loading.
//!
//! The registry is the master descriptor (`schemas.json`): its `properties`
//! map each source name to a `$ref` into the shared `definitions` table.
//! Nothing here validates the registry against a meta-schema; it is trusted
//! input and structural problems surface during composition.

use std::path::{Path, PathBuf};

use serde_json::{Map, Value, json};
use tracing::debug;

use crate::{Error, Result};

const DEFINITIONS_PREFIX: &str = "#/definitions/";

/// Parsed schema registry.
#[derive(Debug, Clone)]
pub struct SchemaRegistry {
	path: PathBuf,
	properties: Map<String, Value>,
	definitions: Map<String, Value>,
	dialect: Option<Value>,
}

impl SchemaRegistry {
	/// Reads and parses the registry at `path`.
	pub fn load(path: &Path) -> Result<Self> {
		let content = std::fs::read_to_string(path).map_err(|e| Error::RegistryParse {
			path: path.to_path_buf(),
			reason: e.to_string(),
		})?;
		let registry = Self::from_str_at(&content, path)?;
		debug!(path = %path.display(), sources = registry.properties.len(), "loaded schema registry");
		Ok(registry)
	}

	/// Parses a registry held in memory.
	pub fn from_json_str(content: &str) -> Result<Self> {
		Self::from_str_at(content, Path::new("<memory>"))
	}

	fn from_str_at(content: &str, path: &Path) -> Result<Self> {
		let value: Value = serde_json::from_str(content).map_err(|e| Error::RegistryParse {
			path: path.to_path_buf(),
			reason: e.to_string(),
		})?;
		Self::from_value(value, path)
	}

	/// Builds a registry from an already parsed document.
	pub fn from_value(value: Value, path: &Path) -> Result<Self> {
		let parse_error = |reason: &str| Error::RegistryParse {
			path: path.to_path_buf(),
			reason: reason.to_string(),
		};

		let Value::Object(mut root) = value else {
			return Err(parse_error("registry must be a JSON object"));
		};
		let properties = match root.remove("properties") {
			Some(Value::Object(map)) => map,
			Some(_) => return Err(parse_error("`properties` must be an object")),
			None => return Err(parse_error("missing `properties` object")),
		};
		let definitions = match root.remove("definitions") {
			Some(Value::Object(map)) => map,
			Some(_) => return Err(parse_error("`definitions` must be an object")),
			None => Map::new(),
		};

		Ok(Self {
			path: path.to_path_buf(),
			properties,
			definitions,
			dialect: root.remove("$schema"),
		})
	}

	/// Where the registry was read from.
	pub fn path(&self) -> &Path {
		&self.path
	}

	/// Raw `properties` map, source name to schema reference object.
	pub fn properties(&self) -> &Map<String, Value> {
		&self.properties
	}

	/// Shared `definitions` table.
	pub fn definitions(&self) -> &Map<String, Value> {
		&self.definitions
	}

	/// Declared source names in registry order.
	pub fn source_names(&self) -> impl Iterator<Item = &str> {
		self.properties.keys().map(String::as_str)
	}

	/// Returns `true` if the registry declares `source_name`.
	pub fn declares(&self, source_name: &str) -> bool {
		self.properties.contains_key(source_name)
	}

	/// The `$ref` string declared for `source_name`, if any.
	pub fn schema_ref(&self, source_name: &str) -> Option<&str> {
		self.properties.get(source_name)?.get("$ref")?.as_str()
	}

	/// Resolves a local `#/definitions/<name>` reference.
	///
	/// Returns the decoded definition name alongside the definition.
	pub fn resolve(&self, reference: &str) -> Option<(String, &Value)> {
		let name = definition_name(reference)?;
		let definition = self.definitions.get(&name)?;
		Some((name, definition))
	}

	/// Builds a standalone schema that validates a whole mapping file for `source_name`.
	///
	/// The result carries the registry's `definitions` so every internal
	/// `$ref` still resolves.
	pub fn source_schema(&self, source_name: &str) -> Option<Value> {
		let reference = self.schema_ref(source_name)?;
		let mut root = Map::new();
		if let Some(dialect) = &self.dialect {
			root.insert("$schema".to_string(), dialect.clone());
		}
		root.insert("definitions".to_string(), Value::Object(self.definitions.clone()));
		root.insert("allOf".to_string(), json!([{ "$ref": reference }]));
		Some(Value::Object(root))
	}
}

/// Extracts the definition name from a `#/definitions/<name>` JSON pointer.
pub(crate) fn definition_name(reference: &str) -> Option<String> {
	let raw = reference.strip_prefix(DEFINITIONS_PREFIX)?;
	if raw.is_empty() || raw.contains('/') {
		return None;
	}
	Some(raw.replace("~1", "/").replace("~0", "~"))
}

#[cfg(test)]
mod tests {
	use super::*;

	const REGISTRY: &str = r##"{
		"$schema": "http://json-schema.org/draft-07/schema#",
		"properties": {
			"bugs": { "$ref": "#/definitions/BugsFile" },
			"wpt": { "$ref": "#/definitions/WptFile" }
		},
		"definitions": {
			"BugsFile": { "type": "object" },
			"WptFile": { "type": "object" }
		}
	}"##;

	#[test]
	fn loads_properties_and_definitions() {
		let registry = SchemaRegistry::from_json_str(REGISTRY).unwrap();
		assert_eq!(registry.source_names().collect::<Vec<_>>(), ["bugs", "wpt"]);
		assert_eq!(registry.schema_ref("wpt"), Some("#/definitions/WptFile"));
		assert!(registry.declares("bugs"));
		assert!(!registry.declares("mdn-docs"));
		assert_eq!(registry.definitions().len(), 2);
	}

	#[test]
	fn load_remembers_its_path() {
		let tmp = tempfile::TempDir::new().unwrap();
		let path = tmp.path().join("schemas.json");
		std::fs::write(&path, REGISTRY).unwrap();

		let registry = SchemaRegistry::load(&path).unwrap();
		assert_eq!(registry.path(), path);
		assert!(matches!(SchemaRegistry::load(&tmp.path().join("nope.json")), Err(Error::RegistryParse { .. })));
	}

	#[test]
	fn rejects_invalid_json() {
		let err = SchemaRegistry::from_json_str("{ not json").unwrap_err();
		assert!(matches!(err, Error::RegistryParse { .. }));
	}

	#[test]
	fn rejects_missing_properties() {
		let err = SchemaRegistry::from_json_str(r#"{ "definitions": {} }"#).unwrap_err();
		assert!(err.to_string().contains("missing `properties` object"), "{err}");
	}

	#[test]
	fn rejects_non_object_properties() {
		let err = SchemaRegistry::from_json_str(r#"{ "properties": [] }"#).unwrap_err();
		assert!(matches!(err, Error::RegistryParse { .. }));
	}

	#[test]
	fn resolves_escaped_definition_names() {
		assert_eq!(definition_name("#/definitions/a~1b~0c").as_deref(), Some("a/b~c"));
		assert_eq!(definition_name("#/definitions/"), None);
		assert_eq!(definition_name("other.json#/definitions/X"), None);
		assert_eq!(definition_name("#/definitions/X/properties/y"), None);
	}

	#[test]
	fn source_schema_wraps_reference() {
		let registry = SchemaRegistry::from_json_str(REGISTRY).unwrap();
		let schema = registry.source_schema("bugs").unwrap();
		assert_eq!(schema["allOf"][0]["$ref"], "#/definitions/BugsFile");
		assert_eq!(schema["$schema"], "http://json-schema.org/draft-07/schema#");
		assert!(schema["definitions"]["WptFile"].is_object());
		assert!(registry.source_schema("missing").is_none());
	}
}
