use pretty_assertions::assert_eq;
use serde_json::json;

use super::*;

fn registry(value: Value) -> SchemaRegistry {
	SchemaRegistry::from_value(value, std::path::Path::new("schemas.json")).unwrap()
}

fn two_source_registry() -> SchemaRegistry {
	registry(json!({
		"properties": {
			"wpt": { "$ref": "#/definitions/WptFile" },
			"bugs": { "$ref": "#/definitions/BugsFile" }
		},
		"definitions": {
			"BugsFile": { "type": "object", "patternProperties": { ".*": { "$ref": "#/definitions/Bugs" } } },
			"Bugs": { "type": "array", "items": { "type": "string", "format": "uri" } },
			"WptFile": { "type": "object", "patternProperties": { "^.*$": { "$ref": "#/definitions/Wpt" } } },
			"Wpt": { "type": "object", "properties": { "url": { "type": "string" } }, "required": ["url"] }
		}
	}))
}

#[test]
fn composes_value_schemas_in_registry_order() {
	let schema = compose(&two_source_registry()).unwrap();

	assert_eq!(schema["$schema"], COMBINED_SCHEMA_DIALECT);
	assert_eq!(schema["title"], COMBINED_SCHEMA_TITLE);
	assert_eq!(schema["type"], "object");
	assert_eq!(
		schema["additionalProperties"],
		json!({
			"type": "object",
			"properties": {
				"wpt": { "$ref": "#/definitions/Wpt" },
				"bugs": { "$ref": "#/definitions/Bugs" }
			},
			"additionalProperties": false
		})
	);
	let sources: Vec<&str> = schema["additionalProperties"]["properties"]
		.as_object()
		.unwrap()
		.keys()
		.map(String::as_str)
		.collect();
	assert_eq!(sources, ["wpt", "bugs"]);
	assert_eq!(schema["definitions"].as_object().unwrap().len(), 4);
}

#[test]
fn composition_is_byte_stable() {
	let registry = two_source_registry();
	let first = serde_json::to_string_pretty(&compose(&registry).unwrap()).unwrap();
	let second = serde_json::to_string_pretty(&compose(&registry).unwrap()).unwrap();
	assert_eq!(first, second);
}

#[test]
fn empty_registry_composes_closed_buckets() {
	let schema = compose(&registry(json!({ "properties": {} }))).unwrap();
	assert_eq!(schema["additionalProperties"]["properties"], json!({}));
	assert_eq!(schema["additionalProperties"]["additionalProperties"], false);
}

fn composition_error(value: Value) -> String {
	match compose(&registry(value)).unwrap_err() {
		Error::SchemaComposition { source_name, reason } => format!("{source_name}: {reason}"),
		other => panic!("unexpected error: {other}"),
	}
}

#[test]
fn rejects_missing_ref() {
	let reason = composition_error(json!({ "properties": { "bugs": { "type": "object" } } }));
	assert_eq!(reason, "bugs: registry entry has no string `$ref`");
}

#[test]
fn rejects_dangling_container_ref() {
	let reason = composition_error(json!({
		"properties": { "bugs": { "$ref": "#/definitions/Nope" } },
		"definitions": {}
	}));
	assert!(reason.contains("does not resolve"), "{reason}");
}

#[test]
fn rejects_multiple_pattern_properties() {
	let reason = composition_error(json!({
		"properties": { "bugs": { "$ref": "#/definitions/BugsFile" } },
		"definitions": {
			"BugsFile": { "patternProperties": { ".*": { "$ref": "#/definitions/B" }, "^x": { "$ref": "#/definitions/B" } } },
			"B": {}
		}
	}));
	assert!(reason.contains("exactly one pattern property, found 2"), "{reason}");
}

#[test]
fn rejects_non_wildcard_pattern() {
	let reason = composition_error(json!({
		"properties": { "bugs": { "$ref": "#/definitions/BugsFile" } },
		"definitions": {
			"BugsFile": { "patternProperties": { "^[a-z]+$": { "$ref": "#/definitions/B" } } },
			"B": {}
		}
	}));
	assert!(reason.contains("is not a wildcard"), "{reason}");
}

#[test]
fn rejects_dangling_value_ref() {
	let reason = composition_error(json!({
		"properties": { "bugs": { "$ref": "#/definitions/BugsFile" } },
		"definitions": {
			"BugsFile": { "patternProperties": { ".*": { "$ref": "#/definitions/Missing" } } }
		}
	}));
	assert!(reason.contains("`#/definitions/Missing` does not resolve"), "{reason}");
}

#[test]
fn rejects_inline_value_schema() {
	let reason = composition_error(json!({
		"properties": { "bugs": { "$ref": "#/definitions/BugsFile" } },
		"definitions": {
			"BugsFile": { "patternProperties": { ".*": { "type": "string" } } }
		}
	}));
	assert!(reason.contains("has no `$ref`"), "{reason}");
}
