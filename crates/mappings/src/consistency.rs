//! Drift between the schema registry and the mapping files on disk.

use std::collections::HashSet;

use crate::ConsistencyWarning;
use crate::registry::SchemaRegistry;

/// Cross-checks declared sources against `discovered` source names.
///
/// Declared-but-absent warnings come first in registry order, followed by
/// missing-schema warnings in discovery order.
pub fn check<'a>(registry: &SchemaRegistry, discovered: impl IntoIterator<Item = &'a str>) -> Vec<ConsistencyWarning> {
	let discovered: Vec<&str> = discovered.into_iter().collect();
	let on_disk: HashSet<&str> = discovered.iter().copied().collect();

	let absent = registry
		.source_names()
		.filter(|name| !on_disk.contains(name))
		.map(|name| ConsistencyWarning::DeclaredButAbsent {
			source_name: name.to_string(),
		});
	let unregistered = discovered
		.iter()
		.filter(|name| !registry.declares(name))
		.map(|name| ConsistencyWarning::MissingSchema {
			source_name: name.to_string(),
		});

	absent.chain(unregistered).collect()
}

#[cfg(test)]
mod tests {
	use super::*;

	fn registry(sources: &[&str]) -> SchemaRegistry {
		let properties: Vec<String> = sources.iter().map(|s| format!(r##""{s}": {{ "$ref": "#/definitions/X" }}"##)).collect();
		SchemaRegistry::from_json_str(&format!(r#"{{ "properties": {{ {} }} }}"#, properties.join(", "))).unwrap()
	}

	#[test]
	fn reports_declared_but_absent() {
		let warnings = check(&registry(&["A", "B", "C"]), ["A", "B"]);
		assert_eq!(warnings, vec![ConsistencyWarning::DeclaredButAbsent { source_name: "C".into() }]);
	}

	#[test]
	fn reports_files_without_schema() {
		let warnings = check(&registry(&["A"]), ["A", "extra"]);
		assert_eq!(warnings, vec![ConsistencyWarning::MissingSchema { source_name: "extra".into() }]);
	}

	#[test]
	fn orders_absent_before_unregistered() {
		let warnings = check(&registry(&["b", "a"]), ["z", "y"]);
		let rendered: Vec<String> = warnings.iter().map(ToString::to_string).collect();
		assert_eq!(rendered, [
			"schema definition exists for \"b\" but no corresponding mapping file was found",
			"schema definition exists for \"a\" but no corresponding mapping file was found",
			"no schema definition found for \"z\", skipping schema validation",
			"no schema definition found for \"y\", skipping schema validation",
		]);
	}

	#[test]
	fn no_drift_no_warnings() {
		assert!(check(&registry(&["A", "B"]), ["B", "A"]).is_empty());
		assert!(check(&registry(&[]), std::iter::empty()).is_empty());
	}
}
