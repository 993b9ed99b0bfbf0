//! External feature identifier registry.
//!
//! Only presence matters here. Descriptors are dropped after loading.

use std::collections::HashSet;
use std::path::Path;

use serde_json::Value;
use tracing::debug;

use crate::{Error, Result};

/// Set of known feature identifiers.
#[derive(Debug, Clone, Default)]
pub struct FeatureIndex {
	ids: HashSet<String>,
}

impl FeatureIndex {
	/// Loads identifiers from a JSON file.
	///
	/// Accepts a `web-features` style `data.json` (identifiers are the keys of
	/// the top-level `features` object) or a bare object keyed by identifier.
	pub fn load(path: &Path) -> Result<Self> {
		let fail = |reason: String| Error::FeatureRegistry {
			path: path.to_path_buf(),
			reason,
		};
		let content = std::fs::read_to_string(path).map_err(|e| fail(e.to_string()))?;
		let value: Value = serde_json::from_str(&content).map_err(|e| fail(e.to_string()))?;
		let index = Self::from_document(&value).ok_or_else(|| fail("expected a JSON object keyed by feature identifier".to_string()))?;
		debug!(path = %path.display(), features = index.len(), "loaded feature registry");
		Ok(index)
	}

	/// Extracts identifiers from a parsed registry document.
	pub fn from_document(value: &Value) -> Option<Self> {
		let root = value.as_object()?;
		let features = match root.get("features") {
			Some(Value::Object(features)) => features,
			_ => root,
		};
		Some(features.keys().cloned().collect())
	}

	/// Returns `true` if `id` is a known feature.
	pub fn contains(&self, id: &str) -> bool {
		self.ids.contains(id)
	}

	/// Number of known features.
	pub fn len(&self) -> usize {
		self.ids.len()
	}

	/// Returns `true` if no features are known.
	pub fn is_empty(&self) -> bool {
		self.ids.is_empty()
	}
}

impl<S: Into<String>> FromIterator<S> for FeatureIndex {
	fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
		Self {
			ids: iter.into_iter().map(Into::into).collect(),
		}
	}
}

#[cfg(test)]
mod tests {
	use serde_json::json;

	use super::*;

	#[test]
	fn reads_web_features_layout() {
		let doc = json!({
			"browsers": {},
			"features": { "grid": { "name": "Grid" }, "subgrid": { "kind": "moved" } },
			"groups": { "css": {} }
		});
		let index = FeatureIndex::from_document(&doc).unwrap();
		assert_eq!(index.len(), 2);
		assert!(index.contains("grid"));
		assert!(index.contains("subgrid"));
		assert!(!index.contains("css"));
	}

	#[test]
	fn reads_bare_mapping() {
		let index = FeatureIndex::from_document(&json!({ "grid": {}, "has": {} })).unwrap();
		assert!(index.contains("has"));
		assert!(!index.contains("Grid"));
	}

	#[test]
	fn rejects_non_object() {
		assert!(FeatureIndex::from_document(&json!(["grid"])).is_none());
	}
}
