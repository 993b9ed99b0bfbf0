//! Folding source mappings into the combined document.

use indexmap::IndexMap;
use serde::Serialize;
use serde_json::{Map, Value};

use crate::source::SourceMapping;

/// Per-feature bucket: source name to payload, in source fold order.
pub type Bucket = IndexMap<String, Value>;

/// Feature identifier to bucket, sorted by identifier.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct CombinedDocument {
	features: IndexMap<String, Bucket>,
}

impl CombinedDocument {
	/// Bucket for `feature_id`.
	pub fn get(&self, feature_id: &str) -> Option<&Bucket> {
		self.features.get(feature_id)
	}

	/// Feature identifiers in output order.
	pub fn feature_ids(&self) -> impl Iterator<Item = &str> {
		self.features.keys().map(String::as_str)
	}

	/// Iterates `(feature_id, bucket)` pairs in output order.
	pub fn iter(&self) -> impl Iterator<Item = (&str, &Bucket)> {
		self.features.iter().map(|(id, bucket)| (id.as_str(), bucket))
	}

	/// Number of features.
	pub fn len(&self) -> usize {
		self.features.len()
	}

	/// Returns `true` if no source contributed any feature.
	pub fn is_empty(&self) -> bool {
		self.features.is_empty()
	}

	/// The document as a JSON value, preserving order.
	pub fn to_value(&self) -> Value {
		let features: Map<String, Value> = self
			.features
			.iter()
			.map(|(id, bucket)| {
				let bucket: Map<String, Value> = bucket.iter().map(|(source, payload)| (source.clone(), payload.clone())).collect();
				(id.clone(), Value::Object(bucket))
			})
			.collect();
		Value::Object(features)
	}
}

/// Merges `sources` into one document keyed by feature identifier.
///
/// Sources are folded in iteration order, and each bucket lists sources in
/// that same order. A repeated source name overwrites the earlier payload in
/// place. Feature identifiers are sorted byte-wise once folding is done, so
/// the result does not depend on the order files were discovered in.
pub fn merge<'a>(sources: impl IntoIterator<Item = &'a SourceMapping>) -> CombinedDocument {
	let mut features: IndexMap<String, Bucket> = IndexMap::new();
	for source in sources {
		for (feature_id, payload) in source.entries() {
			features
				.entry(feature_id.clone())
				.or_default()
				.insert(source.name().to_string(), payload.clone());
		}
	}
	features.sort_unstable_keys();
	CombinedDocument { features }
}
