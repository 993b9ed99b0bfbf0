//! Source mapping discovery and parsing.
//!
//! Each mapping file is one JSON object keyed by feature identifier. The
//! file stem is the source name. Discovery sorts candidates by path so runs
//! are reproducible, but nothing downstream relies on that for output order.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use globset::{Glob, GlobMatcher};
use serde_json::{Map, Value};
use tracing::debug;

use crate::{Error, Result};

/// Default file name pattern for mapping files.
pub const DEFAULT_PATTERN: &str = "*.json";

/// One parsed mapping file.
#[derive(Debug, Clone, PartialEq)]
pub struct SourceMapping {
	name: String,
	path: PathBuf,
	entries: Map<String, Value>,
}

impl SourceMapping {
	/// Builds a mapping from already parsed entries.
	pub fn new(name: impl Into<String>, path: impl Into<PathBuf>, entries: Map<String, Value>) -> Self {
		Self {
			name: name.into(),
			path: path.into(),
			entries,
		}
	}

	/// Source name derived from the file stem.
	pub fn name(&self) -> &str {
		&self.name
	}

	/// File the mapping was read from.
	pub fn path(&self) -> &Path {
		&self.path
	}

	/// Feature identifier to payload, in file order.
	pub fn entries(&self) -> &Map<String, Value> {
		&self.entries
	}

	/// Feature identifiers in file order.
	pub fn feature_ids(&self) -> impl Iterator<Item = &str> {
		self.entries.keys().map(String::as_str)
	}

	/// The mapping as a JSON value, for schema validation.
	pub fn to_value(&self) -> Value {
		Value::Object(self.entries.clone())
	}
}

/// A discovered, not yet parsed, mapping file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Candidate {
	/// Source name derived from the file stem.
	pub name: String,
	/// Path to the file.
	pub path: PathBuf,
}

/// Where and how to look for mapping files.
#[derive(Debug, Clone)]
pub struct DiscoveryOptions {
	/// Directory scanned (non-recursively).
	pub dir: PathBuf,
	/// Glob matched against file names.
	pub pattern: String,
	/// Files never treated as sources, such as the combined document itself.
	pub exclude: Vec<PathBuf>,
	/// Parse files on scoped worker threads.
	pub parallel: bool,
}

impl DiscoveryOptions {
	/// Options for `dir` with the default pattern and no exclusions.
	pub fn new(dir: impl Into<PathBuf>) -> Self {
		Self {
			dir: dir.into(),
			pattern: DEFAULT_PATTERN.to_string(),
			exclude: Vec::new(),
			parallel: true,
		}
	}

	/// Adds a path to the exclusion list.
	pub fn exclude(mut self, path: impl Into<PathBuf>) -> Self {
		self.exclude.push(path.into());
		self
	}

	fn matcher(&self) -> Result<GlobMatcher> {
		Glob::new(&self.pattern)
			.map(|glob| glob.compile_matcher())
			.map_err(|e| Error::InvalidPattern {
				pattern: self.pattern.clone(),
				reason: e.to_string(),
			})
	}
}

/// Parsed sources plus the files that failed to parse.
#[derive(Debug, Default)]
pub struct SourceSet {
	/// Every discovered source name, parsed or not, in discovery order.
	pub discovered: Vec<String>,
	/// Successfully parsed mappings, in discovery order.
	pub mappings: Vec<SourceMapping>,
	/// One [`Error::SourceParse`] or [`Error::Io`] per failed file.
	pub failures: Vec<Error>,
}

/// Lists candidate mapping files under `opts.dir`, sorted by path.
///
/// Fails if two files derive the same source name.
pub fn discover(opts: &DiscoveryOptions) -> Result<Vec<Candidate>> {
	let matcher = opts.matcher()?;
	let excluded: Vec<PathBuf> = opts.exclude.iter().map(|p| normalize(p)).collect();

	let read_dir = std::fs::read_dir(&opts.dir).map_err(|e| Error::io(&opts.dir, e))?;
	let mut paths = Vec::new();
	for entry in read_dir {
		let entry = entry.map_err(|e| Error::io(&opts.dir, e))?;
		let path = entry.path();
		if !path.is_file() || !matcher.is_match(entry.file_name()) {
			continue;
		}
		if excluded.contains(&normalize(&path)) {
			debug!(path = %path.display(), "excluded from discovery");
			continue;
		}
		paths.push(path);
	}
	paths.sort();

	let mut seen: HashMap<String, PathBuf> = HashMap::new();
	let mut candidates = Vec::with_capacity(paths.len());
	for path in paths {
		let Some(name) = path.file_stem().and_then(|s| s.to_str()).map(str::to_string) else {
			return Err(Error::SourceParse {
				path,
				reason: "file name is not valid UTF-8, cannot derive a source name".to_string(),
			});
		};
		if let Some(first) = seen.get(&name) {
			return Err(Error::DuplicateSource {
				source_name: name,
				first: first.clone(),
				second: path,
			});
		}
		seen.insert(name.clone(), path.clone());
		candidates.push(Candidate { name, path });
	}

	debug!(dir = %opts.dir.display(), count = candidates.len(), "discovered mapping files");
	Ok(candidates)
}

/// Reads and parses one candidate.
pub fn parse_candidate(candidate: &Candidate) -> Result<SourceMapping> {
	let content = std::fs::read_to_string(&candidate.path).map_err(|e| Error::io(&candidate.path, e))?;
	let entries = parse_mapping(&content).map_err(|reason| Error::SourceParse {
		path: candidate.path.clone(),
		reason,
	})?;
	debug!(source = %candidate.name, features = entries.len(), "parsed mapping file");
	Ok(SourceMapping::new(candidate.name.clone(), candidate.path.clone(), entries))
}

/// Parses mapping file contents, requiring a top-level object.
pub fn parse_mapping(content: &str) -> std::result::Result<Map<String, Value>, String> {
	match serde_json::from_str::<Value>(content) {
		Ok(Value::Object(entries)) => Ok(entries),
		Ok(other) => Err(format!("top-level value must be an object, found {}", json_kind(&other))),
		Err(e) => Err(e.to_string()),
	}
}

/// Discovers and parses every mapping file, failing on the first bad file.
pub fn load_sources(opts: &DiscoveryOptions) -> Result<Vec<SourceMapping>> {
	let candidates = discover(opts)?;
	parse_all(&candidates, opts.parallel).into_iter().collect()
}

/// Discovers and parses every mapping file, collecting parse failures.
///
/// Discovery errors (unreadable directory, duplicate names) are still fatal.
pub fn load_sources_lenient(opts: &DiscoveryOptions) -> Result<SourceSet> {
	let candidates = discover(opts)?;
	let mut set = SourceSet {
		discovered: candidates.iter().map(|c| c.name.clone()).collect(),
		..SourceSet::default()
	};
	for result in parse_all(&candidates, opts.parallel) {
		match result {
			Ok(mapping) => set.mappings.push(mapping),
			Err(err) => set.failures.push(err),
		}
	}
	Ok(set)
}

/// Parses `candidates`, preserving their order in the output.
pub fn parse_all(candidates: &[Candidate], parallel: bool) -> Vec<Result<SourceMapping>> {
	let threads = if parallel {
		std::thread::available_parallelism().map_or(1, usize::from).min(candidates.len())
	} else {
		1
	};
	if threads <= 1 {
		return candidates.iter().map(parse_candidate).collect();
	}

	let per_thread = candidates.len().div_ceil(threads);
	let mut results = Vec::with_capacity(candidates.len());
	std::thread::scope(|s| {
		let tasks: Vec<_> = candidates
			.chunks(per_thread)
			.map(|chunk| s.spawn(move || chunk.iter().map(parse_candidate).collect::<Vec<_>>()))
			.collect();
		for (task, chunk) in tasks.into_iter().zip(candidates.chunks(per_thread)) {
			match task.join() {
				Ok(parsed) => results.extend(parsed),
				Err(_) => results.extend(chunk.iter().map(|c| {
					Err(Error::SourceParse {
						path: c.path.clone(),
						reason: "parser thread panicked".to_string(),
					})
				})),
			}
		}
	});
	results
}

fn normalize(path: &Path) -> PathBuf {
	std::fs::canonicalize(path).unwrap_or_else(|_| path.to_path_buf())
}

fn json_kind(value: &Value) -> &'static str {
	match value {
		Value::Null => "null",
		Value::Bool(_) => "boolean",
		Value::Number(_) => "number",
		Value::String(_) => "string",
		Value::Array(_) => "array",
		Value::Object(_) => "object",
	}
}
