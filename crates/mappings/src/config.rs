//! Project configuration.
//!
//! Everything has a default matching the conventional repository layout, so
//! `featmap.toml` is optional. Relative paths are resolved against the
//! project root.

use std::path::{Path, PathBuf};

use serde::Deserialize;
use tracing::debug;

use crate::source::{DEFAULT_PATTERN, DiscoveryOptions};
use crate::{Error, Result};

/// Conventional configuration file name at the project root.
pub const CONFIG_FILE: &str = "featmap.toml";

/// Paths and switches for a run.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
	/// Schema registry (`schemas.json`).
	pub registry: PathBuf,
	/// Directory holding one JSON file per source.
	pub mappings_dir: PathBuf,
	/// File name glob selecting mapping files.
	pub pattern: String,
	/// External feature identifier registry.
	pub features: PathBuf,
	/// Output path of the composed schema.
	pub combined_schema: PathBuf,
	/// Output path of the combined document.
	pub combined_document: PathBuf,
	/// Additional files never treated as sources.
	pub exclude: Vec<PathBuf>,
	/// Parse mapping files on worker threads.
	pub parallel: bool,
}

impl Default for Config {
	fn default() -> Self {
		Self {
			registry: PathBuf::from("schemas.json"),
			mappings_dir: PathBuf::from("mappings"),
			pattern: DEFAULT_PATTERN.to_string(),
			features: PathBuf::from("node_modules/web-features/data.json"),
			combined_schema: PathBuf::from("combined-schema.gen.json"),
			combined_document: PathBuf::from("web-features-mappings.combined.json"),
			exclude: Vec::new(),
			parallel: true,
		}
	}
}

impl Config {
	/// Parses TOML configuration text; `path` is only used in errors.
	pub fn parse(content: &str, path: &Path) -> Result<Self> {
		toml::from_str(content).map_err(|e| Error::Config {
			path: path.to_path_buf(),
			reason: e.to_string(),
		})
	}

	/// Loads configuration for `root`.
	///
	/// An `explicit` path must exist. Otherwise `root/featmap.toml` is used
	/// when present, falling back to defaults.
	pub fn load(root: &Path, explicit: Option<&Path>) -> Result<Self> {
		let path = match explicit {
			Some(path) => path.to_path_buf(),
			None => {
				let conventional = root.join(CONFIG_FILE);
				if !conventional.is_file() {
					debug!(root = %root.display(), "no config file, using defaults");
					return Ok(Self::default());
				}
				conventional
			}
		};
		let content = std::fs::read_to_string(&path).map_err(|e| Error::io(&path, e))?;
		let config = Self::parse(&content, &path)?;
		debug!(path = %path.display(), "loaded config");
		Ok(config)
	}

	/// Returns a copy with every relative path joined onto `root`.
	pub fn resolved(&self, root: &Path) -> Self {
		let join = |p: &PathBuf| if p.is_absolute() { p.clone() } else { root.join(p) };
		Self {
			registry: join(&self.registry),
			mappings_dir: join(&self.mappings_dir),
			pattern: self.pattern.clone(),
			features: join(&self.features),
			combined_schema: join(&self.combined_schema),
			combined_document: join(&self.combined_document),
			exclude: self.exclude.iter().map(join).collect(),
			parallel: self.parallel,
		}
	}

	/// Discovery options, always excluding the combined document itself.
	pub fn discovery(&self) -> DiscoveryOptions {
		let mut exclude = self.exclude.clone();
		exclude.push(self.combined_document.clone());
		DiscoveryOptions {
			dir: self.mappings_dir.clone(),
			pattern: self.pattern.clone(),
			exclude,
			parallel: self.parallel,
		}
	}
}
