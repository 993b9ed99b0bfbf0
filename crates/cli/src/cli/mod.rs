//! CLI schema and parsing helpers for the featmap binary.

use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};
use featmap_mappings::{Config, Persist};

#[derive(Parser, Debug)]
#[command(name = "featmap")]
#[command(about = "Compose, merge and lint web feature mapping files")]
#[command(version)]
/// Command-line arguments.
pub struct Cli {
	/// Project root; relative config paths resolve against it
	#[arg(long, value_name = "DIR", default_value = ".", global = true)]
	pub root: PathBuf,

	/// Config file (defaults to featmap.toml in the project root, if present)
	#[arg(long, value_name = "FILE", global = true)]
	pub config: Option<PathBuf>,

	/// Schema registry, overriding the config file
	#[arg(long, value_name = "FILE", global = true)]
	pub registry: Option<PathBuf>,

	/// Directory of mapping files, overriding the config file
	#[arg(long, value_name = "DIR", global = true)]
	pub mappings_dir: Option<PathBuf>,

	/// Feature identifier registry (web-features data.json), overriding the config file
	#[arg(long, value_name = "FILE", global = true)]
	pub features: Option<PathBuf>,

	/// Keep parsing after a malformed mapping file and report every failure
	#[arg(long, global = true)]
	pub keep_going: bool,

	/// Verbose logging
	#[arg(short, long, global = true)]
	pub verbose: bool,

	/// Subcommand to execute.
	#[command(subcommand)]
	pub command: Command,
}

/// Available subcommands.
#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Command {
	/// Validate every mapping file against its schema and the feature registry
	Lint,
	/// Generate the combined schema from the schema registry
	Schema {
		/// Fail if the artifact on disk is out of date instead of writing it
		#[arg(long)]
		check: bool,
	},
	/// Merge all mapping files into the combined document
	Combine {
		/// Fail if the artifact on disk is out of date instead of writing it
		#[arg(long)]
		check: bool,
	},
	/// Lint, generate the schema and combine; writes nothing unless everything is valid
	Build {
		/// Fail if any artifact on disk is out of date instead of writing it
		#[arg(long)]
		check: bool,
	},
	/// Validate an existing combined document
	Validate {
		/// Combined document to validate
		file: PathBuf,
	},
}

impl Command {
	/// Persistence mode requested by the subcommand.
	pub fn persist(&self) -> Persist {
		match self {
			Self::Schema { check: true } | Self::Combine { check: true } | Self::Build { check: true } => Persist::Check,
			_ => Persist::Write,
		}
	}
}

impl Cli {
	/// Loads the project config and applies command-line overrides.
	///
	/// Returned paths are resolved against `--root`.
	pub fn load_config(&self) -> featmap_mappings::Result<Config> {
		let mut config = Config::load(&self.root, self.config.as_deref())?;
		self.apply_overrides(&mut config);
		Ok(config.resolved(&self.root))
	}

	fn apply_overrides(&self, config: &mut Config) {
		let cwd_relative = |p: &Path| {
			if p.is_absolute() {
				return p.to_path_buf();
			}
			std::env::current_dir().map(|cwd| cwd.join(p)).unwrap_or_else(|_| p.to_path_buf())
		};
		if let Some(registry) = &self.registry {
			config.registry = cwd_relative(registry);
		}
		if let Some(dir) = &self.mappings_dir {
			config.mappings_dir = cwd_relative(dir);
		}
		if let Some(features) = &self.features {
			config.features = cwd_relative(features);
		}
	}
}

#[cfg(test)]
mod tests;
