//! Run-level orchestration.
//!
//! Structural failures (unreadable registry, bad composition, malformed
//! mapping files without `keep_going`) abort with an [`Error`]. Data
//! failures are accumulated into a [`RunReport`] and block persistence; the
//! caller decides how to surface them.

use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use serde_json::Value;
use tracing::{debug, info};

use crate::artifact::{Artifact, Freshness, WriteOutcome};
use crate::compose::compose;
use crate::config::Config;
use crate::features::FeatureIndex;
use crate::merge::merge;
use crate::registry::SchemaRegistry;
use crate::source::{SourceMapping, SourceSet, load_sources, load_sources_lenient};
use crate::validate::{COMBINED_DOCUMENT, SchemaValidator, SourceReport, Validator};
use crate::{ConsistencyWarning, Error, Result, Violation, consistency};

/// What to do with generated artifacts once a run is clean.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Persist {
	/// Replace artifacts on disk.
	#[default]
	Write,
	/// Compare against artifacts on disk without writing.
	Check,
}

/// Per-artifact result of the persistence step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArtifactStatus {
	/// New contents written.
	Written,
	/// Contents already matched; file untouched.
	Unchanged,
	/// Check mode: on-disk bytes match.
	UpToDate,
	/// Check mode: on-disk bytes differ.
	Stale,
	/// Check mode: artifact does not exist.
	Missing,
	/// Not persisted because the run found problems.
	Withheld,
}

impl ArtifactStatus {
	/// Returns `true` for statuses that fail a run.
	pub fn is_failure(self) -> bool {
		matches!(self, Self::Stale | Self::Missing | Self::Withheld)
	}
}

/// Everything a run found, in the order it was found.
#[derive(Debug, Default)]
pub struct RunReport {
	/// Registry/file drift.
	pub warnings: Vec<ConsistencyWarning>,
	/// Mapping files that could not be parsed (only with `keep_going`).
	pub parse_failures: Vec<Error>,
	/// Per-source validation outcomes.
	pub sources: Vec<SourceReport>,
	/// Violations found in the combined document.
	pub combined: Vec<Violation>,
	/// Artifacts considered for persistence.
	pub artifacts: Vec<(PathBuf, ArtifactStatus)>,
}

impl RunReport {
	/// Every violation, per-source first.
	pub fn violations(&self) -> impl Iterator<Item = &Violation> {
		self.sources.iter().flat_map(|s| s.violations.iter()).chain(self.combined.iter())
	}

	/// Returns `true` if no violations or parse failures were found.
	pub fn is_valid(&self) -> bool {
		self.parse_failures.is_empty() && self.violations().next().is_none()
	}

	/// Returns `true` if the run is valid and every artifact is in its expected state.
	pub fn is_success(&self) -> bool {
		self.is_valid() && !self.artifacts.iter().any(|(_, status)| status.is_failure())
	}

	/// Converts a failed report into [`Error::Validation`], dropping parse failures.
	pub fn into_validation_error(self) -> Option<Error> {
		let violations: Vec<Violation> = self.violations().cloned().collect();
		(!violations.is_empty()).then_some(Error::Validation { violations })
	}

	fn persist(&mut self, artifacts: &[Artifact], persist: Persist) -> Result<()> {
		if !self.is_valid() {
			for artifact in artifacts {
				info!(path = %artifact.path().display(), "not persisting artifact, run has errors");
				self.artifacts.push((artifact.path().to_path_buf(), ArtifactStatus::Withheld));
			}
			return Ok(());
		}
		match persist {
			Persist::Write => {
				// Nothing is committed until every artifact is staged.
				let staged = artifacts.iter().map(Artifact::stage).collect::<Result<Vec<_>>>()?;
				for (artifact, staged) in artifacts.iter().zip(staged) {
					let status = match staged {
						Some(staged) => match staged.commit()? {
							WriteOutcome::Written => ArtifactStatus::Written,
							WriteOutcome::Unchanged => ArtifactStatus::Unchanged,
						},
						None => ArtifactStatus::Unchanged,
					};
					self.artifacts.push((artifact.path().to_path_buf(), status));
				}
			}
			Persist::Check => {
				for artifact in artifacts {
					let status = match artifact.freshness()? {
						Freshness::UpToDate => ArtifactStatus::UpToDate,
						Freshness::Stale => ArtifactStatus::Stale,
						Freshness::Missing => ArtifactStatus::Missing,
					};
					self.artifacts.push((artifact.path().to_path_buf(), status));
				}
			}
		}
		Ok(())
	}
}

/// Loaded inputs shared by every stage of a run.
#[derive(Debug)]
pub struct Workspace {
	config: Config,
	registry: SchemaRegistry,
	features: OnceLock<FeatureIndex>,
}

impl Workspace {
	/// Loads the registry named by `config`.
	///
	/// `config` paths should already be resolved against the project root.
	/// The feature index is read on first use, so schema composition works
	/// without it.
	pub fn open(config: Config) -> Result<Self> {
		let registry = SchemaRegistry::load(&config.registry)?;
		info!(registry = %registry.path().display(), sources = registry.properties().len(), "opened workspace");
		Ok(Self {
			config,
			registry,
			features: OnceLock::new(),
		})
	}

	/// Assembles a workspace from already loaded inputs.
	pub fn from_parts(config: Config, registry: SchemaRegistry, features: FeatureIndex) -> Self {
		Self {
			config,
			registry,
			features: OnceLock::from(features),
		}
	}

	/// Resolved configuration.
	pub fn config(&self) -> &Config {
		&self.config
	}

	/// Loaded schema registry.
	pub fn registry(&self) -> &SchemaRegistry {
		&self.registry
	}

	/// Feature index, loaded from `config.features` on first call.
	pub fn features(&self) -> Result<&FeatureIndex> {
		if let Some(features) = self.features.get() {
			return Ok(features);
		}
		let loaded = FeatureIndex::load(&self.config.features)?;
		info!(path = %self.config.features.display(), features = loaded.len(), "loaded feature index");
		Ok(self.features.get_or_init(|| loaded))
	}

	fn validator(&self) -> Result<Validator<'_>> {
		Ok(Validator::new(&self.registry, self.features()?))
	}

	fn schema_artifact(&self) -> Result<(Value, Artifact)> {
		let schema = compose(&self.registry)?;
		let artifact = Artifact::render(&self.config.combined_schema, &schema)?;
		Ok((schema, artifact))
	}

	fn load(&self, keep_going: bool, report: &mut RunReport) -> Result<Vec<SourceMapping>> {
		let discovery = self.config.discovery();
		let set = if keep_going {
			load_sources_lenient(&discovery)?
		} else {
			let mappings = load_sources(&discovery)?;
			SourceSet {
				discovered: mappings.iter().map(|m| m.name().to_string()).collect(),
				mappings,
				failures: Vec::new(),
			}
		};
		info!(sources = set.mappings.len(), failures = set.failures.len(), "loaded mapping files");

		let discovered = set.discovered.iter().map(String::as_str);
		report.warnings = consistency::check(&self.registry, discovered);
		for warning in &report.warnings {
			debug!("{warning}");
		}
		report.parse_failures = set.failures;
		Ok(set.mappings)
	}

	fn lint_sources(&self, sources: &[SourceMapping], report: &mut RunReport) -> Result<()> {
		let validator = self.validator()?;
		for source in sources {
			let checked = validator.check_source(source)?;
			if checked.is_valid() {
				info!(source = %checked.source_name, path = %source.path().display(), "valid");
			} else {
				info!(source = %checked.source_name, errors = checked.violations.len(), "invalid");
			}
			report.sources.push(checked);
		}
		Ok(())
	}

	fn check_combined(&self, schema: &Value, sources: &[SourceMapping], with_identifiers: bool, report: &mut RunReport) -> Result<Artifact> {
		let document = merge(sources);
		info!(features = document.len(), "merged mapping files");
		let value = document.to_value();

		report.combined = if with_identifiers {
			self.validator()?.check_combined(schema, &value)?
		} else {
			SchemaValidator::new("combined schema", schema)?.violations(COMBINED_DOCUMENT, &value)
		};
		Artifact::render(&self.config.combined_document, &document)
	}

	/// Validates every mapping file against its registry schema and the feature index.
	pub fn lint(&self, keep_going: bool) -> Result<RunReport> {
		let mut report = RunReport::default();
		let sources = self.load(keep_going, &mut report)?;
		self.lint_sources(&sources, &mut report)?;
		Ok(report)
	}

	/// Composes the combined schema and persists it.
	pub fn schema(&self, persist: Persist) -> Result<RunReport> {
		let mut report = RunReport::default();
		let (_, artifact) = self.schema_artifact()?;
		report.persist(&[artifact], persist)?;
		Ok(report)
	}

	/// Merges every mapping file, validates the result and persists it if clean.
	pub fn combine(&self, keep_going: bool, persist: Persist) -> Result<RunReport> {
		let mut report = RunReport::default();
		let (schema, _) = self.schema_artifact()?;
		let sources = self.load(keep_going, &mut report)?;
		let artifact = self.check_combined(&schema, &sources, true, &mut report)?;
		report.persist(&[artifact], persist)?;
		Ok(report)
	}

	/// Lints, composes and combines; persists both artifacts only if all checks pass.
	pub fn build(&self, keep_going: bool, persist: Persist) -> Result<RunReport> {
		let mut report = RunReport::default();
		let (schema, schema_artifact) = self.schema_artifact()?;
		let sources = self.load(keep_going, &mut report)?;
		self.lint_sources(&sources, &mut report)?;
		// Identifiers were already checked per source.
		let document_artifact = self.check_combined(&schema, &sources, false, &mut report)?;
		report.persist(&[schema_artifact, document_artifact], persist)?;
		Ok(report)
	}

	/// Validates an existing combined document at `path`.
	pub fn validate_document(&self, path: &Path) -> Result<RunReport> {
		let content = std::fs::read_to_string(path).map_err(|e| Error::io(path, e))?;
		let document: Value = serde_json::from_str(&content).map_err(|e| Error::SourceParse {
			path: path.to_path_buf(),
			reason: e.to_string(),
		})?;
		let (schema, _) = self.schema_artifact()?;
		let mut report = RunReport::default();
		report.combined = self.validator()?.check_combined(&schema, &document)?;
		Ok(report)
	}
}
