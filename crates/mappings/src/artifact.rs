//! Generated artifact rendering and persistence.
//!
//! Artifacts are pretty-printed with a two space indent and a trailing
//! newline. Writes go through a temporary file in the destination directory
//! and a rename, so readers never observe a half-written artifact.

use std::io::Write;
use std::path::{Path, PathBuf};

use serde::Serialize;
use tempfile::NamedTempFile;
use tracing::{debug, info};

use crate::{Error, Result};

/// A rendered artifact bound to its destination.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Artifact {
	path: PathBuf,
	contents: String,
}

/// How an on-disk artifact compares to a freshly rendered one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Freshness {
	/// Bytes match.
	UpToDate,
	/// File exists with different contents.
	Stale,
	/// File does not exist.
	Missing,
}

/// Result of [`Artifact::write`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteOutcome {
	/// New contents were written.
	Written,
	/// The file already held identical bytes and was left untouched.
	Unchanged,
}

impl Artifact {
	/// Renders `value` for `path`.
	pub fn render<T: Serialize + ?Sized>(path: impl Into<PathBuf>, value: &T) -> Result<Self> {
		let path = path.into();
		let mut contents = serde_json::to_string_pretty(value).map_err(|e| Error::io(&path, std::io::Error::other(e)))?;
		contents.push('\n');
		Ok(Self { path, contents })
	}

	/// Destination path.
	pub fn path(&self) -> &Path {
		&self.path
	}

	/// Rendered bytes.
	pub fn contents(&self) -> &str {
		&self.contents
	}

	/// Compares the rendered contents with what is on disk.
	pub fn freshness(&self) -> Result<Freshness> {
		match std::fs::read(&self.path) {
			Ok(existing) if existing == self.contents.as_bytes() => Ok(Freshness::UpToDate),
			Ok(_) => Ok(Freshness::Stale),
			Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(Freshness::Missing),
			Err(e) => Err(Error::io(&self.path, e)),
		}
	}

	/// Atomically replaces the destination unless it is already up to date.
	pub fn write(&self) -> Result<WriteOutcome> {
		match self.stage()? {
			Some(staged) => staged.commit(),
			None => Ok(WriteOutcome::Unchanged),
		}
	}

	/// Writes the contents to a synced temporary file next to the destination.
	///
	/// Returns `None` when the destination already holds these bytes. Nothing
	/// is visible at the destination until [`Staged::commit`].
	pub fn stage(&self) -> Result<Option<Staged>> {
		if self.freshness()? == Freshness::UpToDate {
			debug!(path = %self.path.display(), "artifact unchanged");
			return Ok(None);
		}

		let dir = match self.path.parent() {
			Some(parent) if !parent.as_os_str().is_empty() => parent,
			_ => Path::new("."),
		};
		let mut tmp = NamedTempFile::new_in(dir).map_err(|e| Error::io(dir, e))?;
		tmp.write_all(self.contents.as_bytes()).map_err(|e| Error::io(tmp.path(), e))?;
		tmp.as_file().sync_all().map_err(|e| Error::io(tmp.path(), e))?;
		Ok(Some(Staged {
			tmp,
			path: self.path.clone(),
			bytes: self.contents.len(),
		}))
	}
}

/// A fully written temporary file waiting to replace its destination.
///
/// Dropping it without committing removes the temporary file.
#[derive(Debug)]
pub struct Staged {
	tmp: NamedTempFile,
	path: PathBuf,
	bytes: usize,
}

impl Staged {
	/// Destination path.
	pub fn path(&self) -> &Path {
		&self.path
	}

	/// Renames the temporary file over the destination.
	pub fn commit(self) -> Result<WriteOutcome> {
		self.tmp.persist(&self.path).map_err(|e| Error::io(&self.path, e.error))?;
		info!(path = %self.path.display(), bytes = self.bytes, "wrote artifact");
		Ok(WriteOutcome::Written)
	}
}
