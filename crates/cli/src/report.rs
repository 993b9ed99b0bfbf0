//! Human-readable rendering of run reports.

use std::io::{self, Write};

use featmap_mappings::{ArtifactStatus, RunReport};

/// Writes warnings, failures, violations, artifact outcomes and a summary line.
pub fn render(report: &RunReport, out: &mut impl Write) -> io::Result<()> {
	for warning in &report.warnings {
		writeln!(out, "warning: {warning}")?;
	}
	for failure in &report.parse_failures {
		writeln!(out, "error: {failure}")?;
	}
	for violation in report.violations() {
		writeln!(out, "error: {violation}")?;
	}
	for (path, status) in &report.artifacts {
		let path = path.display();
		match status {
			ArtifactStatus::Written => writeln!(out, "wrote {path}")?,
			ArtifactStatus::Unchanged => writeln!(out, "{path} unchanged")?,
			ArtifactStatus::UpToDate => writeln!(out, "{path} is up to date")?,
			ArtifactStatus::Stale => writeln!(out, "error: {path} is out of date, rerun without --check")?,
			ArtifactStatus::Missing => writeln!(out, "error: {path} does not exist, rerun without --check")?,
			ArtifactStatus::Withheld => writeln!(out, "{path} not written")?,
		}
	}

	let errors = report.parse_failures.len() + report.violations().count();
	if errors == 0 {
		if report.is_success() {
			writeln!(out, "All checks passed.")?;
		}
	} else {
		writeln!(out, "Failed with {errors} error{}.", if errors == 1 { "" } else { "s" })?;
	}
	Ok(())
}

#[cfg(test)]
mod tests {
	use std::path::PathBuf;

	use featmap_mappings::{ConsistencyWarning, SourceReport, Violation};

	use super::*;

	fn rendered(report: &RunReport) -> String {
		let mut out = Vec::new();
		render(report, &mut out).unwrap();
		String::from_utf8(out).unwrap()
	}

	#[test]
	fn clean_run() {
		let report = RunReport {
			artifacts: vec![(PathBuf::from("combined.json"), ArtifactStatus::Written)],
			..RunReport::default()
		};
		assert_eq!(rendered(&report), "wrote combined.json\nAll checks passed.\n");
	}

	#[test]
	fn failing_run_lists_everything() {
		let report = RunReport {
			warnings: vec![ConsistencyWarning::DeclaredButAbsent { source_name: "C".into() }],
			sources: vec![SourceReport {
				source_name: "A".into(),
				schema_checked: true,
				violations: vec![
					Violation::Schema {
						document: "A".into(),
						path: "/feat-1/x".into(),
						message: "\"one\" is not of type \"integer\"".into(),
					},
					Violation::UnknownIdentifier {
						document: "A".into(),
						feature: "ghost".into(),
					},
				],
			}],
			artifacts: vec![(PathBuf::from("combined.json"), ArtifactStatus::Withheld)],
			..RunReport::default()
		};
		assert_eq!(
			rendered(&report),
			"warning: schema definition exists for \"C\" but no corresponding mapping file was found\n\
			 error: A: /feat-1/x: \"one\" is not of type \"integer\"\n\
			 error: A: feature ID \"ghost\" does not exist in web-features\n\
			 combined.json not written\n\
			 Failed with 2 errors.\n"
		);
	}

	#[test]
	fn stale_check_has_no_success_line() {
		let report = RunReport {
			artifacts: vec![(PathBuf::from("schema.json"), ArtifactStatus::Stale)],
			..RunReport::default()
		};
		assert_eq!(rendered(&report), "error: schema.json is out of date, rerun without --check\n");
	}
}
