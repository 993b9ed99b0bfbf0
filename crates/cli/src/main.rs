//! featmap binary.
//!
//! Composes the combined schema, merges mapping files into the combined
//! document and lints both. Exits non-zero when anything fails, without
//! touching artifacts on disk.

mod cli;
mod report;

use std::process::ExitCode;

use clap::Parser;
use cli::{Cli, Command};
use featmap_mappings::Workspace;
use tracing::info;

fn main() -> anyhow::Result<ExitCode> {
	let cli = Cli::parse();

	setup_tracing(cli.verbose);

	let config = cli.load_config()?;
	info!(root = %cli.root.display(), mappings = %config.mappings_dir.display(), "starting featmap");
	let workspace = Workspace::open(config)?;

	let persist = cli.command.persist();
	let report = match &cli.command {
		Command::Lint => workspace.lint(cli.keep_going)?,
		Command::Schema { .. } => workspace.schema(persist)?,
		Command::Combine { .. } => workspace.combine(cli.keep_going, persist)?,
		Command::Build { .. } => workspace.build(cli.keep_going, persist)?,
		Command::Validate { file } => workspace.validate_document(file)?,
	};

	report::render(&report, &mut std::io::stderr().lock())?;
	let success = report.is_success();
	if let Some(err) = report.into_validation_error() {
		return Err(err.into());
	}
	Ok(if success { ExitCode::SUCCESS } else { ExitCode::FAILURE })
}

fn setup_tracing(verbose: bool) {
	use tracing_subscriber::EnvFilter;

	let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
		if verbose {
			EnvFilter::new("featmap=debug,featmap_mappings=debug,info")
		} else {
			EnvFilter::new("info")
		}
	});

	tracing_subscriber::fmt()
		.with_env_filter(filter)
		.with_writer(std::io::stderr)
		.with_target(verbose)
		.init();
}
