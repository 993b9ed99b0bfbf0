use super::*;

fn parse(args: &[&str]) -> Cli {
	Cli::try_parse_from(std::iter::once("featmap").chain(args.iter().copied())).unwrap()
}

#[test]
fn parse_lint_with_defaults() {
	let cli = parse(&["lint"]);
	assert_eq!(cli.command, Command::Lint);
	assert_eq!(cli.root, PathBuf::from("."));
	assert!(cli.config.is_none());
	assert!(!cli.keep_going);
	assert!(!cli.verbose);
}

#[test]
fn parse_check_flags() {
	assert_eq!(parse(&["build", "--check"]).command.persist(), Persist::Check);
	assert_eq!(parse(&["combine", "--check"]).command.persist(), Persist::Check);
	assert_eq!(parse(&["schema"]).command.persist(), Persist::Write);
	assert_eq!(parse(&["lint"]).command.persist(), Persist::Write);
}

#[test]
fn global_flags_after_subcommand() {
	let cli = parse(&["combine", "--keep-going", "-v", "--root", "repo"]);
	assert!(cli.keep_going);
	assert!(cli.verbose);
	assert_eq!(cli.root, PathBuf::from("repo"));
}

#[test]
fn parse_validate_requires_file() {
	assert!(Cli::try_parse_from(["featmap", "validate"]).is_err());
	let cli = parse(&["validate", "out/combined.json"]);
	assert_eq!(cli.command, Command::Validate { file: PathBuf::from("out/combined.json") });
}

#[test]
fn subcommand_is_required() {
	assert!(Cli::try_parse_from(["featmap"]).is_err());
}

#[test]
fn absolute_overrides_replace_config_paths() {
	let root = std::env::temp_dir();
	let features = root.join("data.json");
	let cli = parse(&["lint", "--root", root.to_str().unwrap(), "--features", features.to_str().unwrap()]);

	let mut config = Config::default();
	cli.apply_overrides(&mut config);
	assert_eq!(config.features, features);
	assert_eq!(config.registry, PathBuf::from("schemas.json"));
}
