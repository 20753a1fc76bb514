mod common;

use amalgam_core::AmalgamConfig;
use amalgam_core::AnyEmptyResult;

#[test]
fn can_init() -> AnyEmptyResult {
	let tmp = tempfile::tempdir()?;
	let mut cmd = common::amalgam_cmd();
	cmd.arg("init")
		.arg("--path")
		.arg(tmp.path())
		.assert()
		.success()
		.stdout(predicates::str::contains("Created"))
		.stdout(predicates::str::contains("amalgam build"));

	let config_path = tmp.path().join("amalgam.toml");
	let content = std::fs::read_to_string(&config_path)?;
	let config = AmalgamConfig::parse(&content)?;
	assert_eq!(config.library, "mylib");
	assert_eq!(config.targets.len(), 1);

	Ok(())
}

#[test]
fn init_does_not_overwrite() -> AnyEmptyResult {
	let tmp = tempfile::tempdir()?;
	let config_path = tmp.path().join("amalgam.toml");
	std::fs::write(&config_path, "existing config")?;

	let mut cmd = common::amalgam_cmd();
	cmd.arg("init")
		.arg("--path")
		.arg(tmp.path())
		.assert()
		.success()
		.stdout(predicates::str::contains("already exists"));

	assert_eq!(std::fs::read_to_string(&config_path)?, "existing config");

	Ok(())
}

#[test]
fn init_respects_alternate_config_locations() -> AnyEmptyResult {
	let tmp = tempfile::tempdir()?;
	common::write_file(tmp.path(), ".config/amalgam.toml", "library = \"alia\"\n");

	let mut cmd = common::amalgam_cmd();
	cmd.arg("init")
		.arg("--path")
		.arg(tmp.path())
		.assert()
		.success()
		.stdout(predicates::str::contains("already exists"));

	assert!(!tmp.path().join("amalgam.toml").exists());

	Ok(())
}

#[test]
fn missing_subcommand_exits_with_usage_hint() {
	let mut cmd = common::amalgam_cmd();
	cmd.assert()
		.failure()
		.code(1)
		.stderr(predicates::str::contains("amalgam --help"));
}
