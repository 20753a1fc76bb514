#![allow(dead_code)]

use std::path::Path;

use assert_cmd::Command;
use insta_cmd::get_cargo_bin;

pub const CONFIG: &str = r#"library = "alia"

[[targets]]
name = "core"
modules = "src/alia"
output = "alia.hpp"
"#;

pub fn amalgam_cmd() -> Command {
	let mut cmd = Command::new(get_cargo_bin("amalgam"));
	cmd.env("NO_COLOR", "1")
		.env_remove("AMALGAM_RELEASE_TAG")
		.env_remove("AMALGAM_BRANCH")
		.env_remove("AMALGAM_COMMIT")
		.env_remove("RUST_LOG");
	cmd
}

pub fn write_file(root: &Path, relative: &str, content: &str) {
	let path = root.join(relative);
	if let Some(parent) = path.parent() {
		std::fs::create_dir_all(parent)
			.unwrap_or_else(|e| panic!("create_dir_all {}: {e}", parent.display()));
	}
	std::fs::write(&path, content).unwrap_or_else(|e| panic!("write {}: {e}", path.display()));
}

/// Wrap `body` in the include guard for `symbol`.
pub fn guarded(symbol: &str, body: &str) -> String {
	format!("#ifndef ALIA_{symbol}_HPP\n#define ALIA_{symbol}_HPP\n\n{body}\n#endif\n")
}

/// A project with modules `a` and `b` (which includes `a` and `lib/x.h`)
/// and one implementation file.
pub fn write_project(root: &Path) {
	write_file(root, "amalgam.toml", CONFIG);
	write_file(root, "src/alia/a.hpp", &guarded("A", "int a();"));
	write_file(
		root,
		"src/alia/b.hpp",
		&guarded("B", "#include <alia/a.hpp>\n#include <lib/x.h>\n\nint b();"),
	);
	write_file(
		root,
		"src/alia/b_impl.cpp",
		"#include <alia/b.hpp>\n#include <lib/x.h>\n\nint b() { return a(); }\n",
	);
}
