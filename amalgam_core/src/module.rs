use std::path::Path;
use std::path::PathBuf;

use derive_more::Deref;
use derive_more::Display;
use serde::Serialize;

/// The logical identity of a module: its path relative to the include root
/// with `/` separators, e.g. `alia/flow/macros.hpp`.
///
/// Paths discovered by walking the module root and paths written in
/// `#include` lines both go through [`ModulePath::new`], so the same file
/// always maps to the same key.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Deref, Display, Serialize)]
#[serde(transparent)]
pub struct ModulePath(String);

impl ModulePath {
	/// Normalize a raw path spelling. Backslashes count as separators, empty
	/// and `.` components are dropped and `..` removes the previous component.
	pub fn new(raw: &str) -> Self {
		let mut components: Vec<&str> = Vec::new();
		for component in raw.split(['/', '\\']) {
			match component {
				"" | "." => {}
				".." => {
					components.pop();
				}
				other => components.push(other),
			}
		}

		Self(components.join("/"))
	}

	pub fn as_str(&self) -> &str {
		&self.0
	}
}

impl From<&str> for ModulePath {
	fn from(value: &str) -> Self {
		Self::new(value)
	}
}

/// Maps between module paths and files on disk.
#[derive(Debug, Clone)]
pub struct SourceLayout {
	include_root: PathBuf,
}

impl SourceLayout {
	pub fn new(include_root: impl Into<PathBuf>) -> Self {
		Self {
			include_root: include_root.into(),
		}
	}

	pub fn include_root(&self) -> &Path {
		&self.include_root
	}

	/// The file backing a module.
	pub fn file_of(&self, module: &ModulePath) -> PathBuf {
		module
			.split('/')
			.fold(self.include_root.clone(), |path, component| {
				path.join(component)
			})
	}

	/// The module a discovered file represents, or `None` when the file lies
	/// outside the include root.
	pub fn module_of(&self, file: &Path) -> Option<ModulePath> {
		let relative = file.strip_prefix(&self.include_root).ok()?;
		Some(ModulePath::new(&relative.to_string_lossy()))
	}
}
