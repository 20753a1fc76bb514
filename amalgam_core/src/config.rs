use std::path::Path;
use std::path::PathBuf;

use serde::Deserialize;

use crate::AmalgamError;
use crate::AmalgamResult;
use crate::DirectiveSyntax;
use crate::ReferencePolicy;

/// Supported config file locations in discovery order (highest precedence
/// first).
pub const CONFIG_FILE_CANDIDATES: [&str; 3] =
	["amalgam.toml", ".amalgam.toml", ".config/amalgam.toml"];

/// The config written by `amalgam init`.
pub const SAMPLE_CONFIG: &str = r#"# amalgam configuration

# Name of the library. `#include <mylib/...>` lines are internal references
# and include guards look like `MYLIB_..._HPP`.
library = "mylib"

# Optional license file rendered as a comment banner at the top of each output.
# license = "LICENSE.txt"

# Directory that internal include paths are relative to.
include_root = "src"

[modules]
patterns = ["**/*.hpp"]

[implementation]
patterns = ["**/*.cpp"]

[[targets]]
name = "core"
modules = "src/mylib"
implementation = "src/mylib"
output = "mylib.hpp"
"#;

/// Configuration loaded from an `amalgam.toml` file.
///
/// ```toml
/// library = "alia"
/// license = "LICENSE.txt"
/// include_root = "src"
/// guard_suffix = "HPP"
/// strict_references = false
///
/// [modules]
/// patterns = ["**/*.hpp"]
///
/// [implementation]
/// patterns = ["**/*.cpp"]
///
/// [exclude]
/// patterns = ["internal/"]
///
/// [provenance]
/// tag_env = "AMALGAM_RELEASE_TAG"
/// branch_env = "AMALGAM_BRANCH"
/// commit_env = "AMALGAM_COMMIT"
///
/// [[targets]]
/// name = "core"
/// modules = "src/alia"
/// implementation = "src/alia"
/// output = "alia.hpp"
/// ```
#[derive(Debug, Clone, Deserialize)]
pub struct AmalgamConfig {
	/// Library name. Includes under `<library>/` are internal references.
	pub library: String,
	/// License file rendered as the comment banner, relative to the project
	/// root.
	#[serde(default)]
	pub license: Option<PathBuf>,
	/// Directory internal include paths are relative to.
	#[serde(default = "default_include_root")]
	pub include_root: PathBuf,
	/// Suffix of include guard symbols, without the leading underscore.
	#[serde(default = "default_guard_suffix")]
	pub guard_suffix: String,
	/// Fail on internal includes in implementation files that name modules
	/// which were never emitted.
	#[serde(default)]
	pub strict_references: bool,
	/// Which files under a target's module root are modules.
	#[serde(default = "default_module_patterns")]
	pub modules: FilePatterns,
	/// Which files under a target's implementation root are implementation
	/// files.
	#[serde(default = "default_implementation_patterns")]
	pub implementation: FilePatterns,
	/// Exclusion configuration using gitignore-style patterns.
	#[serde(default)]
	pub exclude: ExcludeConfig,
	/// Environment variables feeding the provenance stamp.
	#[serde(default)]
	pub provenance: ProvenanceConfig,
	/// The single-header files to generate.
	#[serde(default)]
	pub targets: Vec<TargetConfig>,
}

/// Glob patterns matched against paths relative to the walked root.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct FilePatterns {
	pub patterns: Vec<String>,
}

/// Configuration for excluding files and directories from discovery.
///
/// Patterns follow gitignore syntax and are relative to the project root.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ExcludeConfig {
	#[serde(default)]
	pub patterns: Vec<String>,
}

/// Names of the environment variables the provenance stamp reads. All of
/// them are optional at run time.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct ProvenanceConfig {
	#[serde(default = "default_tag_env")]
	pub tag_env: String,
	#[serde(default = "default_branch_env")]
	pub branch_env: String,
	#[serde(default = "default_commit_env")]
	pub commit_env: String,
}

impl Default for ProvenanceConfig {
	fn default() -> Self {
		Self {
			tag_env: default_tag_env(),
			branch_env: default_branch_env(),
			commit_env: default_commit_env(),
		}
	}
}

/// One generated single-header file.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct TargetConfig {
	/// Module name; keys the document guard (`ALIA_CORE_HPP` for `core`).
	pub name: String,
	/// Directory holding the target's modules.
	pub modules: PathBuf,
	/// Directory holding the target's implementation files. Defaults to the
	/// module directory.
	#[serde(default)]
	pub implementation: Option<PathBuf>,
	/// Where the document is written.
	pub output: PathBuf,
}

impl TargetConfig {
	pub fn implementation_root(&self) -> &Path {
		self.implementation.as_deref().unwrap_or(&self.modules)
	}
}

fn default_include_root() -> PathBuf {
	PathBuf::from("src")
}

fn default_guard_suffix() -> String {
	"HPP".to_string()
}

fn default_module_patterns() -> FilePatterns {
	FilePatterns {
		patterns: vec!["**/*.hpp".to_string()],
	}
}

fn default_implementation_patterns() -> FilePatterns {
	FilePatterns {
		patterns: vec!["**/*.cpp".to_string()],
	}
}

fn default_tag_env() -> String {
	"AMALGAM_RELEASE_TAG".to_string()
}

fn default_branch_env() -> String {
	"AMALGAM_BRANCH".to_string()
}

fn default_commit_env() -> String {
	"AMALGAM_COMMIT".to_string()
}

impl AmalgamConfig {
	/// Resolve the config path from known discovery candidates.
	#[must_use]
	pub fn resolve_path(root: &Path) -> Option<PathBuf> {
		CONFIG_FILE_CANDIDATES
			.iter()
			.map(|candidate| root.join(candidate))
			.find(|path| path.is_file())
	}

	/// Load the config from the first discovered config file at `root`.
	/// Returns `None` if no config file exists.
	pub fn load(root: &Path) -> AmalgamResult<Option<Self>> {
		let Some(config_path) = Self::resolve_path(root) else {
			return Ok(None);
		};

		let content =
			std::fs::read_to_string(&config_path).map_err(|e| AmalgamError::io(&config_path, e))?;
		Self::parse(&content).map(Some)
	}

	/// Like [`AmalgamConfig::load`] but a missing config is an error.
	pub fn load_required(root: &Path) -> AmalgamResult<Self> {
		Self::load(root)?.ok_or_else(|| AmalgamError::ConfigNotFound(root.display().to_string()))
	}

	/// Parse config file content.
	pub fn parse(content: &str) -> AmalgamResult<Self> {
		let config: Self =
			toml::from_str(content).map_err(|e| AmalgamError::ConfigParse(e.to_string()))?;

		if config.library.trim_matches('/').is_empty() {
			return Err(AmalgamError::ConfigParse(
				"`library` must not be empty".to_string(),
			));
		}

		Ok(config)
	}

	pub fn syntax(&self) -> DirectiveSyntax {
		DirectiveSyntax::new(&self.library, &self.guard_suffix)
	}

	pub fn reference_policy(&self) -> ReferencePolicy {
		if self.strict_references {
			ReferencePolicy::Strict
		} else {
			ReferencePolicy::Lenient
		}
	}

	/// The targets to run: all of them, or only the one called `name`.
	pub fn select_targets(&self, name: Option<&str>) -> AmalgamResult<Vec<&TargetConfig>> {
		if self.targets.is_empty() {
			return Err(AmalgamError::NoTargets);
		}

		match name {
			None => Ok(self.targets.iter().collect()),
			Some(name) => {
				self.targets
					.iter()
					.find(|target| target.name == name)
					.map(|target| vec![target])
					.ok_or_else(|| AmalgamError::UnknownTarget(name.to_string()))
			}
		}
	}
}
