use miette::Diagnostic;
use thiserror::Error;

#[derive(Debug, Diagnostic, Error)]
#[non_exhaustive]
pub enum AmalgamError {
	#[error("failed to access `{path}`")]
	#[diagnostic(code(amalgam::io_error))]
	Io {
		path: String,
		#[source]
		source: std::io::Error,
	},

	#[error("{path}: module files must end with `#endif`")]
	#[diagnostic(
		code(amalgam::malformed_module),
		help(
			"the last non-blank line of every module closes its include guard; add `#endif` at \
			 the end of `{path}`"
		)
	)]
	MalformedModule { path: String },

	#[error("{path}: cyclical #includes detected")]
	#[diagnostic(
		code(amalgam::cyclic_reference),
		help("`{path}` is included, directly or transitively, by itself; break the cycle")
	)]
	CyclicReference { path: String },

	#[error("{path}: internal include `{reference}` does not name an emitted module")]
	#[diagnostic(
		code(amalgam::unresolved_reference),
		help("add the module under a module root or disable `strict_references`")
	)]
	UnresolvedReference { path: String, reference: String },

	#[error("failed to parse config file: {0}")]
	#[diagnostic(
		code(amalgam::config_parse),
		help("check that amalgam.toml is valid TOML with `library` and `[[targets]]` entries")
	)]
	ConfigParse(String),

	#[error("no config file found in `{0}`")]
	#[diagnostic(
		code(amalgam::config_not_found),
		help("run `amalgam init` to create an amalgam.toml")
	)]
	ConfigNotFound(String),

	#[error("unknown target: `{0}`")]
	#[diagnostic(
		code(amalgam::unknown_target),
		help("target names are declared with `[[targets]]` in amalgam.toml")
	)]
	UnknownTarget(String),

	#[error("no targets configured")]
	#[diagnostic(
		code(amalgam::no_targets),
		help("declare at least one `[[targets]]` entry in amalgam.toml")
	)]
	NoTargets,

	#[error("symlink cycle detected at: `{path}`")]
	#[diagnostic(
		code(amalgam::symlink_cycle),
		help("remove the circular symlink or exclude this path")
	)]
	SymlinkCycle { path: String },
}

impl AmalgamError {
	/// Wrap an I/O error with the path it happened on.
	pub fn io(path: impl AsRef<std::path::Path>, source: std::io::Error) -> Self {
		Self::Io {
			path: path.as_ref().display().to_string(),
			source,
		}
	}
}

pub type AmalgamResult<T> = Result<T, AmalgamError>;
pub type AnyError = Box<dyn std::error::Error>;
pub type AnyEmptyResult = Result<(), AnyError>;
pub type AnyResult<T> = Result<T, AnyError>;
