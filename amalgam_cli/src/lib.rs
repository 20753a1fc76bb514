use std::path::Path;
use std::path::PathBuf;

use clap::Parser;
use clap::Subcommand;
use clap::ValueEnum;

#[derive(Parser)]
#[command(
	author,
	version,
	about = "Ship a modular header library as a single header file.",
	long_about = "amalgam merges a header-oriented library split across many module and \
	              implementation files into one distributable header.\n\nEvery module is \
	              inlined once in dependency order, external includes are deduplicated, \
	              per-module include guards are removed and the implementation is gated behind \
	              a single #ifdef.\n\nQuick start:\n  amalgam init   Create an amalgam.toml\n  \
	              amalgam build  Generate every configured header\n  amalgam check  Verify the \
	              generated headers are up to date\n  amalgam list   Show the emission order"
)]
pub struct AmalgamCli {
	#[command(subcommand)]
	pub command: Option<Commands>,

	/// Path to the project root directory.
	#[arg(long, short, global = true)]
	pub path: Option<PathBuf>,

	/// Enable verbose output and debug logging.
	#[arg(long, short, global = true, default_value_t = false)]
	pub verbose: bool,

	/// Disable colored output.
	#[arg(long, global = true, default_value_t = false)]
	pub no_color: bool,

	/// Fail when an implementation file includes a library module that was
	/// never emitted, regardless of `strict_references` in the config.
	#[arg(long, global = true, default_value_t = false)]
	pub strict: bool,
}

#[derive(Subcommand)]
pub enum Commands {
	/// Initialize amalgam in a project by creating a sample `amalgam.toml`.
	///
	/// If a config file already exists, this command is a no-op and exits
	/// successfully.
	Init,
	/// Generate the single-header file for every configured target.
	///
	/// Use `--dry-run` to assemble without writing to disk, or `--watch` to
	/// rebuild whenever a source file changes.
	Build {
		/// Only build the target with this name.
		#[arg(long, short)]
		target: Option<String>,

		/// Assemble every target and report what would be written without
		/// touching the output files.
		#[arg(long, default_value_t = false)]
		dry_run: bool,

		/// Watch for file changes and rebuild automatically.
		#[arg(long, default_value_t = false)]
		watch: bool,
	},
	/// Check that every generated header is up to date.
	///
	/// Assembles each target in memory and compares it with the file on
	/// disk, ignoring the provenance stamp. Exits with a non-zero status code
	/// if any output is missing or stale, which makes it a good fit for CI.
	Check {
		/// Only check the target with this name.
		#[arg(long, short)]
		target: Option<String>,

		/// Show a line diff for each stale output.
		#[arg(long, default_value_t = false)]
		diff: bool,

		/// Output format for check results.
		#[arg(long, value_enum, default_value_t = OutputFormat::Text)]
		format: OutputFormat,
	},
	/// List the modules, external dependencies and implementation files of
	/// each target in the order they are emitted.
	List {
		/// Only list the target with this name.
		#[arg(long, short)]
		target: Option<String>,

		/// Output format for the listing.
		#[arg(long, value_enum, default_value_t = OutputFormat::Text)]
		format: OutputFormat,
	},
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum OutputFormat {
	/// Human-readable text output with colors and formatting.
	Text,
	/// JSON output for programmatic consumption.
	Json,
}

/// Check whether `path` is one of `outputs` or the temporary sibling a write
/// of that output goes through (`.<name>.tmp-*`).
///
/// The build watcher skips events for these paths so a rebuild does not
/// trigger itself.
pub fn is_generated(path: &Path, outputs: &[PathBuf]) -> bool {
	outputs.iter().any(|output| {
		if path == output {
			return true;
		}
		let (Some(name), Some(output_name)) = (path.file_name(), output.file_name()) else {
			return false;
		};
		path.parent() == output.parent()
			&& name
				.to_string_lossy()
				.starts_with(&format!(".{}.tmp-", output_name.to_string_lossy()))
	})
}
