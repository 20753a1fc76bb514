use std::path::Path;
use std::path::PathBuf;
use std::process;
use std::sync::mpsc;
use std::time::Duration;

use amalgam_cli::AmalgamCli;
use amalgam_cli::Commands;
use amalgam_cli::OutputFormat;
use amalgam_cli::is_generated;
use amalgam_core::AmalgamConfig;
use amalgam_core::AmalgamError;
use amalgam_core::Assembly;
use amalgam_core::CheckOutcome;
use amalgam_core::Provenance;
use amalgam_core::SAMPLE_CONFIG;
use amalgam_core::assemble_target;
use amalgam_core::check_assembly;
use amalgam_core::write_assembly;
use clap::Parser;
use owo_colors::OwoColorize;
use similar::ChangeTag;
use similar::TextDiff;
use tracing_subscriber::EnvFilter;

static USE_COLOR: std::sync::atomic::AtomicBool = std::sync::atomic::AtomicBool::new(true);

fn color_enabled() -> bool {
	USE_COLOR.load(std::sync::atomic::Ordering::Relaxed)
}

/// Apply ANSI color codes only when color is enabled.
macro_rules! colored {
	($text:expr,red) => {
		if color_enabled() {
			format!("{}", $text.red())
		} else {
			format!("{}", $text)
		}
	};
	($text:expr,green) => {
		if color_enabled() {
			format!("{}", $text.green())
		} else {
			format!("{}", $text)
		}
	};
	($text:expr,yellow) => {
		if color_enabled() {
			format!("{}", $text.yellow())
		} else {
			format!("{}", $text)
		}
	};
	($text:expr,bold) => {
		if color_enabled() {
			format!("{}", $text.bold())
		} else {
			format!("{}", $text)
		}
	};
}

fn main() {
	let args = AmalgamCli::parse();

	// Respect NO_COLOR env var, --no-color flag and terminals without color.
	let use_color = !args.no_color
		&& std::env::var_os("NO_COLOR").is_none()
		&& supports_color::on(supports_color::Stream::Stderr).is_some();
	if !use_color {
		USE_COLOR.store(false, std::sync::atomic::Ordering::Relaxed);
	}

	init_tracing(args.verbose, use_color);

	// Install miette's fancy handler for rich error diagnostics.
	miette::set_hook(Box::new(move |_| {
		Box::new(
			miette::MietteHandlerOpts::new()
				.color(use_color)
				.unicode(use_color)
				.build(),
		)
	}))
	.ok();

	let result = match &args.command {
		Some(Commands::Init) => run_init(&args),
		Some(Commands::Build {
			target,
			dry_run,
			watch,
		}) => run_build(&args, target.as_deref(), *dry_run, *watch),
		Some(Commands::Check {
			target,
			diff,
			format,
		}) => run_check(&args, target.as_deref(), *diff, *format),
		Some(Commands::List { target, format }) => run_list(&args, target.as_deref(), *format),
		None => {
			eprintln!("No subcommand specified. Run `amalgam --help` for usage.");
			process::exit(1);
		}
	};

	if let Err(e) = result {
		// Try to render through miette for rich diagnostics with help text
		// and error codes.
		match e.downcast::<AmalgamError>() {
			Ok(amalgam_err) => {
				let report: miette::Report = (*amalgam_err).into();
				eprintln!("{report:?}");
			}
			Err(e) => {
				eprintln!("{} {e}", colored!("error:", red));
			}
		}
		process::exit(2);
	}
}

/// Send log output to stderr. `RUST_LOG` wins over the default level.
fn init_tracing(verbose: bool, use_color: bool) {
	let default_level = if verbose { "debug" } else { "warn" };
	let filter =
		EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

	tracing_subscriber::fmt()
		.with_env_filter(filter)
		.with_writer(std::io::stderr)
		.with_ansi(use_color)
		.with_target(false)
		.without_time()
		.init();
}

fn resolve_root(args: &AmalgamCli) -> PathBuf {
	args.path
		.clone()
		.unwrap_or_else(|| std::env::current_dir().unwrap_or_else(|_| PathBuf::from(".")))
}

/// Load the project config, applying command line overrides.
fn load_config(args: &AmalgamCli) -> Result<(PathBuf, AmalgamConfig), Box<dyn std::error::Error>> {
	let root = resolve_root(args);
	let mut config = AmalgamConfig::load_required(&root)?;
	if args.strict {
		config.strict_references = true;
	}

	Ok((root, config))
}

/// Assemble every selected target with a single provenance stamp.
fn assemble_selected(
	args: &AmalgamCli,
	target: Option<&str>,
) -> Result<(PathBuf, Vec<Assembly>), Box<dyn std::error::Error>> {
	let (root, config) = load_config(args)?;
	let provenance = Provenance::from_env(&config.provenance);
	tracing::debug!(version = provenance.version(), "provenance");

	let assemblies = config
		.select_targets(target)?
		.into_iter()
		.map(|target| assemble_target(&root, &config, target, &provenance))
		.collect::<Result<Vec<_>, _>>()?;

	Ok((root, assemblies))
}

fn run_init(args: &AmalgamCli) -> Result<(), Box<dyn std::error::Error>> {
	let root = resolve_root(args);

	if let Some(existing) = AmalgamConfig::resolve_path(&root) {
		println!("Config file already exists: {}", existing.display());
		return Ok(());
	}

	let config_path = root.join("amalgam.toml");
	std::fs::write(&config_path, SAMPLE_CONFIG)?;
	println!("Created {}", config_path.display());
	println!();
	println!("Next steps:");
	println!("  1. Set `library` to the name your internal includes start with");
	println!("  2. Point each [[targets]] entry at its module directory");
	println!("  3. Run `amalgam build` to generate the header");

	Ok(())
}

fn run_build(
	args: &AmalgamCli,
	target: Option<&str>,
	dry_run: bool,
	watch: bool,
) -> Result<(), Box<dyn std::error::Error>> {
	// Run the initial build.
	run_build_once(args, target, dry_run)?;

	if !watch || dry_run {
		return Ok(());
	}

	// Watch mode
	println!("\nWatching for file changes... (press Ctrl+C to stop)");

	let root = resolve_root(args);
	let outputs = selected_outputs(args, target)?;
	let (tx, rx) = mpsc::channel();

	let mut watcher =
		notify::recommended_watcher(move |res: Result<notify::Event, notify::Error>| {
			if let Ok(event) = res {
				// Our own writes must not trigger another build.
				let is_output = event
					.paths
					.iter()
					.all(|path| is_generated(path, &outputs));
				if !is_output
					&& matches!(
						event.kind,
						notify::EventKind::Modify(_)
							| notify::EventKind::Create(_)
							| notify::EventKind::Remove(_)
					) {
					let _ = tx.send(());
				}
			}
		})?;

	use notify::Watcher;
	watcher.watch(&root, notify::RecursiveMode::Recursive)?;

	loop {
		rx.recv()?;
		// Debounce: drain additional events within 200ms.
		while rx.recv_timeout(Duration::from_millis(200)).is_ok() {}

		println!("\nFile change detected, rebuilding...");
		if let Err(e) = run_build_once(args, target, false) {
			eprintln!("{} {e}", colored!("error:", red));
		}
	}
}

/// Output paths of the selected targets.
fn selected_outputs(
	args: &AmalgamCli,
	target: Option<&str>,
) -> Result<Vec<PathBuf>, Box<dyn std::error::Error>> {
	let (root, config) = load_config(args)?;
	Ok(config
		.select_targets(target)?
		.into_iter()
		.map(|target| root.join(&target.output))
		.collect())
}

fn run_build_once(
	args: &AmalgamCli,
	target: Option<&str>,
	dry_run: bool,
) -> Result<(), Box<dyn std::error::Error>> {
	let (root, assemblies) = assemble_selected(args, target)?;

	if dry_run {
		println!("Dry run: would write {} file(s):", assemblies.len());
		for assembly in &assemblies {
			let rel = make_relative(&assembly.output, &root);
			println!(
				"  {rel} ({} module(s), {} implementation file(s))",
				assembly.modules.len(),
				assembly.implementation_files.len()
			);
		}
		return Ok(());
	}

	for assembly in &assemblies {
		write_assembly(assembly)?;
		let rel = make_relative(&assembly.output, &root);
		println!(
			"{} {rel} from {} module(s)",
			colored!("Wrote", green),
			assembly.modules.len()
		);

		if args.verbose {
			for module in &assembly.modules {
				println!("  {module}");
			}
		}
	}

	Ok(())
}

fn run_check(
	args: &AmalgamCli,
	target: Option<&str>,
	show_diff: bool,
	format: OutputFormat,
) -> Result<(), Box<dyn std::error::Error>> {
	let (root, assemblies) = assemble_selected(args, target)?;

	let mut results = Vec::with_capacity(assemblies.len());
	for assembly in &assemblies {
		results.push((assembly, check_assembly(assembly)?));
	}

	let failing: Vec<_> = results
		.iter()
		.filter(|(_, outcome)| !outcome.is_ok())
		.collect();

	match format {
		OutputFormat::Json => {
			let entries: Vec<serde_json::Value> = results
				.iter()
				.map(|(assembly, outcome)| {
					serde_json::json!({
						"target": assembly.name,
						"output": make_relative(&assembly.output, &root),
						"status": outcome_label(outcome),
					})
				})
				.collect();
			let output = serde_json::json!({
				"ok": failing.is_empty(),
				"targets": entries,
			});
			println!("{output}");
		}
		OutputFormat::Text => {
			if failing.is_empty() {
				println!("Check passed: all generated headers are up to date.");
			} else {
				eprintln!("Check failed.");
				for (assembly, outcome) in &failing {
					let rel = make_relative(&assembly.output, &root);
					eprintln!(
						"  target `{}` at {rel}: {}",
						assembly.name,
						colored!(outcome_label(outcome), yellow)
					);

					if let CheckOutcome::Stale { current, expected } = outcome {
						if show_diff {
							print_diff(current, expected);
						}
					}
				}
				eprintln!();
				eprintln!(
					"{} generated header(s) are out of date. Run `amalgam build` to update them.",
					failing.len()
				);
			}
		}
	}

	if !failing.is_empty() {
		process::exit(1);
	}

	Ok(())
}

fn outcome_label(outcome: &CheckOutcome) -> &'static str {
	match outcome {
		CheckOutcome::UpToDate => "up to date",
		CheckOutcome::Missing => "missing",
		CheckOutcome::Stale { .. } => "stale",
	}
}

fn run_list(
	args: &AmalgamCli,
	target: Option<&str>,
	format: OutputFormat,
) -> Result<(), Box<dyn std::error::Error>> {
	let (root, assemblies) = assemble_selected(args, target)?;

	if let OutputFormat::Json = format {
		let entries: Vec<serde_json::Value> = assemblies
			.iter()
			.map(|assembly| {
				serde_json::json!({
					"target": assembly.name,
					"output": make_relative(&assembly.output, &root),
					"modules": assembly.modules,
					"external_dependencies": assembly.external_dependencies,
					"implementation_files": assembly
						.implementation_files
						.iter()
						.map(|file| make_relative(file, &root))
						.collect::<Vec<_>>(),
				})
			})
			.collect();
		println!("{}", serde_json::Value::Array(entries));
		return Ok(());
	}

	for (index, assembly) in assemblies.iter().enumerate() {
		if index > 0 {
			println!();
		}

		let rel = make_relative(&assembly.output, &root);
		println!("{} {rel}", colored!(format!("{}:", assembly.name), bold));

		println!("  Modules:");
		for module in &assembly.modules {
			println!("    {module}");
		}

		if !assembly.external_dependencies.is_empty() {
			println!("  External dependencies:");
			for dependency in &assembly.external_dependencies {
				println!("    {dependency}");
			}
		}

		if !assembly.implementation_files.is_empty() {
			println!("  Implementation files:");
			for file in &assembly.implementation_files {
				println!("    {}", make_relative(file, &root));
			}
		}

		println!(
			"\n{} module(s), {} external dependency(ies), {} implementation file(s)",
			assembly.modules.len(),
			assembly.external_dependencies.len(),
			assembly.implementation_files.len()
		);
	}

	Ok(())
}

/// Print a line diff between two strings, colorized.
fn print_diff(current: &str, expected: &str) {
	let diff = TextDiff::from_lines(current, expected);
	for change in diff.iter_all_changes() {
		match change.tag() {
			ChangeTag::Delete => {
				eprint!("  {}", colored!(format!("-{change}"), red));
			}
			ChangeTag::Insert => {
				eprint!("  {}", colored!(format!("+{change}"), green));
			}
			ChangeTag::Equal => {
				eprint!("   {change}");
			}
		}
	}
}

/// Make a path relative to root for display purposes.
fn make_relative(path: &Path, root: &Path) -> String {
	path.strip_prefix(root)
		.unwrap_or(path)
		.display()
		.to_string()
		.replace('\\', "/")
}
