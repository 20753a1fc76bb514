use std::path::Component;
use std::path::Path;
use std::path::PathBuf;
use std::time::UNIX_EPOCH;

use crate::AmalgamConfig;
use crate::AmalgamError;
use crate::AmalgamResult;
use crate::DirectiveSyntax;
use crate::ExternalRegistry;
use crate::FileFilter;
use crate::ModulePath;
use crate::ModuleResolver;
use crate::OutputDocument;
use crate::Provenance;
use crate::ReferencePolicy;
use crate::SourceLayout;
use crate::TargetConfig;
use crate::discovery::collect_files;
use crate::discovery::normalize_line_endings;
use crate::discovery::read_lines;
use crate::merge_implementation;

/// Everything one assembly run needs, with paths resolved against the
/// project root.
#[derive(Debug, Clone)]
pub struct AssemblyPlan {
	/// Module name keying the document guard.
	pub name: String,
	pub module_root: PathBuf,
	pub implementation_root: PathBuf,
	pub output: PathBuf,
	/// License file rendered as the banner.
	pub license: Option<PathBuf>,
	pub layout: SourceLayout,
	pub syntax: DirectiveSyntax,
	pub module_filter: FileFilter,
	pub implementation_filter: FileFilter,
	pub policy: ReferencePolicy,
}

impl AssemblyPlan {
	/// Build the plan for `target` of the project at `root`.
	pub fn from_config(
		root: &Path,
		config: &AmalgamConfig,
		target: &TargetConfig,
	) -> AmalgamResult<Self> {
		let include_root = root.join(&config.include_root);
		let module_root = root.join(&target.modules);

		// Components are compared as written, so `..` must not appear below
		// the include root.
		let inside = module_root.strip_prefix(&include_root).is_ok_and(|relative| {
			relative
				.components()
				.all(|component| !matches!(component, Component::ParentDir))
		});
		if !inside {
			return Err(AmalgamError::ConfigParse(format!(
				"module root `{}` of target `{}` is not inside include root `{}`",
				target.modules.display(),
				target.name,
				config.include_root.display()
			)));
		}

		Ok(Self {
			name: target.name.clone(),
			module_root,
			implementation_root: root.join(target.implementation_root()),
			output: root.join(&target.output),
			license: config.license.as_ref().map(|license| root.join(license)),
			layout: SourceLayout::new(include_root),
			syntax: config.syntax(),
			module_filter: FileFilter::new(root, &config.modules.patterns, &config.exclude.patterns)?,
			implementation_filter: FileFilter::new(
				root,
				&config.implementation.patterns,
				&config.exclude.patterns,
			)?,
			policy: config.reference_policy(),
		})
	}
}

/// A fully assembled document that has not been written yet.
#[derive(Debug, Clone)]
pub struct Assembly {
	/// Module name keying the document guard.
	pub name: String,
	/// Where the document belongs.
	pub output: PathBuf,
	pub document: OutputDocument,
	/// Modules in emission order.
	pub modules: Vec<ModulePath>,
	/// External dependencies in first-seen order.
	pub external_dependencies: Vec<String>,
	/// Implementation files in merge order.
	pub implementation_files: Vec<PathBuf>,
	/// Zero-based line index of the provenance stamp in [`Assembly::text`].
	pub stamp_line: usize,
}

impl Assembly {
	pub fn text(&self) -> String {
		self.document.render()
	}
}

/// Assemble the document described by `plan`.
///
/// Nothing touches the output path here; see [`write_assembly`].
pub fn assemble(plan: &AssemblyPlan, provenance: &Provenance) -> AmalgamResult<Assembly> {
	let mut document = OutputDocument::new();
	let mut registry = ExternalRegistry::new();

	if let Some(license) = &plan.license {
		for line in read_lines(license)? {
			document.push(format!("// {line}").trim_end());
		}
		document.push_blank();
	}

	let stamp_line = document.len();
	let file_name = plan
		.output
		.file_name()
		.map_or_else(|| plan.name.clone(), |name| name.to_string_lossy().into_owned());
	document.push(provenance.stamp(&file_name));
	document.push_blank();

	let guard = plan.syntax.document_guard(&plan.name);
	document.push(format!("#ifndef {guard}"));
	document.push(format!("#define {guard}"));

	let mut resolver = ModuleResolver::new(&plan.layout, &plan.syntax);
	for file in collect_files(&plan.module_root, &plan.module_filter)? {
		let Some(module) = plan.layout.module_of(&file) else {
			continue;
		};
		if !resolver.is_done(&module) {
			resolver.resolve(&module, &mut registry, &mut document)?;
		}
	}

	document.push(format!("#ifdef {}", plan.syntax.implementation_gate()));

	let implementation_files = collect_files(&plan.implementation_root, &plan.implementation_filter)?;
	for file in &implementation_files {
		merge_implementation(
			file,
			&plan.syntax,
			plan.policy,
			|module| resolver.is_done(module),
			&mut registry,
			&mut document,
		)?;
	}

	document.push("#endif");
	document.push("#endif");

	tracing::debug!(
		name = %plan.name,
		modules = resolver.emitted().len(),
		external_dependencies = registry.len(),
		implementation_files = implementation_files.len(),
		"assembled document"
	);

	Ok(Assembly {
		name: plan.name.clone(),
		output: plan.output.clone(),
		document,
		modules: resolver.into_emitted(),
		external_dependencies: registry.into_dependencies(),
		implementation_files,
		stamp_line,
	})
}

/// Plan and assemble one configured target.
pub fn assemble_target(
	root: &Path,
	config: &AmalgamConfig,
	target: &TargetConfig,
	provenance: &Provenance,
) -> AmalgamResult<Assembly> {
	let plan = AssemblyPlan::from_config(root, config, target)?;
	assemble(&plan, provenance)
}

/// Write the document to its output path, replacing any existing file.
///
/// The content goes to a temporary sibling first and is renamed into place,
/// so a failed write never leaves a truncated document behind.
pub fn write_assembly(assembly: &Assembly) -> AmalgamResult<()> {
	let output = &assembly.output;
	if let Some(parent) = output.parent().filter(|parent| !parent.as_os_str().is_empty()) {
		std::fs::create_dir_all(parent).map_err(|e| AmalgamError::io(parent, e))?;
	}

	let file_name = output
		.file_name()
		.map_or_else(|| "amalgam".into(), |name| name.to_string_lossy());
	let temp_path = output.with_file_name(format!(
		".{file_name}.tmp-{}-{}",
		std::process::id(),
		std::time::SystemTime::now()
			.duration_since(UNIX_EPOCH)
			.map_or(0, |duration| duration.as_nanos())
	));

	std::fs::write(&temp_path, assembly.text()).map_err(|e| AmalgamError::io(&temp_path, e))?;
	if let Err(e) = std::fs::rename(&temp_path, output) {
		let _ = std::fs::remove_file(&temp_path);
		return Err(AmalgamError::io(output, e));
	}

	tracing::debug!(output = %output.display(), "wrote document");
	Ok(())
}

/// How an existing output compares to a fresh assembly.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CheckOutcome {
	/// The output matches apart from its provenance stamp.
	UpToDate,
	/// There is no output file yet.
	Missing,
	/// The output differs. Both sides have their provenance stamp removed.
	Stale { current: String, expected: String },
}

impl CheckOutcome {
	pub fn is_ok(&self) -> bool {
		matches!(self, Self::UpToDate)
	}
}

/// Compare a fresh assembly with the file at its output path.
pub fn check_assembly(assembly: &Assembly) -> AmalgamResult<CheckOutcome> {
	let current = match std::fs::read_to_string(&assembly.output) {
		Ok(current) => current,
		Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(CheckOutcome::Missing),
		Err(e) => return Err(AmalgamError::io(&assembly.output, e)),
	};

	let current = strip_stamp(&normalize_line_endings(&current), assembly.stamp_line);
	let expected = strip_stamp(&assembly.text(), assembly.stamp_line);

	if current == expected {
		Ok(CheckOutcome::UpToDate)
	} else {
		Ok(CheckOutcome::Stale { current, expected })
	}
}

/// Assemble `target` in memory and compare it with its output file.
pub fn check_target(
	root: &Path,
	config: &AmalgamConfig,
	target: &TargetConfig,
	provenance: &Provenance,
) -> AmalgamResult<CheckOutcome> {
	let assembly = assemble_target(root, config, target, provenance)?;
	check_assembly(&assembly)
}

/// Remove the provenance stamp from a rendered document.
///
/// The stamp is found by position rather than by content, since a license
/// banner may contain any text.
pub fn strip_stamp(text: &str, stamp_line: usize) -> String {
	text.split_inclusive('\n')
		.enumerate()
		.filter(|(index, _)| *index != stamp_line)
		.map(|(_, line)| line)
		.collect()
}
