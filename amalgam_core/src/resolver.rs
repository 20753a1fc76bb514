use std::collections::HashMap;

use crate::AmalgamError;
use crate::AmalgamResult;
use crate::DirectiveSyntax;
use crate::ExternalRegistry;
use crate::LineKind;
use crate::ModulePath;
use crate::OutputDocument;
use crate::SourceLayout;
use crate::discovery::read_lines;
use crate::guard::strip_guard;

/// Traversal state of a module during one run. Modules missing from the
/// state map are unvisited.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VisitState {
	/// The module's lines are being emitted; its internal references are
	/// still being resolved.
	Processing,
	/// The module's body is fully emitted.
	Done,
}

/// Inlines modules depth-first so that every module is emitted exactly once
/// and only after everything it includes.
#[derive(Debug)]
pub struct ModuleResolver<'a> {
	layout: &'a SourceLayout,
	syntax: &'a DirectiveSyntax,
	states: HashMap<ModulePath, VisitState>,
	emitted: Vec<ModulePath>,
}

impl<'a> ModuleResolver<'a> {
	pub fn new(layout: &'a SourceLayout, syntax: &'a DirectiveSyntax) -> Self {
		Self {
			layout,
			syntax,
			states: HashMap::new(),
			emitted: Vec::new(),
		}
	}

	pub fn state(&self, module: &ModulePath) -> Option<VisitState> {
		self.states.get(module).copied()
	}

	pub fn is_done(&self, module: &ModulePath) -> bool {
		self.state(module) == Some(VisitState::Done)
	}

	/// Modules in the order their bodies were completed.
	pub fn emitted(&self) -> &[ModulePath] {
		&self.emitted
	}

	pub fn into_emitted(self) -> Vec<ModulePath> {
		self.emitted
	}

	/// Emit `module` (and, first, every module it includes) into `document`.
	///
	/// Already emitted modules are skipped. Reaching a module that is still
	/// being processed means the includes form a cycle.
	pub fn resolve(
		&mut self,
		module: &ModulePath,
		registry: &mut ExternalRegistry,
		document: &mut OutputDocument,
	) -> AmalgamResult<()> {
		match self.state(module) {
			Some(VisitState::Done) => return Ok(()),
			Some(VisitState::Processing) => {
				return Err(AmalgamError::CyclicReference {
					path: self.display_path(module),
				});
			}
			None => {}
		}

		self.states.insert(module.clone(), VisitState::Processing);

		let path = self.display_path(module);
		let lines = read_lines(&self.layout.file_of(module))?;
		let lines = strip_guard(&path, lines, self.syntax)?;

		for line in lines {
			match self.syntax.classify(&line) {
				LineKind::InternalReference(reference) => {
					let dependency = ModulePath::new(reference);
					self.resolve(&dependency, registry, document)?;
				}
				LineKind::ExternalDependency(identifier) => {
					if registry.register(identifier) {
						document.push(line);
					}
				}
				LineKind::GuardOpener | LineKind::Endif | LineKind::Text => document.push(line),
			}
		}

		tracing::debug!(module = %module, "resolved module");
		self.states.insert(module.clone(), VisitState::Done);
		self.emitted.push(module.clone());
		Ok(())
	}

	fn display_path(&self, module: &ModulePath) -> String {
		self.layout.file_of(module).display().to_string()
	}
}
