use std::path::Path;

use crate::AmalgamError;
use crate::AmalgamResult;
use crate::DirectiveSyntax;
use crate::ExternalRegistry;
use crate::LineKind;
use crate::ModulePath;
use crate::OutputDocument;
use crate::discovery::read_lines;

/// How internal includes inside implementation files are checked.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ReferencePolicy {
	/// Drop them without looking.
	#[default]
	Lenient,
	/// Fail unless the included module was emitted during the run.
	Strict,
}

/// Copy an implementation file into `document`.
///
/// Internal includes are dropped since their modules are already part of the
/// document. External includes go through `registry` like they do for
/// modules. `is_emitted` is only consulted under [`ReferencePolicy::Strict`].
pub fn merge_implementation(
	path: &Path,
	syntax: &DirectiveSyntax,
	policy: ReferencePolicy,
	is_emitted: impl Fn(&ModulePath) -> bool,
	registry: &mut ExternalRegistry,
	document: &mut OutputDocument,
) -> AmalgamResult<()> {
	for line in read_lines(path)? {
		match syntax.classify(&line) {
			LineKind::InternalReference(reference) => {
				if policy == ReferencePolicy::Strict && !is_emitted(&ModulePath::new(reference)) {
					return Err(AmalgamError::UnresolvedReference {
						path: path.display().to_string(),
						reference: reference.to_string(),
					});
				}
			}
			LineKind::ExternalDependency(identifier) => {
				if registry.register(identifier) {
					document.push(line);
				}
			}
			LineKind::GuardOpener | LineKind::Endif | LineKind::Text => document.push(line),
		}
	}

	tracing::debug!(path = %path.display(), "merged implementation file");
	Ok(())
}
