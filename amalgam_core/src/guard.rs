use crate::AmalgamError;
use crate::AmalgamResult;
use crate::DirectiveSyntax;
use crate::LineKind;

/// Remove the include guard from a module's lines.
///
/// Trailing blank lines are dropped and the last remaining line must be the
/// guard's `#endif`, which is removed too. Guard openers are filtered out
/// wherever they appear. `path` is only used for the error message.
pub fn strip_guard(
	path: &str,
	mut lines: Vec<String>,
	syntax: &DirectiveSyntax,
) -> AmalgamResult<Vec<String>> {
	while lines.last().is_some_and(|line| line.trim().is_empty()) {
		lines.pop();
	}

	let closed = lines
		.last()
		.is_some_and(|last| syntax.classify(last) == LineKind::Endif);
	if !closed {
		return Err(AmalgamError::MalformedModule {
			path: path.to_string(),
		});
	}
	lines.pop();

	lines.retain(|line| syntax.classify(line) != LineKind::GuardOpener);
	Ok(lines)
}
