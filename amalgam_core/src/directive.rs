use crate::lexer::Token;
use crate::lexer::lex_directive;

/// How a single source line takes part in amalgamation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineKind<'a> {
	/// `#include <lib/...>`: a reference to another module of the library.
	/// Holds the path between the delimiters.
	InternalReference(&'a str),
	/// Any other `#include`. Holds the path between the delimiters.
	ExternalDependency(&'a str),
	/// `#ifndef LIB_..._HPP` or `#define LIB_..._HPP`.
	GuardOpener,
	/// `#endif`.
	Endif,
	/// Everything else.
	Text,
}

/// The naming conventions that identify internal references and include
/// guards for one library.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirectiveSyntax {
	library: String,
	library_prefix: String,
	guard_prefix: String,
	guard_suffix: String,
}

impl DirectiveSyntax {
	/// Build the syntax for `library` with the given guard suffix (e.g. `HPP`).
	pub fn new(library: &str, guard_suffix: &str) -> Self {
		let library = library.trim_matches('/').to_string();
		Self {
			library_prefix: format!("{library}/"),
			guard_prefix: format!("{}_", library.to_ascii_uppercase()),
			guard_suffix: format!("_{}", guard_suffix.to_ascii_uppercase()),
			library,
		}
	}

	pub fn library(&self) -> &str {
		&self.library
	}

	/// The symbol guarding the whole amalgamated document for `module`, e.g.
	/// `ALIA_CORE_HPP`.
	pub fn document_guard(&self, module: &str) -> String {
		format!(
			"{}{}{}",
			self.guard_prefix,
			module.to_ascii_uppercase(),
			self.guard_suffix
		)
	}

	/// The symbol consumers define to compile the implementation section, e.g.
	/// `ALIA_IMPLEMENTATION`.
	pub fn implementation_gate(&self) -> String {
		format!("{}IMPLEMENTATION", self.guard_prefix)
	}

	/// Check whether `path` (as written between include delimiters) points
	/// into this library.
	///
	/// Internal paths are limited to ASCII letters, digits and `/_.-`, with
	/// `\` read as `/`. Anything else is left to the compiler.
	pub fn is_internal(&self, path: &str) -> bool {
		let path = path.replace('\\', "/");
		path.starts_with(&self.library_prefix)
			&& path
				.chars()
				.all(|ch| ch.is_ascii_alphanumeric() || matches!(ch, '/' | '_' | '.' | '-'))
	}

	fn is_guard_symbol(&self, symbol: &str) -> bool {
		let Some(middle) = symbol
			.strip_prefix(&self.guard_prefix)
			.and_then(|rest| rest.strip_suffix(&self.guard_suffix))
		else {
			return false;
		};

		!middle.is_empty()
			&& middle
				.chars()
				.all(|ch| ch.is_ascii_uppercase() || ch.is_ascii_digit() || ch == '_')
	}

	/// Classify a line.
	pub fn classify<'a>(&self, line: &'a str) -> LineKind<'a> {
		let Some(tokens) = lex_directive(line) else {
			return LineKind::Text;
		};

		match tokens.as_slice() {
			[Token::Hash, Token::Ident("include"), Token::Path(path), ..] => {
				if self.is_internal(path) {
					LineKind::InternalReference(path)
				} else {
					LineKind::ExternalDependency(path)
				}
			}
			[Token::Hash, Token::Ident("ifndef" | "define"), Token::Ident(symbol), ..]
				if self.is_guard_symbol(symbol) =>
			{
				LineKind::GuardOpener
			}
			[Token::Hash, Token::Ident("endif")] => LineKind::Endif,
			_ => LineKind::Text,
		}
	}
}
