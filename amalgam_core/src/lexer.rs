use logos::Logos;

/// Raw tokens produced by logos for a single preprocessor line.
#[derive(Logos, Debug, PartialEq)]
#[logos(skip r"[ \t\r\x0c]+")]
enum RawToken {
	#[token("#")]
	Hash,
	#[token("/")]
	Slash,
	#[regex(r"[a-zA-Z_][a-zA-Z0-9_]*")]
	Ident,
	#[regex(r"<[^>\n]*>")]
	AnglePath,
	#[regex(r#""[^"\n]*""#)]
	QuotedPath,
}

/// The significant tokens of a directive line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Token<'a> {
	/// `#`
	Hash,
	/// An identifier, e.g. `include` or `ALIA_FLOW_HPP`.
	Ident(&'a str),
	/// The inside of `<...>` or `"..."`.
	Path(&'a str),
	/// Anything the lexer does not understand, e.g. `(` or `1`.
	Other,
}

/// Tokenize a line that starts (after whitespace) with `#`.
///
/// Returns `None` for lines that can't be directives. Lexing stops at the
/// first `/`, which is where a trailing `//` or `/* */` comment begins (paths
/// are lexed as a whole, so their slashes never reach this point).
pub fn lex_directive(line: &str) -> Option<Vec<Token<'_>>> {
	if !line.trim_start().starts_with('#') {
		return None;
	}

	let mut tokens = Vec::new();
	let mut lexer = RawToken::lexer(line);

	while let Some(raw) = lexer.next() {
		let slice = lexer.slice();
		let token = match raw {
			Ok(RawToken::Hash) => Token::Hash,
			Ok(RawToken::Slash) => break,
			Ok(RawToken::Ident) => Token::Ident(slice),
			Ok(RawToken::AnglePath | RawToken::QuotedPath) => Token::Path(&slice[1..slice.len() - 1]),
			Err(()) => Token::Other,
		};
		tokens.push(token);
	}

	Some(tokens)
}
