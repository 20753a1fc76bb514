use derive_more::Deref;

/// The amalgamated document, built line by line.
///
/// Lines are only ever appended; nothing already pushed is modified or
/// reordered.
#[derive(Debug, Default, Clone, PartialEq, Eq, Deref)]
pub struct OutputDocument {
	lines: Vec<String>,
}

impl OutputDocument {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn push(&mut self, line: impl Into<String>) {
		self.lines.push(line.into());
	}

	pub fn push_blank(&mut self) {
		self.lines.push(String::new());
	}

	/// Render the document with `\n` line endings and a trailing newline.
	pub fn render(&self) -> String {
		let capacity = self.lines.iter().map(|line| line.len() + 1).sum();
		let mut text = String::with_capacity(capacity);
		for line in &self.lines {
			text.push_str(line);
			text.push('\n');
		}
		text
	}
}
