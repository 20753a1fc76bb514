use std::collections::HashSet;

/// External dependencies seen during one run, in first-seen order.
///
/// The registry only grows. Callers emit a dependency's line exactly when
/// [`ExternalRegistry::register`] returns `true`.
#[derive(Debug, Default)]
pub struct ExternalRegistry {
	seen: HashSet<String>,
	order: Vec<String>,
}

impl ExternalRegistry {
	pub fn new() -> Self {
		Self::default()
	}

	/// Record `identifier`, returning `true` only the first time it is seen.
	pub fn register(&mut self, identifier: &str) -> bool {
		if self.seen.contains(identifier) {
			tracing::trace!(identifier, "external dependency already emitted");
			return false;
		}

		self.seen.insert(identifier.to_string());
		self.order.push(identifier.to_string());
		true
	}

	pub fn contains(&self, identifier: &str) -> bool {
		self.seen.contains(identifier)
	}

	/// Dependencies in the order they were first registered.
	pub fn dependencies(&self) -> &[String] {
		&self.order
	}

	pub fn len(&self) -> usize {
		self.order.len()
	}

	pub fn is_empty(&self) -> bool {
		self.order.is_empty()
	}

	pub fn into_dependencies(self) -> Vec<String> {
		self.order
	}
}
