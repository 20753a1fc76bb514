use chrono::DateTime;
use chrono::SecondsFormat;
use chrono::Utc;

use crate::ProvenanceConfig;

/// Version and generation time recorded in the document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Provenance {
	version: String,
	generated_at: DateTime<Utc>,
}

impl Provenance {
	pub fn new(version: impl Into<String>, generated_at: DateTime<Utc>) -> Self {
		Self {
			version: version.into(),
			generated_at,
		}
	}

	/// Read the tag, branch and commit from the environment variables named
	/// in `config` and stamp the current time.
	pub fn from_env(config: &ProvenanceConfig) -> Self {
		Self::from_lookup(config, |name| std::env::var(name).ok(), Utc::now())
	}

	/// Like [`Provenance::from_env`] with a custom variable lookup and clock.
	pub fn from_lookup(
		config: &ProvenanceConfig,
		lookup: impl Fn(&str) -> Option<String>,
		generated_at: DateTime<Utc>,
	) -> Self {
		let read = |name: &str| lookup(name).filter(|value| !value.trim().is_empty());
		let version = version_descriptor(
			read(&config.tag_env).as_deref(),
			read(&config.branch_env).as_deref(),
			read(&config.commit_env).as_deref(),
		);
		Self::new(version, generated_at)
	}

	pub fn version(&self) -> &str {
		&self.version
	}

	pub fn generated_at(&self) -> DateTime<Utc> {
		self.generated_at
	}

	/// The single comment line written into the document named `file_name`,
	/// e.g. `// alia.hpp v1.2.0 (4f2a9c1), generated 2024-05-01T09:30:00+00:00`.
	pub fn stamp(&self, file_name: &str) -> String {
		format!(
			"// {file_name} {}, generated {}",
			self.version,
			self.generated_at.to_rfc3339_opts(SecondsFormat::Secs, false)
		)
	}
}

/// Describe the version being built: a tag wins over a branch, and without
/// either the build is `(local)`.
pub fn version_descriptor(tag: Option<&str>, branch: Option<&str>, commit: Option<&str>) -> String {
	let with_commit = |label: String| {
		match commit {
			Some(commit) => format!("{label} ({commit})"),
			None => label,
		}
	};

	match (tag, branch) {
		(Some(tag), _) => with_commit(tag.to_string()),
		(None, Some(branch)) => with_commit(format!("{branch} branch")),
		(None, None) => "(local)".to_string(),
	}
}
