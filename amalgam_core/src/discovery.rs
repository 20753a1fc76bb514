use std::collections::HashSet;
use std::path::Path;
use std::path::PathBuf;

use globset::Glob;
use globset::GlobSet;
use globset::GlobSetBuilder;
use ignore::gitignore::Gitignore;
use ignore::gitignore::GitignoreBuilder;

use crate::AmalgamError;
use crate::AmalgamResult;

/// Which files under a root take part in a run.
#[derive(Debug, Clone)]
pub struct FileFilter {
	patterns: GlobSet,
	exclude: Gitignore,
}

impl FileFilter {
	/// Build a filter from glob `patterns` (matched against the path relative
	/// to the walked root) and gitignore-style `exclude_patterns` (relative to
	/// `project_root`).
	pub fn new(
		project_root: &Path,
		patterns: &[String],
		exclude_patterns: &[String],
	) -> AmalgamResult<Self> {
		Ok(Self {
			patterns: build_glob_set(patterns)?,
			exclude: build_exclude_matcher(project_root, exclude_patterns)?,
		})
	}

	fn is_excluded(&self, path: &Path, is_dir: bool) -> bool {
		self.exclude.matched(path, is_dir).is_ignore()
	}
}

/// Build a `GlobSet` from a list of glob pattern strings.
fn build_glob_set(patterns: &[String]) -> AmalgamResult<GlobSet> {
	let mut builder = GlobSetBuilder::new();
	for pattern in patterns {
		let glob = Glob::new(pattern).map_err(|e| {
			AmalgamError::ConfigParse(format!("invalid file pattern `{pattern}`: {e}"))
		})?;
		builder.add(glob);
	}
	builder
		.build()
		.map_err(|e| AmalgamError::ConfigParse(format!("failed to build file patterns: {e}")))
}

/// Build a `Gitignore` matcher from `[exclude]` patterns in `amalgam.toml`.
fn build_exclude_matcher(root: &Path, patterns: &[String]) -> AmalgamResult<Gitignore> {
	let mut builder = GitignoreBuilder::new(root);
	for pattern in patterns {
		builder.add_line(None, pattern).map_err(|e| {
			AmalgamError::ConfigParse(format!("invalid exclude pattern `{pattern}`: {e}"))
		})?;
	}
	builder
		.build()
		.map_err(|e| AmalgamError::ConfigParse(format!("failed to build exclude rules: {e}")))
}

/// Collect every file under `root` accepted by `filter`, sorted by their
/// `/`-separated path relative to `root` so the order is the same on every
/// platform.
pub fn collect_files(root: &Path, filter: &FileFilter) -> AmalgamResult<Vec<PathBuf>> {
	if !root.is_dir() {
		return Err(AmalgamError::io(
			root,
			std::io::Error::new(std::io::ErrorKind::NotFound, "directory not found"),
		));
	}

	let mut files = Vec::new();
	let mut visited_dirs = HashSet::new();
	walk_dir(root, root, filter, &mut files, &mut visited_dirs)?;

	let mut keyed: Vec<(String, PathBuf)> = files
		.into_iter()
		.map(|file| (sort_key(root, &file), file))
		.collect();
	keyed.sort_by(|a, b| a.0.cmp(&b.0));

	Ok(keyed.into_iter().map(|(_, file)| file).collect())
}

fn sort_key(root: &Path, file: &Path) -> String {
	file.strip_prefix(root)
		.unwrap_or(file)
		.to_string_lossy()
		.replace('\\', "/")
}

fn walk_dir(
	root: &Path,
	dir: &Path,
	filter: &FileFilter,
	files: &mut Vec<PathBuf>,
	visited_dirs: &mut HashSet<PathBuf>,
) -> AmalgamResult<()> {
	// Detect symlink cycles by tracking canonical paths.
	let canonical = dir.canonicalize().unwrap_or_else(|_| dir.to_path_buf());
	if !visited_dirs.insert(canonical) {
		return Err(AmalgamError::SymlinkCycle {
			path: dir.display().to_string(),
		});
	}

	let entries = std::fs::read_dir(dir).map_err(|e| AmalgamError::io(dir, e))?;

	for entry in entries {
		let entry = entry.map_err(|e| AmalgamError::io(dir, e))?;
		let path = entry.path();

		if path
			.file_name()
			.and_then(|n| n.to_str())
			.is_some_and(|name| name.starts_with('.'))
		{
			continue;
		}

		let is_dir = path.is_dir();
		if filter.is_excluded(&path, is_dir) {
			continue;
		}

		if is_dir {
			walk_dir(root, &path, filter, files, visited_dirs)?;
		} else if path
			.strip_prefix(root)
			.is_ok_and(|relative| filter.patterns.is_match(relative))
		{
			files.push(path);
		}
	}

	Ok(())
}

/// Normalize CRLF line endings to LF.
pub fn normalize_line_endings(content: &str) -> String {
	if content.contains('\r') {
		content.replace("\r\n", "\n").replace('\r', "\n")
	} else {
		content.to_string()
	}
}

/// Read a text file into lines without their terminators.
pub fn read_lines(path: &Path) -> AmalgamResult<Vec<String>> {
	let content = std::fs::read_to_string(path).map_err(|e| AmalgamError::io(path, e))?;
	Ok(normalize_line_endings(&content)
		.lines()
		.map(ToString::to_string)
		.collect())
}
