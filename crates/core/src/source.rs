//! Read access to package content.

use std::collections::BTreeMap;
use std::io;
use std::path::PathBuf;

use basalt_modid::ModId;

/// Read-only view of a package's content tree.
///
/// Paths are `/`-separated and relative to the package root, e.g.
/// `Entries/widgets.json`. Listings must be deterministic: implementations
/// return file names in sorted order so loads reproduce across runs.
pub trait PackSource: Send + Sync {
	/// True if the package has the given directory.
	fn dir_exists(&self, pack: &ModId, dir: &str) -> bool;
	/// File names (not paths) directly under `dir`, sorted.
	fn list_files(&self, pack: &ModId, dir: &str) -> io::Result<Vec<String>>;
	/// A file's contents as UTF-8.
	fn read_to_string(&self, pack: &ModId, path: &str) -> io::Result<String>;
}

/// Serves packages from directories under one root: `<root>/<pack id>/...`.
#[derive(Debug, Clone)]
pub struct DirPackSource {
	root: PathBuf,
}

impl DirPackSource {
	pub fn new(root: impl Into<PathBuf>) -> Self {
		Self { root: root.into() }
	}

	fn pack_path(&self, pack: &ModId, rel: &str) -> PathBuf {
		self.root.join(pack.as_str()).join(rel)
	}
}

impl PackSource for DirPackSource {
	fn dir_exists(&self, pack: &ModId, dir: &str) -> bool {
		self.pack_path(pack, dir).is_dir()
	}

	fn list_files(&self, pack: &ModId, dir: &str) -> io::Result<Vec<String>> {
		let mut names = Vec::new();
		for entry in std::fs::read_dir(self.pack_path(pack, dir))? {
			let entry = entry?;
			if !entry.file_type()?.is_file() {
				continue;
			}
			// Non-UTF-8 names cannot become keys; skip them.
			if let Ok(name) = entry.file_name().into_string() {
				names.push(name);
			}
		}
		names.sort();
		Ok(names)
	}

	fn read_to_string(&self, pack: &ModId, path: &str) -> io::Result<String> {
		std::fs::read_to_string(self.pack_path(pack, path))
	}
}

/// In-memory packs, for tests and embedded content.
///
/// Directories exist implicitly: a directory is present exactly when some
/// file lives under it.
#[derive(Debug, Clone, Default)]
pub struct MemPackSource {
	packs: BTreeMap<String, BTreeMap<String, String>>,
}

impl MemPackSource {
	pub fn new() -> Self {
		Self::default()
	}

	/// Adds one file; chainable for building fixtures.
	pub fn with_file(
		mut self,
		pack: &ModId,
		path: impl Into<String>,
		contents: impl Into<String>,
	) -> Self {
		self.insert(pack, path, contents);
		self
	}

	pub fn insert(&mut self, pack: &ModId, path: impl Into<String>, contents: impl Into<String>) {
		self.packs
			.entry(pack.as_str().to_owned())
			.or_default()
			.insert(path.into(), contents.into());
	}
}

impl PackSource for MemPackSource {
	fn dir_exists(&self, pack: &ModId, dir: &str) -> bool {
		let Some(files) = self.packs.get(pack.as_str()) else {
			return false;
		};
		let prefix = format!("{dir}/");
		files.keys().any(|path| path.starts_with(&prefix))
	}

	fn list_files(&self, pack: &ModId, dir: &str) -> io::Result<Vec<String>> {
		let files = self
			.packs
			.get(pack.as_str())
			.ok_or_else(|| io::Error::new(io::ErrorKind::NotFound, format!("no pack `{pack}`")))?;
		let prefix = format!("{dir}/");
		// BTreeMap iteration keeps the listing sorted.
		Ok(files
			.keys()
			.filter_map(|path| path.strip_prefix(&prefix))
			.filter(|rest| !rest.contains('/'))
			.map(str::to_owned)
			.collect())
	}

	fn read_to_string(&self, pack: &ModId, path: &str) -> io::Result<String> {
		self.packs
			.get(pack.as_str())
			.and_then(|files| files.get(path))
			.cloned()
			.ok_or_else(|| {
				io::Error::new(io::ErrorKind::NotFound, format!("no file `{path}` in pack `{pack}`"))
			})
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	fn base() -> ModId {
		ModId::parse("Base").unwrap()
	}

	#[test]
	fn mem_source_lists_direct_children_sorted() {
		let source = MemPackSource::new()
			.with_file(&base(), "Entries/b.json", "{}")
			.with_file(&base(), "Entries/a.json", "{}")
			.with_file(&base(), "Entries/nested/c.json", "{}");

		assert!(source.dir_exists(&base(), "Entries"));
		assert!(source.dir_exists(&base(), "Entries/nested"));
		assert!(!source.dir_exists(&base(), "Locales"));
		assert_eq!(
			source.list_files(&base(), "Entries").unwrap(),
			vec!["a.json".to_owned(), "b.json".to_owned()]
		);
	}

	#[test]
	fn mem_source_read_miss_is_not_found() {
		let source = MemPackSource::new();
		let error = source.read_to_string(&base(), "Entries/a.json").unwrap_err();
		assert_eq!(error.kind(), io::ErrorKind::NotFound);
	}

	#[test]
	fn dir_source_round_trip() {
		let root = tempfile::tempdir().unwrap();
		let entries = root.path().join("Base").join("Entries");
		std::fs::create_dir_all(&entries).unwrap();
		std::fs::write(entries.join("widgets.json"), "{\"a\": 1}").unwrap();
		std::fs::write(entries.join("armors.json"), "{}").unwrap();
		std::fs::create_dir(entries.join("sub")).unwrap();

		let source = DirPackSource::new(root.path());
		assert!(source.dir_exists(&base(), "Entries"));
		assert!(!source.dir_exists(&base(), "Locales"));
		// Directories are not listed, and names come back sorted.
		assert_eq!(
			source.list_files(&base(), "Entries").unwrap(),
			vec!["armors.json".to_owned(), "widgets.json".to_owned()]
		);
		assert_eq!(
			source.read_to_string(&base(), "Entries/widgets.json").unwrap(),
			"{\"a\": 1}"
		);
	}

	#[test]
	fn dir_source_missing_dir_errors() {
		let root = tempfile::tempdir().unwrap();
		let source = DirPackSource::new(root.path());
		assert!(source.list_files(&base(), "Entries").is_err());
	}
}
