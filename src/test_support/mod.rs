//! Test utilities and mocks for cbuild unit tests.
//!
//! [`MockDirBackend`] is an in-memory [`DirBackend`] so enumeration can be
//! tested without touching the real filesystem, including read failures that
//! a real directory cannot be made to produce on demand.
//!
//! # Example
//!
//! ```rust,ignore
//! use cbuild::test_support::MockDirBackend;
//!
//! #[test]
//! fn test_example() {
//!     let mut backend = MockDirBackend::new();
//!     backend.add_file("/virtual/a.c");
//!
//!     let enumerator = DirectoryEnumerator::with_backend(backend);
//!     // Use the enumerator in tests...
//! }
//! ```

pub mod fixtures;

use std::collections::{HashMap, HashSet};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use crate::dir::{normalize_dir_path, DirBackend, EntryKind, RawEntry};

// Re-export fixtures for convenience
pub use fixtures::*;

/// Names in [`sample_tree`], in listing order.
pub const SAMPLE_ENTRIES: [&str; 5] = [".hidden", "README", "a.c", "b.cpp", "sub"];

/// Create the sample tree under `root`: files `a.c`, `b.cpp`, `.hidden`,
/// `README` and the directory `sub`.
pub fn sample_tree(root: &Path) {
    for file in ["a.c", "b.cpp", ".hidden", "README"] {
        fs::write(root.join(file), file).unwrap();
    }
    fs::create_dir(root.join("sub")).unwrap();
    fs::write(root.join("sub/inner.c"), "").unwrap();
}

/// In-memory directory backend.
///
/// Entries are reported in insertion order; the enumerator is responsible
/// for sorting.
#[derive(Debug, Clone, Default)]
pub struct MockDirBackend {
    dirs: HashMap<PathBuf, Vec<RawEntry>>,
    failing: HashSet<PathBuf>,
}

impl MockDirBackend {
    /// Create a new empty mock backend.
    pub fn new() -> Self {
        Self::default()
    }

    /// The same tree as [`sample_tree`], rooted at `root`.
    pub fn sample(root: &Path) -> Self {
        let mut backend = Self::new();
        // reverse order so the enumerator has to sort
        for file in ["README", ".hidden", "b.cpp", "a.c"] {
            backend.add_file(root.join(file));
        }
        backend.add_dir(root.join("sub"));
        backend.add_file(root.join("sub/inner.c"));
        backend
    }

    /// Add a regular file.
    pub fn add_file(&mut self, path: impl AsRef<Path>) {
        self.add_child(path.as_ref(), EntryKind::File);
    }

    /// Add a directory, which can then be opened.
    pub fn add_dir(&mut self, path: impl AsRef<Path>) {
        let path = normalize_dir_path(path.as_ref());
        self.dirs.entry(path.clone()).or_default();
        self.add_child(&path, EntryKind::Dir);
    }

    /// Add a raw entry to `dir`, creating `dir` if needed.
    pub fn add_entry(&mut self, dir: impl AsRef<Path>, entry: RawEntry) {
        self.dirs
            .entry(normalize_dir_path(dir.as_ref()))
            .or_default()
            .push(entry);
    }

    /// Make iteration of `dir` fail after its first entry.
    pub fn fail_reading(&mut self, dir: impl AsRef<Path>) {
        self.failing.insert(normalize_dir_path(dir.as_ref()));
    }

    fn add_child(&mut self, path: &Path, kind: EntryKind) {
        if let (Some(parent), Some(name)) = (path.parent(), path.file_name()) {
            self.add_entry(parent, RawEntry::new(name.to_string_lossy(), kind));
        }
    }
}

impl DirBackend for MockDirBackend {
    type Entries = std::vec::IntoIter<io::Result<RawEntry>>;

    fn name(&self) -> &'static str {
        "mock"
    }

    fn open(&self, path: &Path) -> io::Result<Self::Entries> {
        let path = normalize_dir_path(path);
        let entries = self.dirs.get(&path).ok_or_else(|| {
            io::Error::new(io::ErrorKind::NotFound, format!("{} not found", path.display()))
        })?;

        let mut results: Vec<io::Result<RawEntry>> =
            entries.iter().cloned().map(Ok).collect();
        if self.failing.contains(&path) {
            results.truncate(1);
            results.push(Err(io::Error::new(
                io::ErrorKind::Other,
                "simulated read failure",
            )));
        }

        Ok(results.into_iter())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mock_open_unknown_path() {
        let backend = MockDirBackend::new();
        let err = backend.open(Path::new("/nowhere")).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::NotFound);
    }

    #[test]
    fn test_mock_nested_dirs() {
        let mut backend = MockDirBackend::new();
        backend.add_dir("/v/code/net");
        backend.add_file("/v/code/net/net.cpp");

        let names: Vec<_> = backend
            .open(Path::new("/v/code/net/"))
            .unwrap()
            .map(|e| e.unwrap().name)
            .collect();
        assert_eq!(names, vec!["net.cpp"]);

        let code: Vec<_> = backend
            .open(Path::new("/v/code"))
            .unwrap()
            .map(|e| e.unwrap())
            .collect();
        assert_eq!(code, vec![RawEntry::new("net", EntryKind::Dir)]);
    }

    #[test]
    fn test_mock_fail_reading() {
        let mut backend = MockDirBackend::new();
        backend.add_file("/v/a.c");
        backend.add_file("/v/b.c");
        backend.fail_reading("/v");

        let results: Vec<_> = backend.open(Path::new("/v")).unwrap().collect();
        assert_eq!(results.len(), 2);
        assert!(results[0].is_ok());
        assert!(results[1].is_err());
    }
}
