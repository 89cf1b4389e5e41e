//! Directory enumeration filtered by kind and mask.
//!
//! [`DirectoryEnumerator::list`] walks the immediate children of a directory
//! and writes every entry that passes both the [`DirMode`] kind filter and the
//! [`Mask`] into a [`ByteBuffer`], each name followed by the caller's
//! delimiter:
//!
//! ```text
//! name1<delim>name2<delim>...<terminator>
//! ```
//!
//! The native iteration mechanism lives behind [`DirBackend`], with one
//! implementation per operating system selected at compile time. Everything
//! observable (filtering, ordering, output format, errors) is decided here so
//! the backends only report names and kinds.

use std::io;
use std::ops::{BitOr, BitOrAssign};
use std::path::{Path, PathBuf};

use miette::Diagnostic as MietteDiagnostic;
use thiserror::Error;

use crate::core::buffer::{BufferError, ByteBuffer};
use crate::core::mask::Mask;
use crate::util::diagnostic::{suggestions, Diagnostic};

#[cfg(unix)]
mod unix;
#[cfg(windows)]
mod windows;

#[cfg(unix)]
pub use unix::UnixBackend as NativeBackend;
#[cfg(windows)]
pub use windows::WindowsBackend as NativeBackend;

#[cfg(not(any(unix, windows)))]
compile_error!("no directory backend for this platform; only unix and windows are supported");

/// Which entry kinds a listing includes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DirMode(u8);

impl DirMode {
    /// Lists nothing.
    pub const NONE: DirMode = DirMode(0);
    /// Regular files.
    pub const FILES: DirMode = DirMode(1);
    /// Directories.
    pub const DIRS: DirMode = DirMode(1 << 1);
    /// Files and directories.
    pub const ALL: DirMode = DirMode(Self::FILES.0 | Self::DIRS.0);

    pub fn from_flags(files: bool, dirs: bool) -> Self {
        let mut mode = DirMode::NONE;
        if files {
            mode |= DirMode::FILES;
        }
        if dirs {
            mode |= DirMode::DIRS;
        }
        mode
    }

    pub fn bits(self) -> u8 {
        self.0
    }

    pub fn contains(self, other: DirMode) -> bool {
        self.0 & other.0 == other.0
    }

    /// Whether an entry of `kind` passes this filter.
    pub fn admits(self, kind: EntryKind) -> bool {
        match kind {
            EntryKind::File => self.contains(DirMode::FILES),
            EntryKind::Dir => self.contains(DirMode::DIRS),
            EntryKind::Other => false,
        }
    }
}

impl BitOr for DirMode {
    type Output = DirMode;

    fn bitor(self, rhs: DirMode) -> DirMode {
        DirMode(self.0 | rhs.0)
    }
}

impl BitOrAssign for DirMode {
    fn bitor_assign(&mut self, rhs: DirMode) {
        self.0 |= rhs.0;
    }
}

/// Entry classification reported by a backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryKind {
    File,
    Dir,
    /// Special files, dangling symlinks and anything whose metadata could not
    /// be read. Never listed.
    Other,
}

/// One child entry as reported by a backend.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawEntry {
    pub name: String,
    pub kind: EntryKind,
}

impl RawEntry {
    pub fn new(name: impl Into<String>, kind: EntryKind) -> Self {
        RawEntry {
            name: name.into(),
            kind,
        }
    }
}

/// Native directory iteration.
///
/// `open` returns an iterator over the immediate children of `path`. The
/// iteration handle is released when the iterator is dropped. Backends may
/// report the `.` and `..` pseudo-entries; they are filtered out by the
/// enumerator.
pub trait DirBackend {
    type Entries: Iterator<Item = io::Result<RawEntry>>;

    /// Short backend name for logs.
    fn name(&self) -> &'static str;

    fn open(&self, path: &Path) -> io::Result<Self::Entries>;
}

/// Errors from directory enumeration.
#[derive(Debug, Error, MietteDiagnostic)]
pub enum FsError {
    #[error("failed to open path `{}`", path.display())]
    #[diagnostic(code(cbuild::fs::open_failed))]
    OpenFailed {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to read entries of `{}`", path.display())]
    #[diagnostic(code(cbuild::fs::read_failed))]
    ReadFailed {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error(transparent)]
    #[diagnostic(code(cbuild::fs::buffer))]
    Buffer(#[from] BufferError),
}

impl FsError {
    /// Convert to a user-friendly diagnostic, tagged with the error code.
    pub fn to_diagnostic(&self) -> Diagnostic {
        let diagnostic = match self {
            FsError::OpenFailed { path, source } => {
                Diagnostic::error(format!("failed to open path `{}`", path.display()))
                    .with_context(source.to_string())
                    .with_location(path)
                    .with_suggestion(suggestions::CHECK_PATH)
            }
            FsError::ReadFailed { path, source } => {
                Diagnostic::error(format!("failed to read entries of `{}`", path.display()))
                    .with_context(source.to_string())
                    .with_location(path)
            }
            FsError::Buffer(e) => Diagnostic::error(e.to_string()),
        };

        match MietteDiagnostic::code(self) {
            Some(code) => diagnostic.with_context(format!("code: {code}")),
            None => diagnostic,
        }
    }
}

/// Lists directory children through a [`DirBackend`].
#[derive(Debug, Clone, Default)]
pub struct DirectoryEnumerator<B = NativeBackend> {
    backend: B,
}

impl DirectoryEnumerator<NativeBackend> {
    /// Enumerator for the current platform.
    pub fn new() -> Self {
        DirectoryEnumerator {
            backend: NativeBackend::default(),
        }
    }
}

impl<B: DirBackend> DirectoryEnumerator<B> {
    pub fn with_backend(backend: B) -> Self {
        DirectoryEnumerator { backend }
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    /// List the entries of `path` that pass `mode` and `mask`.
    ///
    /// Names are sorted bytewise and each is followed by `delimiter`. A
    /// directory with no matching entries yields an empty buffer. If `path`
    /// cannot be opened the result is [`FsError::OpenFailed`]; a failure part
    /// way through iteration is [`FsError::ReadFailed`]. No partial listing is
    /// ever returned.
    pub fn list(
        &self,
        path: impl AsRef<Path>,
        mask: &Mask,
        mode: DirMode,
        delimiter: &str,
    ) -> Result<ByteBuffer, FsError> {
        let path = normalize_dir_path(path.as_ref());

        let entries = match self.backend.open(&path) {
            Ok(entries) => entries,
            Err(source) => {
                tracing::warn!("failed to open path {}: {}", path.display(), source);
                return Err(FsError::OpenFailed { path, source });
            }
        };

        let mut names = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|source| FsError::ReadFailed {
                path: path.clone(),
                source,
            })?;

            if entry.name == "." || entry.name == ".." {
                continue;
            }
            if !mode.admits(entry.kind) {
                tracing::trace!("skipping {} ({:?})", entry.name, entry.kind);
                continue;
            }
            if !mask.matches(&entry.name) {
                continue;
            }
            names.push(entry.name);
        }

        names.sort_unstable();
        tracing::debug!(
            "{}: {} entr(ies) match {} ({} backend)",
            path.display(),
            names.len(),
            mask,
            self.backend.name()
        );

        let mut output = ByteBuffer::empty()?;
        for name in &names {
            output.append_str(name)?.append_str(delimiter)?;
        }

        Ok(output)
    }
}

/// List `path` with the native backend.
pub fn list(
    path: impl AsRef<Path>,
    mask: &str,
    mode: DirMode,
    delimiter: &str,
) -> Result<ByteBuffer, FsError> {
    DirectoryEnumerator::new().list(path, &Mask::parse(mask), mode, delimiter)
}

/// Normalize a directory path: drop trailing separators and redundant `.`
/// components after the first; an empty path is the current directory.
pub fn normalize_dir_path(path: &Path) -> PathBuf {
    let normalized: PathBuf = path.components().collect();
    if normalized.as_os_str().is_empty() {
        PathBuf::from(".")
    } else {
        normalized
    }
}

/// Convert a native entry name to UTF-8.
///
/// Names that are not valid UTF-8 cannot be written back as a path that
/// exists, so they are left out of listings.
pub(crate) fn entry_name(name: std::ffi::OsString) -> Option<String> {
    match name.into_string() {
        Ok(name) => Some(name),
        Err(raw) => {
            tracing::warn!("skipping entry with non-UTF-8 name {:?}", raw);
            None
        }
    }
}
