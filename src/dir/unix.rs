//! Directory backend for Unix-like systems.
//!
//! Iterates with `readdir` (through `std::fs::read_dir`) and classifies each
//! entry from the `st_mode` file-type bits of `stat`, following symlinks.

use std::fs::{self, ReadDir};
use std::io;
use std::os::unix::fs::MetadataExt;
use std::path::Path;

use super::{entry_name, DirBackend, EntryKind, RawEntry};

const S_IFMT: u32 = 0o170000;
const S_IFDIR: u32 = 0o040000;
const S_IFREG: u32 = 0o100000;

#[derive(Debug, Clone, Copy, Default)]
pub struct UnixBackend;

impl DirBackend for UnixBackend {
    type Entries = UnixEntries;

    fn name(&self) -> &'static str {
        "unix"
    }

    fn open(&self, path: &Path) -> io::Result<UnixEntries> {
        Ok(UnixEntries {
            inner: fs::read_dir(path)?,
        })
    }
}

/// Open `readdir` handle; closed on drop.
#[derive(Debug)]
pub struct UnixEntries {
    inner: ReadDir,
}

impl Iterator for UnixEntries {
    type Item = io::Result<RawEntry>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let entry = match self.inner.next()? {
                Ok(entry) => entry,
                Err(e) => return Some(Err(e)),
            };

            let Some(name) = entry_name(entry.file_name()) else {
                continue;
            };

            let kind = match fs::metadata(entry.path()) {
                Ok(meta) => kind_from_mode(meta.mode()),
                Err(e) => {
                    tracing::debug!("cannot stat {}: {}", entry.path().display(), e);
                    EntryKind::Other
                }
            };

            return Some(Ok(RawEntry { name, kind }));
        }
    }
}

fn kind_from_mode(mode: u32) -> EntryKind {
    match mode & S_IFMT {
        S_IFDIR => EntryKind::Dir,
        S_IFREG => EntryKind::File,
        _ => EntryKind::Other,
    }
}
