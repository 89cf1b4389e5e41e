//! Directory backend for Windows.
//!
//! Iterates with `FindFirstFileW`/`FindNextFileW` (through
//! `std::fs::read_dir`) and classifies each entry from its
//! `FILE_ATTRIBUTE_*` bits, following reparse points.

use std::fs::{self, ReadDir};
use std::io;
use std::os::windows::fs::MetadataExt;
use std::path::Path;

use super::{entry_name, DirBackend, EntryKind, RawEntry};

const FILE_ATTRIBUTE_DIRECTORY: u32 = 0x10;
const FILE_ATTRIBUTE_DEVICE: u32 = 0x40;

#[derive(Debug, Clone, Copy, Default)]
pub struct WindowsBackend;

impl DirBackend for WindowsBackend {
    type Entries = WindowsEntries;

    fn name(&self) -> &'static str {
        "windows"
    }

    fn open(&self, path: &Path) -> io::Result<WindowsEntries> {
        Ok(WindowsEntries {
            inner: fs::read_dir(path)?,
        })
    }
}

/// Open find handle; closed on drop.
#[derive(Debug)]
pub struct WindowsEntries {
    inner: ReadDir,
}

impl Iterator for WindowsEntries {
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
                Ok(meta) => kind_from_attributes(meta.file_attributes()),
                Err(e) => {
                    tracing::debug!("cannot query {}: {}", entry.path().display(), e);
                    EntryKind::Other
                }
            };

            return Some(Ok(RawEntry { name, kind }));
        }
    }
}

fn kind_from_attributes(attributes: u32) -> EntryKind {
    if attributes & FILE_ATTRIBUTE_DIRECTORY != 0 {
        EntryKind::Dir
    } else if attributes & FILE_ATTRIBUTE_DEVICE != 0 {
        EntryKind::Other
    } else {
        EntryKind::File
    }
}
