//! cbuild - a minimal module build driver for C++ projects
//!
//! The library provides chunked byte buffers, a delimiter tokenizer,
//! `name.ext` mask matching and filtered directory listings, plus the build
//! driver that compiles one object per module directory and links them.

pub mod builder;
pub mod core;
pub mod dir;
pub mod ops;
pub mod util;

/// Test utilities and mocks for cbuild unit tests.
///
/// This module is only available when compiling with `--cfg test` or
/// running tests. It provides an in-memory directory backend and on-disk
/// project fixtures.
#[cfg(test)]
pub mod test_support;

pub use crate::core::{
    bounded::BoundedList, buffer::ByteBuffer, mask::Mask, tokenizer::Tokenizer,
};
pub use dir::{DirMode, DirectoryEnumerator, FsError};
pub use util::context::GlobalContext;
