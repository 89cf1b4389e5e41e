//! High-level operations.
//!
//! This module contains the implementation of cbuild commands.

pub mod cbuild_build;
pub mod cbuild_clean;

pub use cbuild_build::{build, plan, BuildOptions, BuildResult};
pub use cbuild_clean::clean;
