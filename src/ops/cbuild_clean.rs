//! Implementation of `cbuild clean`.

use std::path::Path;

use anyhow::Result;

use crate::util::fs::remove_dir_all_if_exists;

/// Remove the build directory with every object file and executable in it.
///
/// Returns whether there was anything to remove.
pub fn clean(build_dir: &Path) -> Result<bool> {
    let removed = remove_dir_all_if_exists(build_dir)?;
    if removed {
        tracing::info!("removed {}", build_dir.display());
    } else {
        tracing::debug!("{} does not exist", build_dir.display());
    }
    Ok(removed)
}
