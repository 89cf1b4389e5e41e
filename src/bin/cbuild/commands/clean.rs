//! `cbuild clean` command

use anyhow::Result;

use crate::cli::CleanArgs;
use cbuild::ops::cbuild_clean::clean;
use cbuild::util::config::DEFAULT_BUILD_DIR;
use cbuild::util::GlobalContext;

pub fn execute(_args: CleanArgs, ctx: &GlobalContext) -> Result<()> {
    let config = ctx.load_config();
    let build_dir = config
        .build
        .build_dir
        .unwrap_or_else(|| DEFAULT_BUILD_DIR.into());
    let build_dir = ctx.resolve(&build_dir);

    if clean(&build_dir)? {
        eprintln!("     Removed {}", build_dir.display());
    }

    Ok(())
}
