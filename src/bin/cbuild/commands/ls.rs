//! `cbuild ls` command
//!
//! Prints a filtered directory listing exactly as the enumerator produces it,
//! each entry followed by the delimiter.

use std::io::{self, Write};

use anyhow::{Context, Result};

use crate::cli::LsArgs;
use cbuild::core::mask::Mask;
use cbuild::dir::{DirMode, DirectoryEnumerator};
use cbuild::util::GlobalContext;

pub fn execute(args: LsArgs, ctx: &GlobalContext) -> Result<()> {
    // Neither flag means both
    let mut mode = DirMode::from_flags(args.files, args.dirs);
    if mode == DirMode::NONE {
        mode = DirMode::ALL;
    }
    let mask = Mask::parse(&args.mask);
    let path = ctx.resolve(&args.path);

    let listing = DirectoryEnumerator::new()
        .list(&path, &mask, mode, &args.delimiter)
        .map_err(|e| e.to_diagnostic())?;

    let mut stdout = io::stdout().lock();
    stdout
        .write_all(listing.as_bytes())
        .context("failed to write listing")?;
    if !args.delimiter.ends_with('\n') {
        writeln!(stdout).context("failed to write listing")?;
    }

    Ok(())
}
