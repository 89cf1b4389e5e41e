//! `cbuild build` command

use std::time::Duration;

use anyhow::Result;

use crate::cli::BuildArgs;
use cbuild::ops::cbuild_build::{build, BuildOptions};
use cbuild::util::GlobalContext;

pub fn execute(args: BuildArgs, ctx: &GlobalContext, verbose: bool) -> Result<()> {
    // Load configuration (global + project)
    let mut config = ctx.load_config();

    // CLI overrides config
    if args.compiler.is_some() {
        config.build.compiler = args.compiler;
    }

    let mut opts = BuildOptions::from_config(ctx, &config)?;
    if let Some(secs) = args.timeout {
        opts.timeout = Some(Duration::from_secs(secs));
    }
    opts.emit_compile_commands |= args.emit_compile_commands;
    opts.emit_plan = args.plan;
    opts.verbose = verbose;

    let result = build(&opts)?;

    if let Some(artifact) = &result.artifact {
        tracing::debug!(
            "built {} from {} module(s)",
            artifact.display(),
            result.compiled.len()
        );
    }

    Ok(())
}
