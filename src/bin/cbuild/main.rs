//! cbuild CLI - compile every module directory and link the result

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::EnvFilter;

mod cli;
mod commands;

use cbuild::util::diagnostic;
use cbuild::util::GlobalContext;
use cli::{Cli, Commands};

fn main() {
    let cli = Cli::parse();
    let color = !cli.no_color;

    if let Err(e) = run(cli) {
        eprint!("{}", diagnostic::render_error(&e, color));
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<()> {
    // Set up logging
    let filter = if cli.verbose {
        EnvFilter::new("cbuild=debug")
    } else {
        EnvFilter::new("cbuild=info")
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .without_time()
        .with_ansi(!cli.no_color)
        // stdout carries listings and plans
        .with_writer(std::io::stderr)
        .init();

    // Resolved lazily since completions need no project
    let ctx = || GlobalContext::from_project_dir(cli.project_dir.clone());

    // Execute command
    match cli.command {
        Commands::Build(args) => commands::build::execute(args, &ctx()?, cli.verbose),
        Commands::Clean(args) => commands::clean::execute(args, &ctx()?),
        Commands::Ls(args) => commands::ls::execute(args, &ctx()?),
        Commands::Completions(args) => commands::completions::execute(args),
    }
}
