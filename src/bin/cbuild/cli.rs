//! CLI definitions using clap.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use clap_complete::Shell;

/// cbuild - compile one object per module directory and link them
#[derive(Parser)]
#[command(name = "cbuild")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    /// Run as if started in DIR
    #[arg(short = 'C', long, global = true, value_name = "DIR")]
    pub project_dir: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Compile every module and link the executable
    Build(BuildArgs),

    /// Remove the build directory
    Clean(CleanArgs),

    /// List directory entries matching a mask
    Ls(LsArgs),

    /// Generate shell completions
    Completions(CompletionsArgs),
}

#[derive(Args)]
pub struct BuildArgs {
    /// Print the build plan as JSON without building
    #[arg(long)]
    pub plan: bool,

    /// Write compile_commands.json into the build directory
    #[arg(long)]
    pub emit_compile_commands: bool,

    /// Compiler driver to use (overrides config)
    #[arg(long, value_name = "C")]
    pub compiler: Option<String>,

    /// Kill any compiler invocation running longer than SECS
    #[arg(long, value_name = "SECS")]
    pub timeout: Option<u64>,
}

#[derive(Args)]
pub struct CleanArgs {}

#[derive(Args)]
pub struct LsArgs {
    /// Directory to list
    pub path: PathBuf,

    /// Mask in `name.ext` form, `*` matching any segment
    #[arg(short, long, default_value = "*.*")]
    pub mask: String,

    /// Include regular files
    #[arg(long)]
    pub files: bool,

    /// Include directories
    #[arg(long)]
    pub dirs: bool,

    /// String written after every entry
    #[arg(short, long, default_value = "\n")]
    pub delimiter: String,
}

#[derive(Args)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    #[arg(value_enum)]
    pub shell: Shell,
}
