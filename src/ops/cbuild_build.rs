//! Implementation of `cbuild build`.

use std::env::consts::EXE_SUFFIX;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use anyhow::{bail, Context, Result};

use crate::builder::plan::{link_step, BuildPlan, OBJECT_DELIMITER};
use crate::builder::BuildExecutor;
use crate::core::mask::Mask;
use crate::dir::{DirMode, DirectoryEnumerator};
use crate::util::config::{self, Config};
use crate::util::diagnostic::suggestions;
use crate::util::fs::ensure_dir;
use crate::util::process::find_cxx_compiler;
use crate::util::GlobalContext;

/// File name of the compilation database written into the build directory.
pub const COMPILE_COMMANDS_FILE: &str = "compile_commands.json";

/// Options for the build command.
///
/// Paths other than `project_root` are relative to the project root; every
/// command runs from there.
#[derive(Debug, Clone)]
pub struct BuildOptions {
    pub project_root: PathBuf,
    pub source_dir: PathBuf,
    pub build_dir: PathBuf,
    pub main_source: PathBuf,

    /// Compiler driver used for both compiling and linking
    pub compiler: String,

    pub source_ext: String,
    pub object_ext: String,

    /// Final executable path
    pub output: PathBuf,

    /// Extra flags passed to every compiler invocation
    pub flags: Vec<String>,

    /// Kill any single compiler invocation running longer than this
    pub timeout: Option<Duration>,

    /// Emit compile_commands.json
    pub emit_compile_commands: bool,

    /// Print the build plan as JSON instead of building
    pub emit_plan: bool,

    /// Verbose output
    pub verbose: bool,
}

impl BuildOptions {
    /// Resolve configuration against built-in defaults.
    ///
    /// Fails only when no compiler is configured and none can be found on
    /// the PATH.
    pub fn from_config(ctx: &GlobalContext, config: &Config) -> Result<Self> {
        let build = &config.build;

        let compiler = match &build.compiler {
            Some(compiler) => compiler.clone(),
            None => match find_cxx_compiler() {
                Some(path) => path.display().to_string(),
                None => bail!(
                    "no C++ compiler found\n\
                     hint: {}",
                    suggestions::NO_COMPILER
                ),
            },
        };

        let build_dir = build
            .build_dir
            .clone()
            .unwrap_or_else(|| PathBuf::from(config::DEFAULT_BUILD_DIR));
        let output = build
            .output
            .as_deref()
            .unwrap_or(config::DEFAULT_OUTPUT);
        let output = build_dir.join(format!("{}{}", output, EXE_SUFFIX));

        Ok(BuildOptions {
            project_root: ctx.project_root().to_path_buf(),
            source_dir: build
                .source_dir
                .clone()
                .unwrap_or_else(|| PathBuf::from(config::DEFAULT_SOURCE_DIR)),
            build_dir,
            main_source: build
                .main_source
                .clone()
                .unwrap_or_else(|| PathBuf::from(config::DEFAULT_MAIN_SOURCE)),
            compiler,
            source_ext: build
                .source_ext
                .clone()
                .unwrap_or_else(|| config::DEFAULT_SOURCE_EXT.to_string()),
            object_ext: build
                .object_ext
                .clone()
                .unwrap_or_else(|| config::DEFAULT_OBJECT_EXT.to_string()),
            output,
            flags: build.flags.clone().unwrap_or_default(),
            timeout: build.timeout_secs.map(Duration::from_secs),
            emit_compile_commands: build.emit_compile_commands.unwrap_or(false),
            emit_plan: false,
            verbose: false,
        })
    }

    /// Resolve a path against the project root.
    pub fn resolve(&self, path: &Path) -> PathBuf {
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.project_root.join(path)
        }
    }
}

/// Build result.
#[derive(Debug)]
pub struct BuildResult {
    /// Linked executable, absent when only the plan was emitted
    pub artifact: Option<PathBuf>,

    /// Modules compiled
    pub compiled: Vec<String>,

    /// Build plan (if requested)
    pub plan: Option<BuildPlan>,
}

/// Plan the build without running anything.
pub fn plan(opts: &BuildOptions) -> Result<BuildPlan> {
    BuildPlan::generate(opts)
}

/// Build every module, then link them with the main source.
pub fn build(opts: &BuildOptions) -> Result<BuildResult> {
    let start = Instant::now();
    let plan = plan(opts)?;

    if opts.emit_plan {
        let plan_json = serde_json::to_string_pretty(&plan)?;
        println!("{}", plan_json);

        return Ok(BuildResult {
            artifact: None,
            compiled: Vec::new(),
            plan: Some(plan),
        });
    }

    let build_dir = opts.resolve(&opts.build_dir);
    ensure_dir(&build_dir)?;

    if opts.emit_compile_commands {
        let cc_path = build_dir.join(COMPILE_COMMANDS_FILE);
        plan.emit_compile_commands(opts, &cc_path)?;
        tracing::info!("Wrote {}", cc_path.display());
    }

    let executor = BuildExecutor::new(opts).verbose(opts.verbose);
    let report = executor.compile(&plan)?;
    if !report.is_success() {
        let hint = if report.timed_out.is_empty() {
            suggestions::BUILD_FAILED
        } else {
            suggestions::TIMED_OUT
        };
        bail!(
            "could not compile {} module(s): {}\n\
             hint: {}",
            report.failed.len(),
            report.failed.join(", "),
            hint
        );
    }

    // Link whatever objects are in the build directory, including ones left
    // by earlier builds.
    let object_mask = Mask::extension(&opts.object_ext);
    let objects = DirectoryEnumerator::new()
        .list(&build_dir, &object_mask, DirMode::FILES, OBJECT_DELIMITER)
        .with_context(|| "failed to enumerate object files")?;
    let link = link_step(opts, &objects)?;

    if !executor.link(&link)? {
        bail!(
            "could not link {}\n\
             hint: {}",
            link.output.display(),
            suggestions::BUILD_FAILED
        );
    }

    eprintln!(
        "    Finished {} in {:.2}s",
        link.output.display(),
        start.elapsed().as_secs_f64()
    );

    Ok(BuildResult {
        artifact: Some(opts.resolve(&link.output)),
        compiled: report.compiled,
        plan: None,
    })
}
