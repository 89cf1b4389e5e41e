//! Build plan generation.
//!
//! A module is a directory under the source directory holding a source file
//! of the same name (`code/net/net.cpp`). Each module compiles to one object
//! file in the build directory, and every object file found there is linked
//! together with the main source into the final executable.
//!
//! Paths and command lines are assembled in [`ByteBuffer`]s from the names
//! recovered by tokenizing a directory listing.

use std::path::{Path, PathBuf, MAIN_SEPARATOR_STR};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::core::bounded::BoundedList;
use crate::core::buffer::{BufferError, ByteBuffer};
use crate::core::mask::Mask;
use crate::core::tokenizer::tokenize;
use crate::dir::{DirMode, DirectoryEnumerator};
use crate::ops::cbuild_build::BuildOptions;
use crate::util::diagnostic::suggestions;

/// Delimiter used when listing module directories.
pub const MODULE_DELIMITER: &str = ":";

/// Delimiter used when listing object files for the link step.
pub const OBJECT_DELIMITER: &str = " ";

/// A complete build plan.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BuildPlan {
    /// One compile step per module, sorted by module name
    pub compile_steps: Vec<CompileStep>,

    /// Final link of the main source against the module objects
    pub link_step: LinkStep,
}

/// Compile one module to an object file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompileStep {
    pub module: String,
    pub source: PathBuf,
    pub output: PathBuf,
    pub command: String,
}

/// Link the main source and object files into the executable.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LinkStep {
    pub main_source: PathBuf,
    pub objects: Vec<PathBuf>,
    pub output: PathBuf,
    pub command: String,
}

/// Entry of a `compile_commands.json` database.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompileCommand {
    pub directory: String,
    pub file: String,
    pub command: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub output: Option<String>,
}

impl BuildPlan {
    /// Plan a build from the modules currently on disk.
    ///
    /// The link step names the objects the compile steps will produce.
    pub fn generate(opts: &BuildOptions) -> Result<Self> {
        let source_dir = opts.resolve(&opts.source_dir);
        let modules = DirectoryEnumerator::new()
            .list(&source_dir, &Mask::any(), DirMode::DIRS, MODULE_DELIMITER)
            .with_context(|| "failed to enumerate modules")?;

        let mut steps = BoundedList::new();
        for module in tokenize(&modules, MODULE_DELIMITER.as_bytes()) {
            let name = module
                .as_str()
                .with_context(|| format!("module name is not UTF-8: {}", module.to_string_lossy()))?;

            let source = module_source(opts, module.as_bytes())?;
            if !opts.resolve(&source).is_file() {
                tracing::warn!(
                    "skipping module `{}`: {} not found",
                    name,
                    source.display()
                );
                continue;
            }

            let output = module_object(opts, module.as_bytes())?;
            let command = compile_command(opts, &source, &output)?;
            tracing::debug!("planned {}", command);

            steps.push_back(CompileStep {
                module: name.to_string(),
                source,
                output,
                command: command.to_string_lossy(),
            })?;
        }

        if steps.is_empty() {
            tracing::warn!(
                "no modules found in {}; {}",
                source_dir.display(),
                suggestions::NO_MODULES
            );
        }

        let mut objects = ByteBuffer::empty()?;
        for step in &steps {
            let file_name = step
                .output
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_default();
            objects.append_str(&file_name)?.append_str(OBJECT_DELIMITER)?;
        }
        let link_step = link_step(opts, &objects)?;

        Ok(BuildPlan {
            compile_steps: steps.into_vec(),
            link_step,
        })
    }

    /// Number of compile steps.
    pub fn compile_count(&self) -> usize {
        self.compile_steps.len()
    }

    /// Write `compile_commands.json` for the compile steps.
    pub fn emit_compile_commands(&self, opts: &BuildOptions, path: &Path) -> Result<()> {
        let directory = opts.project_root.display().to_string();
        let commands: Vec<CompileCommand> = self
            .compile_steps
            .iter()
            .map(|step| CompileCommand {
                directory: directory.clone(),
                file: step.source.display().to_string(),
                command: step.command.clone(),
                output: Some(step.output.display().to_string()),
            })
            .collect();

        let json = serde_json::to_string_pretty(&commands)?;
        crate::util::fs::write_string(path, &json)
    }
}

/// Build the link step from a listing of object file names separated by
/// [`OBJECT_DELIMITER`]. Names are resolved inside the build directory.
pub fn link_step(opts: &BuildOptions, listing: &ByteBuffer) -> Result<LinkStep, BufferError> {
    let mut command = command_prefix(opts)?;
    command.append_str(&quote(&opts.main_source))?;

    let mut objects = Vec::new();
    for name in tokenize(listing, OBJECT_DELIMITER.as_bytes()) {
        let mut object = dir_prefix(&opts.build_dir)?;
        object.append_bytes(name.as_bytes())?;
        let object = PathBuf::from(object.to_string_lossy());

        command.append_str(" ")?.append_str(&quote(&object))?;
        objects.push(object);
    }

    command.append_str(" -o ")?.append_str(&quote(&opts.output))?;

    Ok(LinkStep {
        main_source: opts.main_source.clone(),
        objects,
        output: opts.output.clone(),
        command: command.to_string_lossy(),
    })
}

/// `<source_dir>/<module>/<module>.<source_ext>`
fn module_source(opts: &BuildOptions, module: &[u8]) -> Result<PathBuf, BufferError> {
    let mut path = dir_prefix(&opts.source_dir)?;
    path.append_bytes(module)?
        .append_str(MAIN_SEPARATOR_STR)?
        .append_bytes(module)?
        .append_str(".")?
        .append_str(&opts.source_ext)?;
    Ok(PathBuf::from(path.to_string_lossy()))
}

/// `<build_dir>/<module>.<object_ext>`
fn module_object(opts: &BuildOptions, module: &[u8]) -> Result<PathBuf, BufferError> {
    let mut path = dir_prefix(&opts.build_dir)?;
    path.append_bytes(module)?
        .append_str(".")?
        .append_str(&opts.object_ext)?;
    Ok(PathBuf::from(path.to_string_lossy()))
}

/// `<compiler> [flags] <source> -c -o <object>`
fn compile_command(
    opts: &BuildOptions,
    source: &Path,
    object: &Path,
) -> Result<ByteBuffer, BufferError> {
    let mut command = command_prefix(opts)?;
    command
        .append_str(&quote(source))?
        .append_str(" -c -o ")?
        .append_str(&quote(object))?;
    Ok(command)
}

/// `<compiler> [flags] ` with a trailing space.
fn command_prefix(opts: &BuildOptions) -> Result<ByteBuffer, BufferError> {
    let mut command = ByteBuffer::new(quote_str(&opts.compiler))?;
    command.append_str(" ")?;
    for flag in &opts.flags {
        command.append_str(flag)?.append_str(" ")?;
    }
    Ok(command)
}

/// Directory path with exactly one trailing separator.
fn dir_prefix(dir: &Path) -> Result<ByteBuffer, BufferError> {
    let dir = dir.display().to_string();
    let mut prefix = ByteBuffer::new(&dir)?;
    if !dir.is_empty() && !dir.ends_with(['/', '\\']) {
        prefix.append_str(MAIN_SEPARATOR_STR)?;
    }
    Ok(prefix)
}

fn quote(path: &Path) -> String {
    quote_str(&path.display().to_string())
}

/// Wrap arguments containing whitespace in double quotes.
fn quote_str(arg: &str) -> String {
    if arg.contains(char::is_whitespace) {
        format!("\"{}\"", arg)
    } else {
        arg.to_string()
    }
}
