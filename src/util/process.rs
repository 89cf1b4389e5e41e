//! Subprocess execution utilities.

use std::ffi::OsStr;
use std::path::{Path, PathBuf};
use std::process::{Command, ExitStatus};
use std::thread;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use thiserror::Error;

/// How often a child with a timeout is polled.
const POLL_INTERVAL: Duration = Duration::from_millis(10);

#[derive(Debug, Error)]
pub enum ProcessError {
    #[error("`{command}` timed out after {}s", timeout.as_secs_f64())]
    TimedOut { command: String, timeout: Duration },
}

/// Builder for subprocess execution.
#[derive(Debug, Clone)]
pub struct ProcessBuilder {
    program: PathBuf,
    args: Vec<String>,
    cwd: Option<PathBuf>,
    timeout: Option<Duration>,
    /// Original command line for processes created with [`ProcessBuilder::shell`].
    shell_command: Option<String>,
}

impl ProcessBuilder {
    /// Create a new process builder for the given program.
    pub fn new(program: impl AsRef<Path>) -> Self {
        ProcessBuilder {
            program: program.as_ref().to_path_buf(),
            args: Vec::new(),
            cwd: None,
            timeout: None,
            shell_command: None,
        }
    }

    /// Run a full command line through the platform shell (`sh -c` or
    /// `cmd /C`).
    pub fn shell(command: impl Into<String>) -> Self {
        let command = command.into();

        #[cfg(windows)]
        let mut pb = ProcessBuilder::new("cmd").arg("/C").arg(&command);
        #[cfg(not(windows))]
        let mut pb = ProcessBuilder::new("sh").arg("-c").arg(&command);

        pb.shell_command = Some(command);
        pb
    }

    /// Add a single argument.
    pub fn arg(mut self, arg: impl AsRef<OsStr>) -> Self {
        self.args.push(arg.as_ref().to_string_lossy().into_owned());
        self
    }

    /// Set the working directory.
    pub fn cwd(mut self, cwd: impl AsRef<Path>) -> Self {
        self.cwd = Some(cwd.as_ref().to_path_buf());
        self
    }

    /// Kill the process if it runs longer than `timeout`.
    pub fn timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    /// Build the Command.
    fn build_command(&self) -> Command {
        let mut cmd = Command::new(&self.program);
        cmd.args(&self.args);

        if let Some(ref cwd) = self.cwd {
            cmd.current_dir(cwd);
        }

        cmd
    }

    /// Execute with inherited stdio and return the exit status.
    ///
    /// Honors the timeout: the child is polled and killed once it expires,
    /// returning [`ProcessError::TimedOut`].
    pub fn status(&self) -> Result<ExitStatus> {
        let mut cmd = self.build_command();

        let Some(timeout) = self.timeout else {
            return cmd
                .status()
                .with_context(|| format!("failed to execute `{}`", self.display_command()));
        };

        let mut child = cmd
            .spawn()
            .with_context(|| format!("failed to spawn `{}`", self.display_command()))?;
        let start = Instant::now();

        loop {
            if let Some(status) = child
                .try_wait()
                .with_context(|| format!("failed to wait for `{}`", self.display_command()))?
            {
                return Ok(status);
            }

            if start.elapsed() >= timeout {
                // the child may have exited between try_wait and kill
                let _ = child.kill();
                let _ = child.wait();
                return Err(ProcessError::TimedOut {
                    command: self.display_command(),
                    timeout,
                }
                .into());
            }

            thread::sleep(POLL_INTERVAL);
        }
    }

    /// Display the command for error messages.
    pub fn display_command(&self) -> String {
        if let Some(ref command) = self.shell_command {
            return command.clone();
        }
        let mut parts = vec![self.program.display().to_string()];
        parts.extend(self.args.iter().cloned());
        parts.join(" ")
    }
}

/// Run a process, printing `success` to stdout or `failure` to stderr.
///
/// Returns whether the process exited successfully. Spawn errors and
/// timeouts are returned as errors without printing either message.
pub fn run_with_messages(process: &ProcessBuilder, success: &str, failure: &str) -> Result<bool> {
    let status = process.status()?;
    if status.success() {
        println!("{}", success);
    } else {
        eprintln!("{}", failure);
    }
    Ok(status.success())
}

/// Find an executable in PATH.
pub fn find_executable(name: &str) -> Option<PathBuf> {
    which::which(name).ok()
}

/// Find a C++ compiler.
pub fn find_cxx_compiler() -> Option<PathBuf> {
    // Check CXX environment variable first
    if let Ok(cxx) = std::env::var("CXX") {
        if let Some(path) = find_executable(&cxx) {
            return Some(path);
        }
    }

    for compiler in &["g++", "clang++", "c++", "cl"] {
        if let Some(path) = find_executable(compiler) {
            return Some(path);
        }
    }

    None
}
