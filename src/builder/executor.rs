//! Build executor with progress reporting.
//!
//! Steps run one at a time, in plan order. Each command line goes through the
//! platform shell from the project root.

use std::time::Instant;

use anyhow::Result;
use indicatif::{ProgressBar, ProgressStyle};

use crate::builder::plan::{BuildPlan, CompileStep, LinkStep};
use crate::ops::cbuild_build::BuildOptions;
use crate::util::process::{run_with_messages, ProcessBuilder, ProcessError};

/// Printed after a successful link.
pub const LINK_SUCCESS_MESSAGE: &str = "100% Compiled successfully!";

/// Outcome of the compile phase.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CompileReport {
    /// Modules that compiled
    pub compiled: Vec<String>,
    /// Modules whose compiler invocation failed or timed out
    pub failed: Vec<String>,
    /// The subset of `failed` killed for exceeding the timeout
    pub timed_out: Vec<String>,
}

impl CompileReport {
    pub fn is_success(&self) -> bool {
        self.failed.is_empty()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum StepOutcome {
    Compiled,
    Failed,
    TimedOut,
}

/// Build executor with progress tracking.
pub struct BuildExecutor<'a> {
    opts: &'a BuildOptions,
    verbose: bool,
}

impl<'a> BuildExecutor<'a> {
    /// Create a new build executor.
    pub fn new(opts: &'a BuildOptions) -> Self {
        BuildExecutor {
            opts,
            verbose: false,
        }
    }

    /// Enable verbose output.
    pub fn verbose(mut self, verbose: bool) -> Self {
        self.verbose = verbose;
        self
    }

    /// Run every compile step. A failing step is reported and the remaining
    /// steps still run.
    pub fn compile(&self, plan: &BuildPlan) -> Result<CompileReport> {
        let start = Instant::now();
        let total = plan.compile_count();

        let pb = if !self.verbose && total > 1 {
            let pb = ProgressBar::new(total as u64);
            pb.set_style(
                ProgressStyle::default_bar()
                    .template("{spinner:.green} [{bar:40.cyan/blue}] {pos}/{len} {msg}")?
                    .progress_chars("#>-"),
            );
            Some(pb)
        } else {
            None
        };

        let mut report = CompileReport::default();
        for step in &plan.compile_steps {
            match &pb {
                Some(pb) => pb.set_message(step.module.clone()),
                None => eprintln!("   Compiling {}", step.module),
            }

            let outcome = self.run_compile(step)?;
            if outcome == StepOutcome::Compiled {
                report.compiled.push(step.module.clone());
            } else {
                let message = format!("Failed to compile: {}", step.source.display());
                match &pb {
                    Some(pb) => pb.println(message),
                    None => eprintln!("{}", message),
                }
                if outcome == StepOutcome::TimedOut {
                    report.timed_out.push(step.module.clone());
                }
                report.failed.push(step.module.clone());
            }

            if let Some(pb) = &pb {
                pb.inc(1);
            }
        }

        if let Some(pb) = pb {
            pb.finish_and_clear();
        }

        tracing::info!(
            "compiled {} of {} module(s) in {:.2}s",
            report.compiled.len(),
            total,
            start.elapsed().as_secs_f64()
        );

        Ok(report)
    }

    /// Run the link step, printing the success or failure message.
    pub fn link(&self, step: &LinkStep) -> Result<bool> {
        eprintln!("     Linking {}", step.output.display());
        tracing::debug!("{}", step.command);

        let failure = format!("Failed to compile {}", step.main_source.display());
        run_with_messages(&self.process(&step.command), LINK_SUCCESS_MESSAGE, &failure)
    }

    fn run_compile(&self, step: &CompileStep) -> Result<StepOutcome> {
        tracing::debug!("{}", step.command);

        match self.process(&step.command).status() {
            Ok(status) if status.success() => Ok(StepOutcome::Compiled),
            Ok(_) => Ok(StepOutcome::Failed),
            Err(e) => match e.downcast_ref::<ProcessError>() {
                Some(ProcessError::TimedOut { .. }) => {
                    tracing::warn!("{}", e);
                    Ok(StepOutcome::TimedOut)
                }
                None => Err(e),
            },
        }
    }

    fn process(&self, command: &str) -> ProcessBuilder {
        ProcessBuilder::shell(command)
            .cwd(&self.opts.project_root)
            .timeout(self.opts.timeout)
    }
}
