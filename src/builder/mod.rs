//! Module build driver.
//!
//! Plans one compile step per module directory and a final link step, then
//! executes them through the platform shell.

pub mod executor;
pub mod plan;

pub use executor::{BuildExecutor, CompileReport};
pub use plan::{BuildPlan, CompileStep, LinkStep};
