//! Execution of external commands.
//!
//! The batch and splice layers only see the [`CommandExecutor`] trait, so
//! they can be driven by a scripted executor in tests.

mod runner;

pub use runner::ProcessRunner;

use crate::command::ToolCommand;
use crate::logging::RunLogger;
use crate::orchestrator::StepResult;

/// Something that can run a [`ToolCommand`] to completion.
pub trait CommandExecutor: Send + Sync {
    /// Run the command, forwarding all output lines to `logger`.
    ///
    /// Exit status 0 is success; anything else is `ExternalToolFailure`.
    fn run(&self, command: &ToolCommand, logger: &RunLogger) -> StepResult<()>;

    /// Run the command and return its stdout; stderr still goes to `logger`.
    fn capture(&self, command: &ToolCommand, logger: &RunLogger) -> StepResult<String>;
}
