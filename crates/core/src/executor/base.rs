//! Base CommandRunner trait and supporting types.

use crate::executor::command::CommandSpec;
use async_trait::async_trait;
use std::pin::Pin;
use thiserror::Error;
use tokio_stream::Stream;

/// Output and completion of a running command, in arrival order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExecEvent {
    Stdout(String),
    Stderr(String),
    /// The process exited. `None` means it was terminated by a signal.
    Exited(Option<i32>),
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ExecError {
    #[error("Command not found: {0}")]
    NotFound(String),
    #[error("Failed to spawn command: {0}")]
    Spawn(String),
    #[error("Failed to read command output: {0}")]
    Output(String),
    #[error("Failed to wait for command: {0}")]
    Wait(String),
}

/// Stream produced by [`CommandRunner::execute`].
///
/// A well-behaved runner ends every successful stream with exactly one
/// [`ExecEvent::Exited`].
pub type ExecStream = Pin<Box<dyn Stream<Item = Result<ExecEvent, ExecError>> + Send>>;

#[async_trait]
pub trait CommandRunner: Send + Sync {
    /// Whether `spec.program` can be launched by `execute(spec)`.
    ///
    /// Bare names are looked up on the `PATH` the command will run with,
    /// which may come from `spec.env` rather than this process.
    async fn is_available(&self, spec: &CommandSpec) -> bool;

    fn execute(&self, spec: &CommandSpec) -> ExecStream;
}
