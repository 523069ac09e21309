//! Reasons a stage can fail.

use crate::executor::base::ExecError;
use crate::manifest::ManifestError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum StageError {
    /// A command ran and exited non-zero.
    #[error("`{command}` exited with status {code}")]
    ExitStatus { command: String, code: i32 },

    /// A command was killed by a signal.
    #[error("`{command}` was terminated by a signal")]
    Signaled { command: String },

    /// The runner's stream ended without an exit event.
    #[error("`{command}` ended without reporting an exit status")]
    NoExitStatus { command: String },

    #[error(transparent)]
    Exec(#[from] ExecError),

    #[error(transparent)]
    Manifest(#[from] ManifestError),

    /// The variable naming the env-file source is unset.
    #[error("credential variable '{0}' is not set")]
    MissingCredential(String),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl StageError {
    /// Exit code to record on the stage, when a command produced one.
    pub fn exit_code(&self) -> Option<i32> {
        match self {
            StageError::ExitStatus { code, .. } => Some(*code),
            _ => None,
        }
    }
}
