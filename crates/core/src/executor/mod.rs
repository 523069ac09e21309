//! Command execution.
//!
//! [`base::CommandRunner`] is the seam between the engine and the host: the
//! engine only ever sees a stream of [`base::ExecEvent`]s, which lets tests
//! script command outcomes without touching pip or systemd.

pub mod base;
pub mod cli_executor;
pub mod command;

pub use base::{CommandRunner, ExecError, ExecEvent, ExecStream};
pub use cli_executor::CliExecutor;
pub use command::CommandSpec;
