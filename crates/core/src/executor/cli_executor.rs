//! Subprocess executor backed by `tokio::process`.
//!
//! Commands are spawned directly (no shell), with stdin closed and both
//! output pipes streamed line by line as the child produces them.

use crate::executor::base::{CommandRunner, ExecError, ExecEvent, ExecStream};
use crate::executor::command::CommandSpec;
use async_trait::async_trait;
use std::process::Stdio;
use tokio::io::AsyncBufReadExt;
use tokio::io::BufReader;
use tokio::process::Command;
use tokio_stream::wrappers::LinesStream;
use tokio_stream::StreamExt;

/// Runs commands on the local host.
#[derive(Debug, Clone, Copy, Default)]
pub struct CliExecutor;

#[async_trait]
impl CommandRunner for CliExecutor {
    async fn is_available(&self, spec: &CommandSpec) -> bool {
        let search_path = spec
            .env
            .get("PATH")
            .cloned()
            .or_else(|| std::env::var("PATH").ok());

        which::which_in(&spec.program, search_path, &spec.cwd).is_ok()
    }

    /// Spawn the command and stream its output.
    ///
    /// Stdout and stderr lines are interleaved in the order they become
    /// readable. The stream ends with `ExecEvent::Exited` once the child has
    /// been reaped, or with a single error if it could not be spawned.
    ///
    /// # Example
    ///
    /// ```no_run
    /// use dk_core::executor::base::CommandRunner;
    /// use dk_core::executor::cli_executor::CliExecutor;
    /// use dk_core::executor::command::CommandSpec;
    /// use tokio_stream::StreamExt;
    ///
    /// #[tokio::main]
    /// async fn main() {
    ///     let spec = CommandSpec::new("systemctl", ".").args(["status", "backend.service", "--no-pager"]);
    ///     let events: Vec<_> = CliExecutor.execute(&spec).collect().await;
    ///     println!("Got {} events", events.len());
    /// }
    /// ```
    fn execute(&self, spec: &CommandSpec) -> ExecStream {
        let spec = spec.clone();

        let stream = async_stream::stream! {
            let mut cmd = Command::new(&spec.program);
            cmd.args(&spec.args);
            cmd.envs(&spec.env);
            cmd.current_dir(&spec.cwd);
            cmd.stdin(Stdio::null());
            cmd.stdout(Stdio::piped());
            cmd.stderr(Stdio::piped());
            cmd.kill_on_drop(true);

            tracing::debug!(command = %spec, cwd = %spec.cwd.display(), "spawning");

            let mut child = match cmd.spawn() {
                Ok(child) => child,
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                    yield Err(ExecError::NotFound(spec.program.clone()));
                    return;
                }
                Err(e) => {
                    yield Err(ExecError::Spawn(format!("'{}': {}", spec.program, e)));
                    return;
                }
            };

            let (stdout, stderr) = match (child.stdout.take(), child.stderr.take()) {
                (Some(stdout), Some(stderr)) => (stdout, stderr),
                _ => {
                    let _ = child.start_kill();
                    yield Err(ExecError::Output("Failed to capture output pipes".to_string()));
                    return;
                }
            };

            let out = LinesStream::new(BufReader::new(stdout).lines()).map(|line| line.map(ExecEvent::Stdout));
            let err = LinesStream::new(BufReader::new(stderr).lines()).map(|line| line.map(ExecEvent::Stderr));
            let merged = out.merge(err);
            tokio::pin!(merged);

            while let Some(item) = merged.next().await {
                match item {
                    Ok(event) => yield Ok(event),
                    Err(e) => {
                        let _ = child.start_kill();
                        let _ = child.wait().await;
                        yield Err(ExecError::Output(e.to_string()));
                        return;
                    }
                }
            }

            match child.wait().await {
                Ok(status) => {
                    tracing::debug!(command = %spec, code = ?status.code(), "exited");
                    yield Ok(ExecEvent::Exited(status.code()));
                }
                Err(e) => yield Err(ExecError::Wait(e.to_string())),
            }
        };

        Box::pin(stream)
    }
}
