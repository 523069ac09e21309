//! Pipeline execution engine.
//!
//! The PipelineEngine executes pipeline stages sequentially, delegating
//! subprocesses to a [`CommandRunner`] and coordinating process state
//! transitions. The first failing stage stops the run; there is no retry
//! and no rollback.

pub mod error;

pub use error::StageError;

use crate::executor::base::{CommandRunner, ExecError, ExecEvent};
use crate::executor::cli_executor::CliExecutor;
use crate::executor::command::CommandSpec;
use crate::manifest::load_manifest;
use crate::plan::{plan_pipeline, Action, RunContext, StagePlan};
use crate::state::process::{
    begin_stage, complete_process, create_process, fail_process, finish_stage, log_to_process,
    notify, skip_stage, start_process,
};
use anyhow::Context;
use dk_protocol::ipc::Event;
use dk_protocol::pipeline_models::Pipeline;
use dk_protocol::process_models::{Process, StageStatus};
use std::path::Path;
use std::sync::Arc;
use tokio::sync::mpsc::UnboundedSender;
use tokio_stream::StreamExt;

/// The main pipeline execution engine.
pub struct PipelineEngine {
    runner: Arc<dyn CommandRunner>,
}

impl PipelineEngine {
    /// Create a new PipelineEngine running commands through `runner`.
    pub fn new(runner: Arc<dyn CommandRunner>) -> Self {
        Self { runner }
    }

    /// An engine that runs commands on the local host.
    pub fn local() -> Self {
        Self::new(Arc::new(CliExecutor))
    }

    /// Execute a pipeline and return the final Process state.
    ///
    /// This is the main entry point for pipeline execution. It:
    /// 1. Creates a new Process and emits ProcessStarted
    /// 2. Plans every stage up front
    /// 3. Runs enabled stages in order, skipping disabled ones
    /// 4. Stops at the first failing stage
    /// 5. Emits exactly one Notification with the pipeline's post message
    ///
    /// Stage failures are reported through the returned Process (status
    /// `Failed`, `failure` set), never as an `Err`.
    pub async fn run(
        &self,
        pipeline: &Pipeline,
        ctx: &RunContext,
        events_tx: UnboundedSender<Event>,
    ) -> Process {
        let mut process = create_process(pipeline);
        start_process(&mut process, &events_tx);

        tracing::info!(
            pipeline = %pipeline.name,
            process_id = %process.id,
            cwd = %ctx.working_dir.display(),
            "pipeline started"
        );

        let plans = match plan_pipeline(pipeline, ctx) {
            Ok(plans) => plans,
            Err(e) => {
                tracing::error!(pipeline = %pipeline.name, "planning failed: {e}");
                log_to_process(&mut process, &events_tx, format!("Planning failed: {e}"));
                fail_process(&mut process, &events_tx, e.to_string());
                notify(&mut process, &pipeline.post, &events_tx);
                return process;
            }
        };

        for plan in &plans {
            if !plan.enabled {
                tracing::debug!(stage = %plan.name, "stage disabled, skipping");
                skip_stage(&mut process, plan.index, &events_tx);
                continue;
            }

            begin_stage(&mut process, plan.index, &events_tx);
            tracing::info!(stage = %plan.name, kind = plan.kind, "stage started");

            match self.execute_stage(&mut process, plan, ctx, &events_tx).await {
                Ok(exit_code) => {
                    finish_stage(
                        &mut process,
                        plan.index,
                        StageStatus::Succeeded,
                        exit_code,
                        &events_tx,
                    );
                    tracing::info!(stage = %plan.name, "stage succeeded");
                }
                Err(e) => {
                    finish_stage(
                        &mut process,
                        plan.index,
                        StageStatus::Failed,
                        e.exit_code(),
                        &events_tx,
                    );
                    tracing::error!(stage = %plan.name, "stage failed: {e}");

                    let message = format!("Stage '{}' failed: {e}", plan.name);
                    log_to_process(&mut process, &events_tx, message.clone());
                    fail_process(&mut process, &events_tx, message);
                    notify(&mut process, &pipeline.post, &events_tx);
                    return process;
                }
            }
        }

        complete_process(&mut process, &events_tx);
        tracing::info!(pipeline = %pipeline.name, "pipeline completed");
        notify(&mut process, &pipeline.post, &events_tx);

        process
    }

    /// Run every action of one stage, stopping at the first error.
    ///
    /// Returns the exit code of the stage's last command, if it ran any.
    async fn execute_stage(
        &self,
        process: &mut Process,
        plan: &StagePlan,
        ctx: &RunContext,
        events_tx: &UnboundedSender<Event>,
    ) -> Result<Option<i32>, StageError> {
        let mut last_exit = None;

        for action in &plan.actions {
            match action {
                Action::CheckManifest(path) => {
                    let manifest = load_manifest(path).await?;
                    log_to_process(
                        process,
                        events_tx,
                        format!(
                            "Manifest {} pins {} package(s)",
                            path.display(),
                            manifest.requirements.len()
                        ),
                    );
                }
                Action::Command(spec) => {
                    last_exit = Some(self.execute_command(process, spec, events_tx).await?);
                }
                Action::CopyFile { credential, dest } => {
                    let source = ctx
                        .var(credential)
                        .map(str::to_string)
                        .or_else(|| std::env::var(credential).ok())
                        .ok_or_else(|| StageError::MissingCredential(credential.clone()))?;

                    copy_file(Path::new(&source), dest).await?;
                    log_to_process(
                        process,
                        events_tx,
                        format!("Copied ${credential} to {}", dest.display()),
                    );
                }
            }
        }

        Ok(last_exit)
    }

    /// Run one command, streaming its output into the process log.
    async fn execute_command(
        &self,
        process: &mut Process,
        spec: &CommandSpec,
        events_tx: &UnboundedSender<Event>,
    ) -> Result<i32, StageError> {
        log_to_process(process, events_tx, format!("$ {spec}"));

        if !self.runner.is_available(spec).await {
            return Err(ExecError::NotFound(spec.program.clone()).into());
        }

        let mut stream = self.runner.execute(spec);
        let mut exit = None;

        while let Some(event) = stream.next().await {
            match event? {
                ExecEvent::Stdout(line) | ExecEvent::Stderr(line) => {
                    tracing::trace!(command = %spec.program, "{line}");
                    log_to_process(process, events_tx, line);
                }
                ExecEvent::Exited(code) => {
                    exit = Some(code);
                }
            }
        }

        let command = spec.command_line();
        match exit {
            Some(Some(0)) => Ok(0),
            Some(Some(code)) => Err(StageError::ExitStatus { command, code }),
            Some(None) => Err(StageError::Signaled { command }),
            None => Err(StageError::NoExitStatus { command }),
        }
    }
}

async fn copy_file(source: &Path, dest: &Path) -> anyhow::Result<()> {
    if let Some(parent) = dest.parent() {
        tokio::fs::create_dir_all(parent)
            .await
            .with_context(|| format!("Failed to create directory {}", parent.display()))?;
    }

    tokio::fs::copy(source, dest)
        .await
        .with_context(|| format!("Failed to copy {} to {}", source.display(), dest.display()))?;

    Ok(())
}
