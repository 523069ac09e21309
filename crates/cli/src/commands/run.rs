use super::{parse_key_val, run_context};
use clap::Args;
use colored::Colorize;
use dk_core::config::loader::load_config;
use dk_core::engine::PipelineEngine;
use dk_protocol::ipc::{Event, Outcome};
use dk_protocol::process_models::{ProcessStatus, StageStatus};
use std::path::Path;
use std::process::ExitCode;
use tokio::sync::mpsc::{self, UnboundedReceiver};

#[derive(Args)]
pub struct RunArgs {
    /// Pipeline name (defaults to default-pipeline from config.toml)
    pub pipeline: Option<String>,

    /// Set a variable, overriding the pipeline's environment
    #[arg(long = "env", short = 'e', value_name = "KEY=VALUE", value_parser = parse_key_val)]
    pub env: Vec<(String, String)>,

    /// Print the final process record as JSON after the notification
    #[arg(long)]
    pub json: bool,
}

pub async fn run(args: RunArgs, root: &Path) -> color_eyre::Result<ExitCode> {
    let config = load_config(root).await?;
    let pipeline = config.select_pipeline(args.pipeline.as_deref())?;
    let ctx = run_context(root, &config, pipeline, &args.env);

    let (events_tx, events_rx) = mpsc::unbounded_channel();
    let renderer = tokio::spawn(render_events(events_rx, pipeline.stages.len()));

    let process = PipelineEngine::local().run(pipeline, &ctx, events_tx).await;

    // The engine dropped its sender, so the renderer drains and exits.
    if let Err(e) = renderer.await {
        tracing::warn!("event renderer stopped early: {e}");
    }

    if args.json {
        println!("{}", serde_json::to_string_pretty(&process)?);
    }

    Ok(match process.status {
        ProcessStatus::Completed => ExitCode::SUCCESS,
        _ => ExitCode::FAILURE,
    })
}

/// Print progress and command output to stderr, the notification to stdout.
async fn render_events(mut events_rx: UnboundedReceiver<Event>, total: usize) {
    while let Some(event) = events_rx.recv().await {
        match event {
            Event::StageStarted {
                stage_index,
                stage_name,
                ..
            } => {
                eprintln!(
                    "{}",
                    format!("==> [{}/{total}] {stage_name}", stage_index + 1).bold()
                );
            }
            Event::StageSkipped {
                stage_index,
                stage_name,
                ..
            } => {
                eprintln!(
                    "{}",
                    format!("--- [{}/{total}] {stage_name} skipped", stage_index + 1).dimmed()
                );
            }
            Event::StageFinished {
                stage_index,
                status: StageStatus::Failed,
                ..
            } => {
                eprintln!("{}", format!("!!! stage {} failed", stage_index + 1).red());
            }
            Event::ProcessLogChunk { content, .. } => {
                eprintln!("{content}");
            }
            Event::Notification {
                outcome, message, ..
            } => match outcome {
                Outcome::Success => println!("{}", message.green().bold()),
                Outcome::Failure => println!("{}", message.red().bold()),
            },
            _ => {}
        }
    }
}
