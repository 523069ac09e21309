use super::{parse_key_val, run_context};
use clap::Args;
use colored::Colorize;
use dk_core::config::loader::load_config;
use dk_core::plan::plan_pipeline;
use std::path::Path;
use std::process::ExitCode;

#[derive(Args)]
pub struct PlanArgs {
    /// Pipeline name (defaults to default-pipeline from config.toml)
    pub pipeline: Option<String>,

    /// Set a variable, overriding the pipeline's environment
    #[arg(long = "env", short = 'e', value_name = "KEY=VALUE", value_parser = parse_key_val)]
    pub env: Vec<(String, String)>,
}

pub async fn run(args: PlanArgs, root: &Path) -> color_eyre::Result<ExitCode> {
    let config = load_config(root).await?;
    let pipeline = config.select_pipeline(args.pipeline.as_deref())?;
    let ctx = run_context(root, &config, pipeline, &args.env);

    let plans = plan_pipeline(pipeline, &ctx)?;

    println!("{} {}", "Pipeline:".bold(), pipeline.name);
    println!("{} {}", "Directory:".bold(), ctx.working_dir.display());
    for plan in &plans {
        let header = format!("[{}] {} ({})", plan.index + 1, plan.name, plan.kind);
        if !plan.enabled {
            println!("{} {}", header.dimmed(), "skipped: disabled".dimmed());
            continue;
        }

        println!("{}", header.bold());
        for action in &plan.actions {
            println!("    {action}");
        }
    }
    println!(
        "{} on success: {:?}, on failure: {:?}",
        "Notify".bold(),
        pipeline.post.success,
        pipeline.post.failure
    );

    Ok(ExitCode::SUCCESS)
}
