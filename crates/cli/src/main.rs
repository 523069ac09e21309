//! `deploy-kit`: run declarative deployment pipelines for Python services.

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::process::ExitCode;

mod commands;
mod logging;

use commands::{init, list, plan, run};

#[derive(Parser)]
#[command(name = "deploy-kit")]
#[command(version)]
#[command(about = "Rebuild a Python virtualenv and restart its systemd service, fail-fast")]
struct Cli {
    /// Print debug logs to stderr (RUST_LOG takes precedence)
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Project root containing .deploy-kit/ (defaults to the current directory)
    #[arg(short = 'C', long = "dir", global = true, value_name = "DIR")]
    dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create .deploy-kit/ with the shipped pipelines
    Init(init::InitArgs),
    /// List pipelines and their stages
    List,
    /// Show the commands a pipeline would run, without running them
    Plan(plan::PlanArgs),
    /// Run a pipeline
    Run(run::RunArgs),
}

#[tokio::main]
async fn main() -> color_eyre::Result<ExitCode> {
    color_eyre::install()?;

    let cli = Cli::parse();
    logging::init_cli_logger(cli.verbose);

    let root = match cli.dir {
        Some(dir) => dir,
        None => std::env::current_dir()?,
    };
    tracing::debug!(root = %root.display(), "starting");

    match cli.command {
        Commands::Init(args) => init::run(args, &root),
        Commands::List => list::run(&root).await,
        Commands::Plan(args) => plan::run(args, &root).await,
        Commands::Run(args) => run::run(args, &root).await,
    }
}
