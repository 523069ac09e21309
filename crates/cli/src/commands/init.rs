use clap::Args;
use colored::Colorize;
use dk_core::init::{generate_deploy_kit_structure, InitOptions};
use std::path::Path;
use std::process::ExitCode;

#[derive(Args)]
pub struct InitArgs {
    /// Overwrite the template files of an existing .deploy-kit/
    #[arg(long)]
    pub force: bool,

    /// Only write config.toml and the backend-deploy pipeline
    #[arg(long)]
    pub minimal: bool,
}

pub fn run(args: InitArgs, root: &Path) -> color_eyre::Result<ExitCode> {
    let options = InitOptions {
        target_dir: root.to_path_buf(),
        force: args.force,
        minimal: args.minimal,
    };

    let written = generate_deploy_kit_structure(&options)?;

    for path in &written {
        let shown = path.strip_prefix(root).unwrap_or(path);
        println!("  {} {}", "created".green(), shown.display());
    }
    println!(
        "Initialized deploy-kit in {}. Next: `deploy-kit plan`.",
        root.display()
    );

    Ok(ExitCode::SUCCESS)
}
