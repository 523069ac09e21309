use colored::Colorize;
use dk_core::config::loader::load_config;
use dk_core::config::CONFIG_DIR;
use std::path::Path;
use std::process::ExitCode;

pub async fn run(root: &Path) -> color_eyre::Result<ExitCode> {
    let config = load_config(root).await?;

    if config.pipelines.is_empty() {
        println!("No pipelines found in {CONFIG_DIR}/pipelines. Run `deploy-kit init` first.");
        return Ok(ExitCode::SUCCESS);
    }

    for pipeline in &config.pipelines {
        let is_default = config.global.default_pipeline.as_deref() == Some(pipeline.name.as_str());
        if is_default {
            println!("{} {}", pipeline.name.bold(), "(default)".dimmed());
        } else {
            println!("{}", pipeline.name.bold());
        }

        for (index, stage) in pipeline.stages.iter().enumerate() {
            let line = format!("  {}. {} [{}]", index + 1, stage.name, stage.kind.label());
            if stage.enabled {
                println!("{line}");
            } else {
                println!("{} {}", line.dimmed(), "(disabled)".dimmed());
            }
        }
    }

    Ok(ExitCode::SUCCESS)
}
