//! Subcommand implementations.

pub mod init;
pub mod list;
pub mod plan;
pub mod run;

use dk_core::config::models::AppConfig;
use dk_core::plan::{RunContext, VENV_DIR_VAR};
use dk_protocol::pipeline_models::Pipeline;
use std::path::Path;

/// Parse a `KEY=VALUE` pair for `--env`.
pub fn parse_key_val(s: &str) -> Result<(String, String), String> {
    let (key, value) = s
        .split_once('=')
        .ok_or_else(|| format!("invalid KEY=VALUE: no `=` found in `{s}`"))?;
    if key.is_empty() {
        return Err(format!("invalid KEY=VALUE: empty key in `{s}`"));
    }
    Ok((key.to_string(), value.to_string()))
}

/// Build the run context for `pipeline`.
///
/// Layering, lowest first: built-in defaults, the pipeline's `environment`,
/// `VENV_DIR` from the process environment, then `--env` overrides.
pub fn run_context(
    root: &Path,
    config: &AppConfig,
    pipeline: &Pipeline,
    overrides: &[(String, String)],
) -> RunContext {
    let from_process = std::env::var(VENV_DIR_VAR)
        .ok()
        .filter(|value| !value.is_empty())
        .map(|value| (VENV_DIR_VAR.to_string(), value));

    RunContext::new(root, &config.global)
        .with_environment(&pipeline.environment)
        .with_overrides(from_process)
        .with_overrides(overrides.iter().cloned())
}
