//! Test fixtures for projects on disk and the shipped pipelines.

use dk_core::config::CONFIG_DIR;
use dk_core::init::get_template;
use dk_core::plan::RunContext;
use dk_protocol::config_models::GlobalConfig;
use dk_protocol::pipeline_models::Pipeline;
use tempfile::TempDir;

/// A manifest pinning two packages exactly.
#[allow(dead_code)]
pub const PINNED_REQUIREMENTS: &str = "fastapi==0.100.0\nuvicorn==0.23.2\n";

/// Create a temporary project root, optionally with a `requirements.txt`.
///
/// Returns a TempDir that must be kept alive for the test duration.
#[allow(dead_code)]
pub fn create_test_project(requirements: Option<&str>) -> std::io::Result<TempDir> {
    let temp_dir = tempfile::tempdir()?;
    if let Some(content) = requirements {
        std::fs::write(temp_dir.path().join("requirements.txt"), content)?;
    }
    Ok(temp_dir)
}

/// Write a pipeline definition into the project's `.deploy-kit/pipelines/`.
#[allow(dead_code)]
pub fn write_pipeline(root: &std::path::Path, file_name: &str, yaml: &str) -> std::io::Result<()> {
    let dir = root.join(CONFIG_DIR).join("pipelines");
    std::fs::create_dir_all(&dir)?;
    std::fs::write(dir.join(file_name), yaml)
}

/// The shipped `backend-deploy` pipeline.
#[allow(dead_code)]
pub fn backend_deploy_pipeline() -> Pipeline {
    let yaml = get_template("pipelines/backend-deploy.yaml").unwrap();
    serde_yaml::from_str(&yaml).unwrap()
}

/// A run context rooted at `root` with the pipeline's environment applied.
#[allow(dead_code)]
pub fn context_for(root: &std::path::Path, pipeline: &Pipeline) -> RunContext {
    RunContext::new(root, &GlobalConfig::default()).with_environment(&pipeline.environment)
}
