//! Configuration models that aggregate all settings.
//!
//! This module provides the unified `AppConfig` structure that combines
//! global settings and pipeline definitions into a single configuration
//! object.

use crate::config::error::{ConfigError, ConfigResult};
use dk_protocol::config_models::GlobalConfig;
use dk_protocol::pipeline_models::Pipeline;

/// Unified application configuration loaded from `.deploy-kit/` directory.
///
/// This structure aggregates all configuration sources:
/// - `config.toml`: Global settings
/// - `pipelines/*.yaml`: Pipeline definitions
///
/// # Example
///
/// ```rust,no_run
/// use dk_core::config::loader::load_config;
/// use std::path::Path;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let config = load_config(Path::new(".")).await?;
/// println!("Loaded {} pipelines", config.pipelines.len());
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone, Default)]
pub struct AppConfig {
    /// Global settings from `config.toml`.
    pub global: GlobalConfig,

    /// All pipeline definitions loaded from `pipelines/*.yaml`, sorted by file name.
    pub pipelines: Vec<Pipeline>,
}

impl AppConfig {
    /// Look up a pipeline by its `name` field.
    pub fn find_pipeline(&self, name: &str) -> Option<&Pipeline> {
        self.pipelines.iter().find(|pipeline| pipeline.name == name)
    }

    /// Pick the pipeline to operate on.
    ///
    /// An explicit name wins, then `default-pipeline` from `config.toml`.
    /// With neither, a project holding exactly one pipeline uses it.
    pub fn select_pipeline(&self, requested: Option<&str>) -> ConfigResult<&Pipeline> {
        let name = requested.or(self.global.default_pipeline.as_deref());

        match name {
            Some(name) => self
                .find_pipeline(name)
                .ok_or_else(|| ConfigError::PipelineNotFound(name.to_string())),
            None => match self.pipelines.as_slice() {
                [only] => Ok(only),
                _ => Err(ConfigError::NoPipelineSelected {
                    available: self.pipelines.len(),
                }),
            },
        }
    }
}
