//! Global configuration models for `.deploy-kit/config.toml`.
//!
//! This module defines the structure of the global configuration file that
//! controls project-wide settings for deploy-kit.

use serde::Deserialize;
use serde::Serialize;

fn default_shell() -> String {
    "sh".to_string()
}

/// Represents global settings from `.deploy-kit/config.toml`.
///
/// # Example
///
/// ```toml
/// # .deploy-kit/config.toml
/// default-pipeline = "backend-deploy"
/// shell = "bash"
/// ```
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub struct GlobalConfig {
    /// Pipeline to run when `deploy-kit run` is given no name.
    #[serde(default)]
    pub default_pipeline: Option<String>,

    /// Program used to interpret `shell` stage command lines (`<shell> -c <line>`).
    #[serde(default = "default_shell")]
    pub shell: String,
}

impl Default for GlobalConfig {
    fn default() -> Self {
        Self {
            default_pipeline: None,
            shell: default_shell(),
        }
    }
}
