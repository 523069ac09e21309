//! Error types for configuration loading.
//!
//! This module defines all errors that can occur during configuration file
//! parsing, validation and pipeline selection.

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur during configuration loading.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Failed to read a configuration file from disk.
    #[error("Failed to read config file at {path}: {source}")]
    FileRead {
        path: PathBuf,
        source: std::io::Error,
    },

    /// Failed to parse TOML configuration.
    #[error("Failed to parse TOML file at {path}: {source}")]
    TomlParse {
        path: PathBuf,
        source: toml::de::Error,
    },

    /// Failed to parse YAML configuration.
    #[error("Failed to parse YAML file at {path}: {source}")]
    YamlParse {
        path: PathBuf,
        source: serde_yaml::Error,
    },

    /// Failed to walk directory structure.
    #[error("Failed to traverse directory {path}: {source}")]
    DirectoryWalk {
        path: PathBuf,
        source: walkdir::Error,
    },

    /// Invalid configuration structure or missing required fields.
    #[error("Invalid configuration in {path}: {reason}")]
    InvalidConfig { path: PathBuf, reason: String },

    /// Two pipeline files declare the same name.
    #[error("Pipeline '{name}' is defined in both {first} and {second}")]
    DuplicatePipeline {
        name: String,
        first: PathBuf,
        second: PathBuf,
    },

    /// The requested pipeline does not exist.
    #[error("Pipeline '{0}' not found. Run `deploy-kit list` to see available pipelines.")]
    PipelineNotFound(String),

    /// No pipeline was named and none could be chosen automatically.
    #[error("No pipeline selected: pass a pipeline name or set default-pipeline in .deploy-kit/config.toml ({available} pipelines available)")]
    NoPipelineSelected { available: usize },
}

/// Type alias for Result with ConfigError.
pub type ConfigResult<T> = Result<T, ConfigError>;
