//! Configuration loading and management.
//!
//! This module provides functionality to load, validate and select pipeline
//! definitions from the `.deploy-kit/` directory structure.

pub mod error;
pub mod loader;
pub mod models;
pub mod validate;

/// Name of the per-project configuration directory.
pub const CONFIG_DIR: &str = ".deploy-kit";
