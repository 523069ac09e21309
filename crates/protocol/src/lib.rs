//! # dk-protocol
//!
//! Core protocol definitions and data models for deploy-kit.
//!
//! This crate defines all shared data structures used for:
//! - Configuration file parsing (YAML pipelines, TOML config)
//! - Runtime process state management
//! - Event streaming from the core engine to the CLI
//!
//! ## Modules
//!
//! - [`config_models`]: Global configuration from config.toml
//! - [`pipeline_models`]: Pipeline definitions, stages and post actions
//! - [`process_models`]: Runtime process state and status
//! - [`ipc`]: Events emitted by the core while a pipeline runs
//!
//! ## Design Principles
//!
//! - Minimal dependencies: Only serde, chrono, and uuid
//! - Independent compilation: No dependencies on other deploy-kit crates

pub mod config_models;
pub mod ipc;
pub mod pipeline_models;
pub mod process_models;

// Re-export all public types for convenience
pub use config_models::*;
pub use ipc::*;
pub use pipeline_models::*;
pub use process_models::*;
