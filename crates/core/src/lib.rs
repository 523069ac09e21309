//! # dk-core
//!
//! Core deployment engine for deploy-kit.
//!
//! This crate provides:
//! - Configuration loading from the `.deploy-kit/` directory
//! - Requirements manifest checking
//! - Planning: turning pipeline stages into concrete commands
//! - Subprocess execution with streamed output
//! - The sequential, fail-fast pipeline engine
//! - Project initialization from embedded templates
//!
//! ## Modules
//!
//! - [`config`]: Configuration loading and validation
//! - [`manifest`]: Pinned requirements parsing
//! - [`plan`]: Stage expansion and `${VAR}` interpolation
//! - [`executor`]: Command runner trait and the subprocess implementation
//! - [`engine`]: Pipeline execution engine
//! - [`state`]: Process state transitions
//! - [`init`]: `.deploy-kit/` scaffolding

pub mod config;
pub mod engine;
pub mod executor;
pub mod init;
pub mod manifest;
pub mod plan;
pub mod state;
