//! Scaffolding for a new `.deploy-kit/` directory.
//!
//! `deploy-kit init` writes a global `config.toml` and the shipped pipeline
//! definitions from templates embedded at compile time:
//! - `config.toml` selecting `backend-deploy` as the default pipeline
//! - `pipelines/backend-deploy.yaml` (venv setup and service restart)
//! - `pipelines/smoke-check.yaml` (unless `--minimal`)
//!
//! # Example
//!
//! ```no_run
//! use dk_core::init::{generate_deploy_kit_structure, InitOptions};
//! use std::path::PathBuf;
//!
//! # fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let options = InitOptions {
//!     target_dir: PathBuf::from("."),
//!     force: false,
//!     minimal: false,
//! };
//!
//! let written = generate_deploy_kit_structure(&options)?;
//! println!("wrote {} files", written.len());
//! # Ok(())
//! # }
//! ```

pub mod error;
pub mod generator;
pub mod templates;

pub use error::{InitError, InitResult};
pub use generator::{generate_deploy_kit_structure, InitOptions};
pub use templates::{get_template, list_templates};
