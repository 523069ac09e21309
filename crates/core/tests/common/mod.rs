//! Common test utilities shared by the integration tests.
//!
//! - Test fixtures (projects on disk, shipped pipelines)
//! - Custom assertions over event streams
//! - A scripted command runner that records instead of executing

pub mod assertions;
pub mod fixtures;
pub mod scripted_runner;

#[allow(unused_imports)]
pub use assertions::*;
#[allow(unused_imports)]
pub use fixtures::*;
#[allow(unused_imports)]
pub use scripted_runner::*;
