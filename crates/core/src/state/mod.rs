//! State management for pipeline processes.
//!
//! This module provides the process state machine: every transition updates
//! the `Process` record and emits the matching event.

pub mod process;
