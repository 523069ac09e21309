//! Event protocol between the core engine and its front end.
//!
//! The engine reports every state change through an `Event` channel so the
//! CLI can stream progress while the pipeline runs. The engine never blocks
//! on a missing receiver: events are best-effort, the returned `Process` is
//! the source of truth.
//!
//! Uses tagged enum serialization:
//! ```json
//! {
//!   "type": "stageFinished",
//!   "payload": {
//!     "process_id": "uuid-here",
//!     "stage_index": 1,
//!     "status": "FAILED"
//!   }
//! }
//! ```

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::process_models::{ProcessStatus, StageStatus};

/// Overall result announced by the final notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Outcome {
    Success,
    Failure,
}

/// Events sent from the core engine to the front end.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", content = "payload", rename_all = "camelCase")]
pub enum Event {
    /// A new process has been started.
    ProcessStarted {
        process_id: Uuid,
        pipeline_name: String,
    },

    /// A process's status has changed.
    ProcessStatusUpdate {
        process_id: Uuid,
        status: ProcessStatus,
        stage_index: usize,
    },

    /// An enabled stage began executing.
    StageStarted {
        process_id: Uuid,
        stage_index: usize,
        stage_name: String,
    },

    /// A stage reached Succeeded or Failed.
    StageFinished {
        process_id: Uuid,
        stage_index: usize,
        status: StageStatus,
    },

    /// A stage was not executed.
    StageSkipped {
        process_id: Uuid,
        stage_index: usize,
        stage_name: String,
    },

    /// A process has produced new log output.
    ProcessLogChunk { process_id: Uuid, content: String },

    /// A process has completed successfully.
    ProcessCompleted { process_id: Uuid },

    /// A process has encountered an error.
    ProcessError { process_id: Uuid, error: String },

    /// The single post-run success/failure line.
    Notification {
        process_id: Uuid,
        outcome: Outcome,
        message: String,
    },
}
