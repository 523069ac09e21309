//! Runtime process state models.
//!
//! This module defines the structures for tracking the state of a running
//! pipeline execution.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Represents the current lifecycle status of a running pipeline process.
///
/// The status progresses through these states during normal execution:
/// Pending -> Running -> Completed
///
/// Any failing stage moves the process to Failed, which is terminal.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ProcessStatus {
    /// Process has been created but not started yet.
    Pending,

    /// Process is actively executing.
    Running,

    /// Every enabled stage exited successfully.
    Completed,

    /// A stage failed; later stages never ran.
    Failed,
}

/// Status of a single stage within a process.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum StageStatus {
    Pending,
    Running,
    Succeeded,
    Failed,
    /// Disabled in the pipeline definition, or never reached.
    Skipped,
}

/// Outcome record for one stage.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct StageRecord {
    pub name: String,
    pub status: StageStatus,

    /// Exit code of the last command the stage ran, if any.
    pub exit_code: Option<i32>,

    pub started_at: Option<DateTime<Utc>>,
    pub finished_at: Option<DateTime<Utc>>,
}

impl StageRecord {
    pub fn pending(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            status: StageStatus::Pending,
            exit_code: None,
            started_at: None,
            finished_at: None,
        }
    }
}

/// Represents the runtime state of a single pipeline execution.
///
/// Each time a pipeline is started, a new Process instance is created
/// with a unique ID to track its execution state.
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct Process {
    /// Unique identifier for this process execution.
    pub id: Uuid,

    /// Name of the pipeline being executed.
    ///
    /// References a pipeline defined in `.deploy-kit/pipelines/*.yaml`.
    pub pipeline_name: String,

    /// Current execution status.
    pub status: ProcessStatus,

    /// Zero-based index of the stage currently executing, or the stage that
    /// failed once the process is Failed.
    pub current_stage: usize,

    /// One record per stage in definition order.
    pub stages: Vec<StageRecord>,

    /// Accumulated log lines: command echoes, command output, status updates.
    pub logs: Vec<String>,

    pub started_at: DateTime<Utc>,
    pub completed_at: Option<DateTime<Utc>>,

    /// Description of the failure that stopped the pipeline.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub failure: Option<String>,
}

impl Process {
    /// Name of the stage that failed, if the process failed.
    pub fn failed_stage(&self) -> Option<&str> {
        self.stages
            .iter()
            .find(|record| record.status == StageStatus::Failed)
            .map(|record| record.name.as_str())
    }
}
