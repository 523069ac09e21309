//! Process state machine implementation.
//!
//! This module provides functions for managing the lifecycle of a Process,
//! including state transitions and event emission. Events are best-effort:
//! a dropped receiver never stops the pipeline.

use chrono::Utc;
use dk_protocol::ipc::{Event, Outcome};
use dk_protocol::pipeline_models::{Pipeline, PostActions};
use dk_protocol::process_models::{Process, ProcessStatus, StageRecord, StageStatus};
use tokio::sync::mpsc::UnboundedSender;
use uuid::Uuid;

/// Create a new Process with Pending status and one pending record per stage.
pub fn create_process(pipeline: &Pipeline) -> Process {
    Process {
        id: Uuid::new_v4(),
        pipeline_name: pipeline.name.clone(),
        status: ProcessStatus::Pending,
        current_stage: 0,
        stages: pipeline
            .stages
            .iter()
            .map(|stage| StageRecord::pending(stage.name.as_str()))
            .collect(),
        logs: Vec::new(),
        started_at: Utc::now(),
        completed_at: None,
        failure: None,
    }
}

fn emit_status(process: &Process, events_tx: &UnboundedSender<Event>) {
    let _ = events_tx.send(Event::ProcessStatusUpdate {
        process_id: process.id,
        status: process.status,
        stage_index: process.current_stage,
    });
}

/// Transition the process to Running status and emit events.
pub fn start_process(process: &mut Process, events_tx: &UnboundedSender<Event>) {
    let _ = events_tx.send(Event::ProcessStarted {
        process_id: process.id,
        pipeline_name: process.pipeline_name.clone(),
    });
    process.status = ProcessStatus::Running;
    emit_status(process, events_tx);
}

/// Mark stage `index` as running and make it the current stage.
pub fn begin_stage(process: &mut Process, index: usize, events_tx: &UnboundedSender<Event>) {
    process.current_stage = index;
    let Some(record) = process.stages.get_mut(index) else {
        return;
    };
    record.status = StageStatus::Running;
    record.started_at = Some(Utc::now());

    let _ = events_tx.send(Event::StageStarted {
        process_id: process.id,
        stage_index: index,
        stage_name: record.name.clone(),
    });
}

/// Record the outcome of stage `index`.
pub fn finish_stage(
    process: &mut Process,
    index: usize,
    status: StageStatus,
    exit_code: Option<i32>,
    events_tx: &UnboundedSender<Event>,
) {
    let Some(record) = process.stages.get_mut(index) else {
        return;
    };
    record.status = status;
    record.exit_code = exit_code;
    record.finished_at = Some(Utc::now());

    let _ = events_tx.send(Event::StageFinished {
        process_id: process.id,
        stage_index: index,
        status,
    });
}

/// Mark stage `index` as skipped (disabled, or never reached).
pub fn skip_stage(process: &mut Process, index: usize, events_tx: &UnboundedSender<Event>) {
    let Some(record) = process.stages.get_mut(index) else {
        return;
    };
    record.status = StageStatus::Skipped;

    let _ = events_tx.send(Event::StageSkipped {
        process_id: process.id,
        stage_index: index,
        stage_name: record.name.clone(),
    });
}

/// Mark the process as completed and emit events.
pub fn complete_process(process: &mut Process, events_tx: &UnboundedSender<Event>) {
    process.status = ProcessStatus::Completed;
    process.completed_at = Some(Utc::now());
    emit_status(process, events_tx);
    let _ = events_tx.send(Event::ProcessCompleted {
        process_id: process.id,
    });
}

/// Mark the process as failed and emit error event.
///
/// Stages that were still pending are marked skipped.
pub fn fail_process(process: &mut Process, events_tx: &UnboundedSender<Event>, error: String) {
    process.status = ProcessStatus::Failed;
    process.completed_at = Some(Utc::now());
    process.failure = Some(error.clone());

    for index in 0..process.stages.len() {
        if process.stages[index].status == StageStatus::Pending {
            skip_stage(process, index, events_tx);
        }
    }

    emit_status(process, events_tx);
    let _ = events_tx.send(Event::ProcessError {
        process_id: process.id,
        error,
    });
}

/// Append a log message to the process logs and emit event.
pub fn log_to_process(process: &mut Process, events_tx: &UnboundedSender<Event>, message: String) {
    let _ = events_tx.send(Event::ProcessLogChunk {
        process_id: process.id,
        content: message.clone(),
    });
    process.logs.push(message);
}

/// Emit the single post-run notification and return it.
///
/// Anything other than a Completed process counts as a failure.
pub fn notify(
    process: &mut Process,
    post: &PostActions,
    events_tx: &UnboundedSender<Event>,
) -> (Outcome, String) {
    let (outcome, message) = match process.status {
        ProcessStatus::Completed => (Outcome::Success, post.success.clone()),
        _ => (Outcome::Failure, post.failure.clone()),
    };

    process.logs.push(message.clone());
    let _ = events_tx.send(Event::Notification {
        process_id: process.id,
        outcome,
        message: message.clone(),
    });

    (outcome, message)
}

#[cfg(test)]
mod tests {
    use super::*;
    use dk_protocol::pipeline_models::{ShellStage, Stage, StageKind};
    use std::collections::BTreeMap;
    use tokio::sync::mpsc;

    fn pipeline(stage_names: &[&str]) -> Pipeline {
        Pipeline {
            name: "test-pipeline".to_string(),
            environment: BTreeMap::new(),
            stages: stage_names
                .iter()
                .map(|name| Stage {
                    name: name.to_string(),
                    enabled: true,
                    kind: StageKind::Shell(ShellStage {
                        run: vec!["true".to_string()],
                    }),
                })
                .collect(),
            post: PostActions::default(),
        }
    }

    #[test]
    fn test_create_process() {
        let process = create_process(&pipeline(&["a", "b"]));
        assert_eq!(process.pipeline_name, "test-pipeline");
        assert_eq!(process.status, ProcessStatus::Pending);
        assert_eq!(process.current_stage, 0);
        assert_eq!(process.stages.len(), 2);
        assert!(process
            .stages
            .iter()
            .all(|record| record.status == StageStatus::Pending));
        assert!(process.logs.is_empty());
    }

    #[test]
    fn test_start_process() {
        let mut process = create_process(&pipeline(&["a"]));
        let (tx, mut rx) = mpsc::unbounded_channel();

        start_process(&mut process, &tx);

        assert_eq!(process.status, ProcessStatus::Running);
        assert!(matches!(rx.try_recv().unwrap(), Event::ProcessStarted { .. }));
        assert!(matches!(
            rx.try_recv().unwrap(),
            Event::ProcessStatusUpdate {
                status: ProcessStatus::Running,
                stage_index: 0,
                ..
            }
        ));
    }

    #[test]
    fn test_stage_lifecycle() {
        let mut process = create_process(&pipeline(&["a", "b"]));
        let (tx, mut rx) = mpsc::unbounded_channel();

        begin_stage(&mut process, 1, &tx);
        assert_eq!(process.current_stage, 1);
        assert_eq!(process.stages[1].status, StageStatus::Running);
        assert!(process.stages[1].started_at.is_some());
        assert!(matches!(
            rx.try_recv().unwrap(),
            Event::StageStarted { stage_index: 1, stage_name, .. } if stage_name == "b"
        ));

        finish_stage(&mut process, 1, StageStatus::Succeeded, Some(0), &tx);
        assert_eq!(process.stages[1].status, StageStatus::Succeeded);
        assert_eq!(process.stages[1].exit_code, Some(0));
        assert!(process.stages[1].finished_at.is_some());
        assert!(matches!(
            rx.try_recv().unwrap(),
            Event::StageFinished {
                stage_index: 1,
                status: StageStatus::Succeeded,
                ..
            }
        ));
    }

    #[test]
    fn test_complete_process() {
        let mut process = create_process(&pipeline(&["a"]));
        let (tx, mut rx) = mpsc::unbounded_channel();

        complete_process(&mut process, &tx);

        assert_eq!(process.status, ProcessStatus::Completed);
        assert!(process.completed_at.is_some());

        let event1 = rx.try_recv().unwrap();
        assert!(matches!(
            event1,
            Event::ProcessStatusUpdate {
                status: ProcessStatus::Completed,
                ..
            }
        ));
        let event2 = rx.try_recv().unwrap();
        assert!(matches!(event2, Event::ProcessCompleted { .. }));
    }

    #[test]
    fn test_fail_process_skips_pending_stages() {
        let mut process = create_process(&pipeline(&["a", "b", "c"]));
        let (tx, mut rx) = mpsc::unbounded_channel();

        finish_stage(&mut process, 0, StageStatus::Failed, Some(1), &tx);
        let _ = rx.try_recv();

        fail_process(&mut process, &tx, "Test error".to_string());

        assert_eq!(process.status, ProcessStatus::Failed);
        assert_eq!(process.failure.as_deref(), Some("Test error"));
        assert_eq!(process.stages[0].status, StageStatus::Failed);
        assert_eq!(process.stages[1].status, StageStatus::Skipped);
        assert_eq!(process.stages[2].status, StageStatus::Skipped);

        let events: Vec<Event> = std::iter::from_fn(|| rx.try_recv().ok()).collect();
        assert_eq!(
            events
                .iter()
                .filter(|e| matches!(e, Event::StageSkipped { .. }))
                .count(),
            2
        );
        assert!(matches!(
            events.last(),
            Some(Event::ProcessError { error, .. }) if error == "Test error"
        ));
    }

    #[test]
    fn test_log_to_process() {
        let mut process = create_process(&pipeline(&["a"]));
        let (tx, mut rx) = mpsc::unbounded_channel();

        log_to_process(&mut process, &tx, "Test log message".to_string());

        assert_eq!(process.logs, vec!["Test log message".to_string()]);
        assert!(matches!(
            rx.try_recv().unwrap(),
            Event::ProcessLogChunk { content, .. } if content == "Test log message"
        ));
    }

    #[test]
    fn test_notify_uses_post_messages() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let post = PostActions::default();

        let mut process = create_process(&pipeline(&["a"]));
        complete_process(&mut process, &tx);
        assert_eq!(
            notify(&mut process, &post, &tx),
            (Outcome::Success, "Build succeeded!".to_string())
        );

        let mut process = create_process(&pipeline(&["a"]));
        fail_process(&mut process, &tx, "boom".to_string());
        assert_eq!(
            notify(&mut process, &post, &tx),
            (Outcome::Failure, "Build failed!".to_string())
        );

        let last = std::iter::from_fn(|| rx.try_recv().ok()).last();
        assert!(matches!(
            last,
            Some(Event::Notification { outcome: Outcome::Failure, message, .. }) if message == "Build failed!"
        ));
    }

    #[test]
    fn test_dropped_receiver_is_ignored() {
        let mut process = create_process(&pipeline(&["a"]));
        let (tx, rx) = mpsc::unbounded_channel();
        drop(rx);

        start_process(&mut process, &tx);
        log_to_process(&mut process, &tx, "still recorded".to_string());

        assert_eq!(process.status, ProcessStatus::Running);
        assert_eq!(process.logs.len(), 1);
    }
}
