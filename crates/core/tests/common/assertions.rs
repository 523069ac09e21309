//! Custom assertion helpers for event streams.

#![allow(dead_code)]

use dk_protocol::ipc::{Event, Outcome};
use dk_protocol::process_models::StageStatus;

/// Drain everything currently queued on the receiver.
pub fn drain(rx: &mut tokio::sync::mpsc::UnboundedReceiver<Event>) -> Vec<Event> {
    std::iter::from_fn(|| rx.try_recv().ok()).collect()
}

/// Assert the run started first and ended with exactly one notification.
pub fn assert_event_sequence(events: &[Event], expected: Outcome) {
    assert!(
        matches!(events.first(), Some(Event::ProcessStarted { .. })),
        "First event should be ProcessStarted, got: {:?}",
        events.first()
    );

    let notifications: Vec<&Event> = events
        .iter()
        .filter(|e| matches!(e, Event::Notification { .. }))
        .collect();
    assert_eq!(notifications.len(), 1, "Expected exactly one notification");

    match events.last() {
        Some(Event::Notification { outcome, .. }) => assert_eq!(*outcome, expected),
        other => panic!("Last event should be Notification, got: {:?}", other),
    }
}

/// Names of the stages that emitted StageStarted, in order.
pub fn started_stages(events: &[Event]) -> Vec<String> {
    events
        .iter()
        .filter_map(|e| match e {
            Event::StageStarted { stage_name, .. } => Some(stage_name.clone()),
            _ => None,
        })
        .collect()
}

/// Names of the stages that emitted StageSkipped, in order.
pub fn skipped_stages(events: &[Event]) -> Vec<String> {
    events
        .iter()
        .filter_map(|e| match e {
            Event::StageSkipped { stage_name, .. } => Some(stage_name.clone()),
            _ => None,
        })
        .collect()
}

/// Final status reported for stage `index`.
pub fn finished_status(events: &[Event], index: usize) -> Option<StageStatus> {
    events.iter().rev().find_map(|e| match e {
        Event::StageFinished {
            stage_index,
            status,
            ..
        } if *stage_index == index => Some(*status),
        _ => None,
    })
}

/// All log lines, in order.
pub fn log_lines(events: &[Event]) -> Vec<String> {
    events
        .iter()
        .filter_map(|e| match e {
            Event::ProcessLogChunk { content, .. } => Some(content.clone()),
            _ => None,
        })
        .collect()
}
