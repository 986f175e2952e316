//! Identity-keyed merge of the three event logs into one ordered narrative.
//!
//! The source system has no update-in-place for logged events: editing is
//! inserting a new row with the same `(action, timecode)` identity. The
//! merge makes that contract explicit — the first-seen row keeps its logged
//! time, the most recent row keeps its content — and sorts everything on a
//! single timecode axis.

use std::collections::HashMap;

use crate::models::{
    EventSource, InspectionEvent, MovementEvent, SourceKind, TapeLogEvent, TimelineEvent,
};
use crate::timecode;

/// Action assigned to findings flagged as a defect.
pub const ACTION_ANOMALY: &str = "ANOMALY";
/// Action assigned to ordinary findings.
pub const ACTION_INSPECTION: &str = "INSPECTION";

/// Result of reconciling one recording unit.
#[derive(Debug, Clone, PartialEq)]
pub struct TimelineReport {
    pub recording_unit_id: String,
    /// Merged, deduplicated events, ascending by timecode.
    pub events: Vec<TimelineEvent>,
    /// Sources whose query failed; the merge proceeded without them.
    pub skipped_sources: Vec<SourceKind>,
}

impl TimelineReport {
    /// Group events by tape for display, preserving merge order within and
    /// across groups (first appearance decides group order).
    pub fn group_by_tape(&self) -> Vec<(String, Vec<TimelineEvent>)> {
        let mut groups: Vec<(String, Vec<TimelineEvent>)> = Vec::new();
        for event in &self.events {
            match groups.iter_mut().find(|(tape, _)| *tape == event.tape_id) {
                Some((_, events)) => events.push(event.clone()),
                None => groups.push((event.tape_id.clone(), vec![event.clone()])),
            }
        }
        groups
    }
}

/// Pull-triggered batch reconciler; holds no state between invocations.
pub struct TimelineReconciler<S: EventSource> {
    source: S,
}

impl<S: EventSource> TimelineReconciler<S> {
    pub fn new(source: S) -> Self {
        Self { source }
    }

    /// Merge the unit's three event logs into one ordered, deduplicated
    /// timeline.
    ///
    /// A failed source query is logged, recorded in `skipped_sources`, and
    /// skipped; partial information is preferred over failing the report.
    pub fn reconcile(&self, recording_unit_id: &str) -> TimelineReport {
        let mut skipped = Vec::new();

        let mut tape_logs = match self.source.tape_logs(recording_unit_id) {
            Ok(rows) => rows,
            Err(err) => {
                log::warn!("tape log query failed for {}: {}", recording_unit_id, err);
                skipped.push(SourceKind::TapeLog);
                Vec::new()
            }
        };
        let movements = match self.source.movement_logs(recording_unit_id) {
            Ok(rows) => rows,
            Err(err) => {
                log::warn!("movement log query failed for {}: {}", recording_unit_id, err);
                skipped.push(SourceKind::Movement);
                Vec::new()
            }
        };
        let inspections = match self.source.inspection_records(recording_unit_id) {
            Ok(rows) => rows,
            Err(err) => {
                log::warn!("inspection query failed for {}: {}", recording_unit_id, err);
                skipped.push(SourceKind::Inspection);
                Vec::new()
            }
        };

        // operator write order decides which duplicate row is "most recent"
        tape_logs.sort_by_key(|e| e.event_time_utc);

        let mut events = dedup_by_identity(tape_logs.iter().map(project_tape_log).collect());
        events.extend(dedup_by_identity(movements.iter().map(project_movement).collect()));
        events.extend(dedup_by_identity(inspections.iter().map(project_inspection).collect()));

        // single ordering key for all sources; missing or unparseable
        // timecodes sort last, ties keep original relative order
        events.sort_by_key(ordering_seconds);

        TimelineReport {
            recording_unit_id: recording_unit_id.to_string(),
            events,
            skipped_sources: skipped,
        }
    }
}

fn ordering_seconds(event: &TimelineEvent) -> u64 {
    event
        .timecode
        .as_deref()
        .and_then(timecode::to_seconds)
        .unwrap_or(u64::MAX)
}

/// Collapse rows sharing an `(action, timecode)` identity within a tape.
///
/// The first-seen row wins `event_time_utc` (when the event was originally
/// logged); the most recent row wins the content fields (`remarks`,
/// `depth_meters`). Input order must already reflect write order. The key is
/// scoped by tape so identical actions on different tapes of one unit never
/// collapse into each other.
pub fn dedup_by_identity(events: Vec<TimelineEvent>) -> Vec<TimelineEvent> {
    let mut out: Vec<TimelineEvent> = Vec::with_capacity(events.len());
    let mut seen: HashMap<(String, String, Option<String>), usize> = HashMap::new();

    for event in events {
        let key = (event.tape_id.clone(), event.action.clone(), event.timecode.clone());
        match seen.get(&key) {
            Some(&index) => {
                out[index].remarks = event.remarks;
                out[index].depth_meters = event.depth_meters;
            }
            None => {
                seen.insert(key, out.len());
                out.push(event);
            }
        }
    }
    out
}

fn project_tape_log(event: &TapeLogEvent) -> TimelineEvent {
    TimelineEvent {
        id: uuid::Uuid::new_v4().to_string(),
        tape_id: event.tape_id.clone(),
        source: SourceKind::TapeLog,
        timecode: Some(event.timecode_start.clone()),
        action: event.event_type.clone(),
        remarks: event.remarks.clone(),
        depth_meters: None,
        event_time_utc: event.event_time_utc,
    }
}

fn project_movement(event: &MovementEvent) -> TimelineEvent {
    TimelineEvent {
        id: uuid::Uuid::new_v4().to_string(),
        tape_id: event.recording_unit_id.clone(),
        source: SourceKind::Movement,
        timecode: event.timecode.clone(),
        action: event.movement_type.clone(),
        remarks: event.remarks.clone(),
        depth_meters: event.depth_meters,
        event_time_utc: event.event_time_utc,
    }
}

/// Findings fall back through three time sources: inspection metadata, then
/// the stored tape counter, then the raw video time.
fn project_inspection(event: &InspectionEvent) -> TimelineEvent {
    let timecode = event
        .timecode
        .clone()
        .or_else(|| event.counter_value.clone())
        .or_else(|| event.video_time.clone());
    TimelineEvent {
        id: uuid::Uuid::new_v4().to_string(),
        tape_id: event.recording_unit_id.clone(),
        source: SourceKind::Inspection,
        timecode,
        action: if event.is_anomaly { ACTION_ANOMALY } else { ACTION_INSPECTION }.to_string(),
        remarks: Some(event.record_id.clone()),
        depth_meters: None,
        event_time_utc: event.event_time_utc,
    }
}
