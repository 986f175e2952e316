//! Raw event rows and the reconciled timeline projection.
//!
//! All three raw sources are append-only: rows are never updated in place.
//! An "edit" is a new row sharing the same action-and-timecode identity as
//! an earlier one; the reconciler collapses these (see `reconcile`).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::TimelineError;

/// Which append-only log a timeline event was projected from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SourceKind {
    TapeLog,
    Movement,
    Inspection,
}

/// An operator-logged tape device action ("Start Tape", "Pause", ...).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TapeLogEvent {
    pub tape_id: String,
    pub event_type: String,
    /// When the operator logged the action (write time, not tape time).
    pub event_time_utc: DateTime<Utc>,
    /// `HH:MM:SS` offset into the recording unit.
    pub timecode_start: String,
    pub counter_start: Option<String>,
    pub remarks: Option<String>,
}

/// A diver/ROV movement log entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MovementEvent {
    pub recording_unit_id: String,
    pub movement_type: String,
    pub event_time_utc: DateTime<Utc>,
    pub timecode: Option<String>,
    pub depth_meters: Option<f64>,
    pub remarks: Option<String>,
}

/// An inspection finding tied to a recording unit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InspectionEvent {
    pub recording_unit_id: String,
    pub record_id: String,
    pub event_time_utc: DateTime<Utc>,
    /// Inspection-specific timecode metadata, when captured.
    pub timecode: Option<String>,
    /// Tape counter reading, the first fallback time source.
    pub counter_value: Option<String>,
    /// Raw video time, the last-resort time source.
    pub video_time: Option<String>,
    pub is_anomaly: bool,
}

/// One reconciled, deduplicated entry in the merged narrative.
///
/// The only shape the report renderer consumes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimelineEvent {
    pub id: String,
    pub tape_id: String,
    pub source: SourceKind,
    pub timecode: Option<String>,
    pub action: String,
    pub remarks: Option<String>,
    pub depth_meters: Option<f64>,
    pub event_time_utc: DateTime<Utc>,
}

/// Query seam over the three event logs of a recording unit.
///
/// Each query returns its collection independently ordered by primary key,
/// not guaranteed time-ordered and not guaranteed duplicate-free. The query
/// layer performs no deduplication; merge semantics live entirely in the
/// reconciler.
pub trait EventSource {
    fn tape_logs(&self, recording_unit_id: &str) -> Result<Vec<TapeLogEvent>, TimelineError>;
    fn movement_logs(&self, recording_unit_id: &str) -> Result<Vec<MovementEvent>, TimelineError>;
    fn inspection_records(&self, recording_unit_id: &str)
        -> Result<Vec<InspectionEvent>, TimelineError>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn rows_use_camel_case_field_names() {
        let row = TapeLogEvent {
            tape_id: "tape-1".into(),
            event_type: "Start Tape".into(),
            event_time_utc: Utc.with_ymd_and_hms(2025, 3, 1, 10, 0, 0).unwrap(),
            timecode_start: "00:00:00".into(),
            counter_start: None,
            remarks: None,
        };

        let json = serde_json::to_value(&row).unwrap();
        assert_eq!(json["tapeId"], "tape-1");
        assert_eq!(json["eventType"], "Start Tape");
        assert_eq!(json["timecodeStart"], "00:00:00");
    }

    #[test]
    fn inspection_rows_round_trip() {
        let row = InspectionEvent {
            recording_unit_id: "tape-1".into(),
            record_id: "rec-9".into(),
            event_time_utc: Utc.with_ymd_and_hms(2025, 3, 1, 10, 20, 0).unwrap(),
            timecode: None,
            counter_value: Some("00:20:00".into()),
            video_time: None,
            is_anomaly: true,
        };

        let json = serde_json::to_string(&row).unwrap();
        let back: InspectionEvent = serde_json::from_str(&json).unwrap();
        assert_eq!(row, back);
    }
}
