//! # dive-timeline
//!
//! Reconciles the three append-only event logs written during an inspection
//! dive — tape device actions, diver/ROV movements, and inspection findings —
//! into one deduplicated, timecode-ordered narrative per recording unit.
//!
//! ## Architecture
//!
//! ```text
//! dive-timeline (this crate)
//! ├── models     ← raw event rows, TimelineEvent projection, EventSource seam
//! ├── timecode   ← HH:MM:SS ↔ elapsed-seconds conversion
//! ├── reconcile  ← identity-keyed dedup, cross-source merge, tape grouping
//! └── error      ← TimelineError
//! ```
//!
//! Rows are never edited in place: an edit is a new row sharing the
//! `(action, timecode)` identity of an earlier one. Reconciliation collapses
//! such rows, keeping the first row's logged time and the latest row's
//! content.

pub mod error;
pub mod models;
pub mod reconcile;
pub mod timecode;

pub use error::TimelineError;
pub use models::{
    EventSource, InspectionEvent, MovementEvent, SourceKind, TapeLogEvent, TimelineEvent,
};
pub use reconcile::{
    dedup_by_identity, TimelineReconciler, TimelineReport, ACTION_ANOMALY, ACTION_INSPECTION,
};
