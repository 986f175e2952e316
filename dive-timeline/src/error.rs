use thiserror::Error;

/// Errors surfaced by the timeline layer.
///
/// A single unavailable source never carries this error out of the
/// reconciler; it degrades to a partial merge instead. The variants here are
/// for the query seam and for callers that need the typed cause.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TimelineError {
    /// An event source could not be queried.
    #[error("event source unavailable: {0}")]
    SourceUnavailable(String),

    /// A query returned malformed rows.
    #[error("malformed event data: {0}")]
    MalformedEvent(String),
}
