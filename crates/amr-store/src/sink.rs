//! Store boundary: the write and history traits plus their error type.
//!
//! No concrete store, no HTTP and no encoding belong here.

use std::fmt;

use amr_reconcile::HistoricalRow;
use amr_schemas::Point;
use chrono::Duration;

// ---------------------------------------------------------------------------
// Error type
// ---------------------------------------------------------------------------

/// Errors a [`PointSink`] or [`HistorySource`] may return.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    /// Network or transport failure.
    Transport(String),
    /// The store answered with a non-success status or an error payload.
    Api { status: Option<u16>, message: String },
    /// A response payload could not be decoded.
    Decode(String),
    /// A point could not be rendered for the wire.
    Encode(String),
}

impl fmt::Display for StoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StoreError::Transport(msg) => write!(f, "transport error: {msg}"),
            StoreError::Api {
                status: Some(s),
                message,
            } => write!(f, "store api error status={s}: {message}"),
            StoreError::Api {
                status: None,
                message,
            } => write!(f, "store api error: {message}"),
            StoreError::Decode(msg) => write!(f, "decode error: {msg}"),
            StoreError::Encode(msg) => write!(f, "encode error: {msg}"),
        }
    }
}

impl std::error::Error for StoreError {}

// ---------------------------------------------------------------------------
// Traits
// ---------------------------------------------------------------------------

/// Destination for emitted points.
///
/// One call per input message. Implementations must not retry; a failed
/// write is reported and the points are dropped by the caller.
#[async_trait::async_trait]
pub trait PointSink: Send + Sync {
    async fn write_points(&self, points: &[Point]) -> Result<(), StoreError>;
}

/// Recent history used to warm-start the meter registry.
#[async_trait::async_trait]
pub trait HistorySource: Send + Sync {
    /// Rows recorded within `window` of now.
    async fn fetch_recent(&self, window: Duration) -> Result<Vec<HistoricalRow>, StoreError>;
}
