//! Segment fetch error type.

use crate::http::TransportError;

/// Why a single segment attempt failed. Absorbed by the pass controller;
/// callers only ever see the aggregate incomplete-download error.
#[derive(Debug, thiserror::Error)]
pub enum SegmentError {
    /// Connection, timeout or body-sink failure.
    #[error(transparent)]
    Transport(#[from] TransportError),
    /// The server answered with a non-2xx status.
    #[error("HTTP {0}")]
    Http(u32),
}
