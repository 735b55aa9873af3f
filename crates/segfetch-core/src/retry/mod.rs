//! Retry pass policy and failure classification.
//!
//! Failed segments are never retried in place; they are deferred to the next
//! pass. `RetryPolicy` decides how many extra passes run and how long to wait
//! before each, and `classify` labels failures for logs and summaries.

mod classify;
mod error;
mod policy;

pub use classify::{classify, classify_curl_error, classify_http_status};
pub use error::SegmentError;
pub use policy::{ErrorKind, PassDecision, RetryPolicy, DEFAULT_RETRY_PASSES};
