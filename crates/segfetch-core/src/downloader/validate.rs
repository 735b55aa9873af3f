//! Final completeness check.

use crate::error::DownloadError;

/// Succeeds iff `finished >= expected`. The destination is never touched here;
/// a partial file stays on disk for the caller to keep or remove.
pub fn validate(finished: u64, expected: u64) -> Result<(), DownloadError> {
    if finished >= expected {
        return Ok(());
    }
    Err(DownloadError::Incomplete { finished, expected })
}
