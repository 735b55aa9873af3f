//! Length probe: HEAD request and metadata needed to plan a download.

use crate::headers::HeaderList;
use crate::http::{Request, RequestExecutor, Response};

/// Metadata from a successful HEAD request.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProbeResult {
    /// Advertised size; `None` when absent or zero.
    pub content_length: Option<u64>,
    /// True if the server sent `Accept-Ranges: bytes`.
    pub accept_ranges: bool,
    pub etag: Option<String>,
    pub last_modified: Option<String>,
    pub content_disposition: Option<String>,
}

impl ProbeResult {
    pub fn from_response(response: &Response) -> Self {
        let h = &response.headers;
        ProbeResult {
            content_length: response.content_length.filter(|n| *n > 0),
            accept_ranges: h
                .get("accept-ranges")
                .map(|v| v.eq_ignore_ascii_case("bytes"))
                .unwrap_or(false),
            etag: h.get("etag").map(|v| v.trim_matches('"').to_string()),
            last_modified: h.get("last-modified").map(str::to_string),
            content_disposition: h.get("content-disposition").map(str::to_string),
        }
    }

    /// Segmented downloads need a positive length.
    pub fn is_segmentable(&self) -> bool {
        self.content_length.is_some()
    }
}

/// Outcome of a HEAD request before status interpretation.
pub(crate) enum ProbeOutcome {
    Ok(ProbeResult),
    Status(u32),
}

/// Sends HEAD with `headers` (minus any `Range`, which would shrink the
/// advertised length).
pub(crate) fn probe<E: RequestExecutor + ?Sized>(
    executor: &E,
    url: &str,
    headers: &HeaderList,
) -> Result<ProbeOutcome, crate::http::TransportError> {
    let mut headers = headers.clone();
    headers.remove(crate::headers::RANGE);
    let response = executor.execute(&Request::head(url, &headers), &mut std::io::sink())?;
    if !response.is_success() {
        return Ok(ProbeOutcome::Status(response.status));
    }
    let result = ProbeResult::from_response(&response);
    tracing::debug!(
        url,
        content_length = ?result.content_length,
        accept_ranges = result.accept_ranges,
        "probe complete"
    );
    Ok(ProbeOutcome::Ok(result))
}
