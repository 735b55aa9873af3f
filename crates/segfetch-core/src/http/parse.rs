//! Parse raw response header lines collected by libcurl.

use crate::headers::HeaderList;

/// Splits collected header lines into the final status code and header list.
///
/// libcurl reports the headers of every response in a redirect chain (and
/// interim `100 Continue` responses); each status line starts a new block, so
/// only the last block is kept.
pub fn parse_response_headers(lines: &[String]) -> (Option<u32>, HeaderList) {
    let mut status = None;
    let mut headers = HeaderList::new();

    for line in lines {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        if line.starts_with("HTTP/") {
            status = parse_status_line(line);
            headers = HeaderList::new();
            continue;
        }
        if let Some((name, value)) = line.split_once(':') {
            headers.set(name, value);
        }
    }

    (status, headers)
}

/// `HTTP/1.1 206 Partial Content` -> `Some(206)`.
pub(crate) fn parse_status_line(line: &str) -> Option<u32> {
    line.split_whitespace().nth(1)?.parse().ok()
}

/// `Content-Length` as a non-negative integer; malformed values count as absent.
pub(crate) fn content_length(headers: &HeaderList) -> Option<u64> {
    headers.get("content-length")?.trim().parse().ok()
}
