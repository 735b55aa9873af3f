//! Classify HTTP status and curl errors into error kinds.

use super::error::SegmentError;
use super::policy::ErrorKind;
use crate::http::TransportError;

/// Classify an HTTP status code.
pub fn classify_http_status(code: u32) -> ErrorKind {
    match code {
        429 | 503 => ErrorKind::Throttled,
        500..=599 => ErrorKind::Http5xx(code as u16),
        _ => ErrorKind::Other,
    }
}

/// Classify a curl error.
pub fn classify_curl_error(e: &curl::Error) -> ErrorKind {
    if e.is_operation_timedout() {
        return ErrorKind::Timeout;
    }
    if e.is_couldnt_connect()
        || e.is_couldnt_resolve_host()
        || e.is_couldnt_resolve_proxy()
        || e.is_read_error()
        || e.is_recv_error()
        || e.is_send_error()
        || e.is_got_nothing()
        || e.is_partial_file()
    {
        return ErrorKind::Connection;
    }
    ErrorKind::Other
}

/// Classify a segment error.
pub fn classify(e: &SegmentError) -> ErrorKind {
    match e {
        SegmentError::Transport(TransportError::Curl(ce)) => classify_curl_error(ce),
        SegmentError::Transport(TransportError::Body(_)) => ErrorKind::Storage,
        SegmentError::Http(code) => classify_http_status(*code),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io;

    #[test]
    fn http_429_and_503_throttled() {
        assert_eq!(classify_http_status(429), ErrorKind::Throttled);
        assert_eq!(classify_http_status(503), ErrorKind::Throttled);
    }

    #[test]
    fn http_5xx() {
        assert_eq!(classify_http_status(500), ErrorKind::Http5xx(500));
        assert_eq!(classify_http_status(502), ErrorKind::Http5xx(502));
    }

    #[test]
    fn http_4xx_other() {
        assert_eq!(classify_http_status(404), ErrorKind::Other);
        assert_eq!(classify_http_status(416), ErrorKind::Other);
    }

    #[test]
    fn curl_connect_failure_is_connection() {
        // CURLE_COULDNT_CONNECT
        let e = SegmentError::Transport(TransportError::Curl(curl::Error::new(7)));
        assert_eq!(classify(&e), ErrorKind::Connection);
        // CURLE_OPERATION_TIMEDOUT
        let e = SegmentError::Transport(TransportError::Curl(curl::Error::new(28)));
        assert_eq!(classify(&e), ErrorKind::Timeout);
    }

    #[test]
    fn sink_failure_is_storage() {
        let e = SegmentError::Transport(TransportError::Body(io::Error::new(
            io::ErrorKind::Other,
            "disk full",
        )));
        assert_eq!(classify(&e), ErrorKind::Storage);
    }
}
