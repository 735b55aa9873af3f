//! The request-execution seam used by the download engine.
//!
//! A `RequestExecutor` issues exactly one HTTP request and streams the
//! response body into a caller-supplied writer. The engine never looks below
//! this trait; `CurlExecutor` is the libcurl-backed implementation.

mod curl_executor;
mod parse;

#[cfg(test)]
pub(crate) mod mock;

pub use curl_executor::{CurlExecutor, CurlOptions};
pub use parse::parse_response_headers;

use crate::headers::HeaderList;
use std::fmt;
use std::io::{self, Write};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    Get,
    Head,
    Post,
    Put,
    Delete,
}

impl Method {
    pub fn as_str(&self) -> &'static str {
        match self {
            Method::Get => "GET",
            Method::Head => "HEAD",
            Method::Post => "POST",
            Method::Put => "PUT",
            Method::Delete => "DELETE",
        }
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One outgoing request. Borrowed so per-segment requests cost one header clone.
#[derive(Debug, Clone, Copy)]
pub struct Request<'a> {
    pub method: Method,
    pub url: &'a str,
    pub headers: &'a HeaderList,
    pub body: Option<&'a [u8]>,
}

impl<'a> Request<'a> {
    pub fn get(url: &'a str, headers: &'a HeaderList) -> Self {
        Self {
            method: Method::Get,
            url,
            headers,
            body: None,
        }
    }

    pub fn head(url: &'a str, headers: &'a HeaderList) -> Self {
        Self {
            method: Method::Head,
            url,
            headers,
            body: None,
        }
    }
}

/// Status and headers of the final response (after any followed redirects).
#[derive(Debug, Clone, Default)]
pub struct Response {
    pub status: u32,
    pub headers: HeaderList,
    /// Advertised `Content-Length`, if the server sent one.
    pub content_length: Option<u64>,
}

impl Response {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Failure below the HTTP status level.
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    /// libcurl reported an error (connect, timeout, reset, ...).
    #[error("{0}")]
    Curl(#[from] ::curl::Error),
    /// The body sink rejected data (disk full, body overran the requested range, ...).
    #[error("writing response body: {0}")]
    Body(#[source] io::Error),
}

/// Issues a single HTTP request.
///
/// The response body is written to `body` only when the final status is 2xx;
/// error bodies are discarded so they can never land in a destination file.
/// A non-2xx status is returned as `Ok` with that status; only transport and
/// sink failures are `Err`.
pub trait RequestExecutor {
    fn execute(
        &self,
        request: &Request<'_>,
        body: &mut dyn Write,
    ) -> Result<Response, TransportError>;
}

impl<E: RequestExecutor + ?Sized> RequestExecutor for &E {
    fn execute(
        &self,
        request: &Request<'_>,
        body: &mut dyn Write,
    ) -> Result<Response, TransportError> {
        (**self).execute(request, body)
    }
}
