//! libcurl-backed `RequestExecutor`.
//!
//! One `Easy` handle per request, run on the calling thread. Redirects are not
//! followed unless enabled; global headers are applied as defaults beneath the
//! request's own headers.

use std::cell::{Cell, RefCell};
use std::io::{self, Write};
use std::str;
use std::time::Duration;

use super::parse::{content_length, parse_response_headers, parse_status_line};
use super::{Method, Request, RequestExecutor, Response, TransportError};
use crate::headers::HeaderList;

/// Transport settings for `CurlExecutor`.
#[derive(Debug, Clone, Copy)]
pub struct CurlOptions {
    pub connect_timeout: Duration,
    /// Hard wall-clock limit per request (None = no limit).
    pub timeout: Option<Duration>,
    /// Abort when throughput stays below this many bytes/s for `low_speed_time`.
    pub low_speed_limit: Option<u32>,
    pub low_speed_time: Duration,
    pub follow_redirects: bool,
    pub max_redirections: u32,
}

impl Default for CurlOptions {
    fn default() -> Self {
        Self {
            connect_timeout: Duration::from_secs(30),
            timeout: None,
            low_speed_limit: Some(1024),
            low_speed_time: Duration::from_secs(60),
            follow_redirects: false,
            max_redirections: 10,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct CurlExecutor {
    options: CurlOptions,
    global_headers: HeaderList,
}

impl CurlExecutor {
    pub fn new(options: CurlOptions) -> Self {
        Self {
            options,
            global_headers: HeaderList::new(),
        }
    }

    /// Adds a header sent with every request. An empty value removes it.
    pub fn set_global_header(&mut self, name: &str, value: &str) {
        if value.trim().is_empty() {
            self.global_headers.remove(name);
        } else {
            self.global_headers.set(name, value);
        }
    }

    pub fn global_headers(&self) -> &HeaderList {
        &self.global_headers
    }

    pub fn options(&self) -> &CurlOptions {
        &self.options
    }

    fn prepare(
        &self,
        request: &Request<'_>,
        headers: &HeaderList,
    ) -> Result<curl::easy::Easy, curl::Error> {
        let mut easy = curl::easy::Easy::new();
        easy.url(request.url)?;
        match request.method {
            Method::Get => easy.get(true)?,
            Method::Head => easy.nobody(true)?,
            Method::Post => easy.post(true)?,
            Method::Put | Method::Delete => easy.custom_request(request.method.as_str())?,
        }
        if let Some(data) = request.body {
            easy.post_fields_copy(data)?;
        }

        easy.follow_location(self.options.follow_redirects)?;
        if self.options.follow_redirects {
            easy.max_redirections(self.options.max_redirections)?;
        }
        easy.connect_timeout(self.options.connect_timeout)?;
        if let Some(timeout) = self.options.timeout {
            easy.timeout(timeout)?;
        }
        if let Some(limit) = self.options.low_speed_limit {
            easy.low_speed_limit(limit)?;
            easy.low_speed_time(self.options.low_speed_time)?;
        }

        let mut list = curl::easy::List::new();
        for (k, v) in headers.iter() {
            list.append(&format!("{}: {}", k, v))?;
        }
        if !headers.is_empty() {
            easy.http_headers(list)?;
        }
        Ok(easy)
    }
}

impl RequestExecutor for CurlExecutor {
    fn execute(
        &self,
        request: &Request<'_>,
        body: &mut dyn Write,
    ) -> Result<Response, TransportError> {
        let headers = request.headers.with_defaults(&self.global_headers);
        let mut easy = self.prepare(request, &headers)?;

        tracing::debug!(
            method = %request.method,
            url = request.url,
            headers = %headers,
            "http request"
        );

        let mut lines: Vec<String> = Vec::new();
        let status: Cell<Option<u32>> = Cell::new(None);
        let sink_error: RefCell<Option<io::Error>> = RefCell::new(None);

        let performed = {
            let mut transfer = easy.transfer();
            transfer.header_function(|data| {
                if let Ok(s) = str::from_utf8(data) {
                    let s = s.trim_end();
                    if s.starts_with("HTTP/") {
                        status.set(parse_status_line(s));
                    }
                    lines.push(s.to_string());
                }
                true
            })?;
            transfer.write_function(|data| {
                // Bodies of redirects and error responses never reach the sink.
                if !matches!(status.get(), Some(200..=299)) {
                    return Ok(data.len());
                }
                match body.write_all(data) {
                    Ok(()) => Ok(data.len()),
                    Err(e) => {
                        sink_error.borrow_mut().replace(e);
                        Ok(0)
                    }
                }
            })?;
            transfer.perform()
        };

        if let Err(e) = performed {
            if e.is_write_error() {
                if let Some(io_err) = sink_error.into_inner() {
                    return Err(TransportError::Body(io_err));
                }
            }
            tracing::debug!(url = request.url, error = %e, "http transport error");
            return Err(TransportError::Curl(e));
        }

        let (parsed_status, headers) = parse_response_headers(&lines);
        let status = match parsed_status {
            Some(code) => code,
            None => easy.response_code()?,
        };
        let content_length = content_length(&headers).or_else(|| {
            easy.content_length_download()
                .ok()
                .filter(|n| *n > 0.0)
                .map(|n| n as u64)
        });

        tracing::debug!(status, ?content_length, headers = %headers, "http response");

        Ok(Response {
            status,
            headers,
            content_length,
        })
    }
}
