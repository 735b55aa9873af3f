//! In-process scripted executor for unit tests.

use std::cell::RefCell;
use std::collections::HashMap;
use std::io::Write;

use super::{Method, Request, RequestExecutor, Response, TransportError};
use crate::headers::{HeaderList, RANGE};

/// How an unranged GET is answered when it should fail.
#[derive(Debug, Clone, Copy)]
enum WholeFailure {
    Status(u32),
    Transport,
}

#[derive(Debug, Clone)]
pub(crate) struct Logged {
    pub method: Method,
    pub range: Option<String>,
}

/// Serves `body` like a range-capable server, with per-range failure scripts.
pub(crate) struct ScriptedExecutor {
    body: Vec<u8>,
    advertise_length: bool,
    head_status: u32,
    ignore_range: bool,
    /// range start -> remaining attempts answered with HTTP 503
    http_failures: RefCell<HashMap<u64, u32>>,
    /// range start -> remaining attempts failing at the transport level
    transport_failures: RefCell<HashMap<u64, u32>>,
    /// range start -> number of bytes actually sent
    short: HashMap<u64, usize>,
    whole_failure: Option<WholeFailure>,
    log: RefCell<Vec<Logged>>,
}

impl ScriptedExecutor {
    pub fn new(body: Vec<u8>) -> Self {
        Self {
            body,
            advertise_length: true,
            head_status: 200,
            ignore_range: false,
            http_failures: RefCell::new(HashMap::new()),
            transport_failures: RefCell::new(HashMap::new()),
            short: HashMap::new(),
            whole_failure: None,
            log: RefCell::new(Vec::new()),
        }
    }

    pub fn without_length(mut self) -> Self {
        self.advertise_length = false;
        self
    }

    pub fn head_status(mut self, status: u32) -> Self {
        self.head_status = status;
        self
    }

    pub fn ignore_range(mut self) -> Self {
        self.ignore_range = true;
        self
    }

    pub fn fail_http(self, start: u64, times: u32) -> Self {
        self.http_failures.borrow_mut().insert(start, times);
        self
    }

    pub fn fail_transport(self, start: u64, times: u32) -> Self {
        self.transport_failures.borrow_mut().insert(start, times);
        self
    }

    /// Every GET without a `Range` header answers with `status`.
    pub fn fail_whole_status(mut self, status: u32) -> Self {
        self.whole_failure = Some(WholeFailure::Status(status));
        self
    }

    /// Every GET without a `Range` header fails before any body arrives.
    pub fn fail_whole_transport(mut self) -> Self {
        self.whole_failure = Some(WholeFailure::Transport);
        self
    }

    pub fn short_body(mut self, start: u64, sent: usize) -> Self {
        self.short.insert(start, sent);
        self
    }

    pub fn requests(&self) -> Vec<Logged> {
        self.log.borrow().clone()
    }

    pub fn count(&self, method: Method) -> usize {
        self.log.borrow().iter().filter(|l| l.method == method).count()
    }

    fn take_failure(map: &RefCell<HashMap<u64, u32>>, start: u64) -> bool {
        let mut map = map.borrow_mut();
        match map.get_mut(&start) {
            Some(n) if *n > 0 => {
                *n -= 1;
                true
            }
            _ => false,
        }
    }
}

fn parse_range(value: &str) -> Option<(u64, u64)> {
    let (a, b) = value.strip_prefix("bytes=")?.split_once('-')?;
    Some((a.parse().ok()?, b.parse().ok()?))
}

impl RequestExecutor for ScriptedExecutor {
    fn execute(
        &self,
        request: &Request<'_>,
        body: &mut dyn Write,
    ) -> Result<Response, TransportError> {
        let range_value = request.headers.get(RANGE).map(str::to_string);
        self.log.borrow_mut().push(Logged {
            method: request.method,
            range: range_value.clone(),
        });
        let total = self.body.len() as u64;

        if request.method == Method::Head {
            return Ok(Response {
                status: self.head_status,
                headers: HeaderList::new(),
                content_length: self.advertise_length.then_some(total),
            });
        }

        let range = range_value.as_deref().and_then(parse_range);
        let (status, slice) = match range {
            Some((start, end)) if !self.ignore_range => {
                if Self::take_failure(&self.transport_failures, start) {
                    return Err(TransportError::Curl(::curl::Error::new(7)));
                }
                if Self::take_failure(&self.http_failures, start) {
                    return Ok(Response {
                        status: 503,
                        ..Response::default()
                    });
                }
                let end_excl = (end + 1).min(total) as usize;
                let mut slice = &self.body[start as usize..end_excl];
                if let Some(&sent) = self.short.get(&start) {
                    slice = &slice[..sent.min(slice.len())];
                }
                (206, slice)
            }
            _ => {
                match self.whole_failure.filter(|_| range.is_none()) {
                    Some(WholeFailure::Status(status)) => {
                        return Ok(Response {
                            status,
                            ..Response::default()
                        })
                    }
                    Some(WholeFailure::Transport) => {
                        return Err(TransportError::Curl(::curl::Error::new(56)))
                    }
                    None => {}
                }
                (200, &self.body[..])
            }
        };

        body.write_all(slice).map_err(TransportError::Body)?;
        Ok(Response {
            status,
            headers: HeaderList::new(),
            content_length: Some(slice.len() as u64),
        })
    }
}
