//! Minimal HTTP/1.1 server that supports HEAD and Range GET for integration tests.
//!
//! Serves a single static body at `/file.bin`. HEAD answers with
//! Content-Length (unless disabled); GET with `Range: bytes=X-Y` answers 206
//! with that slice. Ranges listed in `fail_ranges` answer 500 a set number of
//! times first. `/moved` answers 302 to `/file.bin`. Other methods answer 200
//! with body `ok`. Every request is logged, body included, so tests can
//! assert on what went over the wire.

#![allow(dead_code)]

use std::collections::HashMap;
use std::io::{Read, Write};
use std::net::{TcpListener, TcpStream};
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::Duration;

pub const FILE_PATH: &str = "/file.bin";
pub const MOVED_PATH: &str = "/moved";

#[derive(Debug, Clone)]
pub struct RangeServerOptions {
    /// If false, HEAD returns 405.
    pub head_allowed: bool,
    /// If false, HEAD omits Content-Length.
    pub advertise_length: bool,
    /// Range start offset -> number of GETs for that range answered with 500.
    pub fail_ranges: HashMap<u64, u32>,
    /// If true, every GET without a Range header answers 500.
    pub fail_whole: bool,
}

impl Default for RangeServerOptions {
    fn default() -> Self {
        Self {
            head_allowed: true,
            advertise_length: true,
            fail_ranges: HashMap::new(),
            fail_whole: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoggedRequest {
    pub method: String,
    pub path: String,
    /// Raw `Range` header value, if any.
    pub range: Option<String>,
    /// Every header, names lowercased.
    pub headers: Vec<(String, String)>,
    pub body: Vec<u8>,
}

impl LoggedRequest {
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v.as_str())
    }
}

pub struct RangeServer {
    /// URL of the served body.
    pub url: String,
    base: String,
    log: Arc<Mutex<Vec<LoggedRequest>>>,
}

impl RangeServer {
    /// URL answering 302 with `Location: /file.bin`.
    pub fn moved_url(&self) -> String {
        format!("{}{}", self.base, MOVED_PATH)
    }

    pub fn requests(&self) -> Vec<LoggedRequest> {
        self.log.lock().unwrap().clone()
    }

    pub fn gets(&self) -> Vec<LoggedRequest> {
        self.requests()
            .into_iter()
            .filter(|r| r.method == "GET")
            .collect()
    }
}

/// Starts a server in a background thread serving `body`. The server runs
/// until the process exits.
pub fn start(body: Vec<u8>) -> RangeServer {
    start_with_options(body, RangeServerOptions::default())
}

pub fn start_with_options(body: Vec<u8>, opts: RangeServerOptions) -> RangeServer {
    let listener = TcpListener::bind("127.0.0.1:0").expect("bind");
    let port = listener.local_addr().unwrap().port();
    let body = Arc::new(body);
    let log = Arc::new(Mutex::new(Vec::new()));
    let failures = Arc::new(Mutex::new(opts.fail_ranges.clone()));
    let thread_log = Arc::clone(&log);
    thread::spawn(move || {
        for stream in listener.incoming().flatten() {
            let body = Arc::clone(&body);
            let log = Arc::clone(&thread_log);
            let failures = Arc::clone(&failures);
            let opts = opts.clone();
            thread::spawn(move || handle(stream, &body, &opts, &log, &failures));
        }
    });
    let base = format!("http://127.0.0.1:{}", port);
    RangeServer {
        url: format!("{}{}", base, FILE_PATH),
        base,
        log,
    }
}

fn respond(stream: &mut TcpStream, status: &str, extra_headers: &str, body: &[u8]) {
    let head = format!(
        "HTTP/1.1 {}\r\nContent-Length: {}\r\n{}\r\n",
        status,
        body.len(),
        extra_headers
    );
    let _ = stream.write_all(head.as_bytes());
    let _ = stream.write_all(body);
}

fn handle(
    mut stream: TcpStream,
    body: &[u8],
    opts: &RangeServerOptions,
    log: &Mutex<Vec<LoggedRequest>>,
    failures: &Mutex<HashMap<u64, u32>>,
) {
    let _ = stream.set_read_timeout(Some(Duration::from_secs(2)));
    let _ = stream.set_write_timeout(Some(Duration::from_secs(2)));
    let Some(request) = read_request(&mut stream) else {
        return;
    };
    log.lock().unwrap().push(request.clone());
    let total = body.len() as u64;
    let is_head = request.method.eq_ignore_ascii_case("HEAD");

    if request.path == MOVED_PATH {
        let location = format!("Location: {}\r\n", FILE_PATH);
        respond(&mut stream, "302 Found", &location, b"");
        return;
    }

    if is_head {
        if !opts.head_allowed {
            respond(&mut stream, "405 Method Not Allowed", "", b"");
            return;
        }
        let length = if opts.advertise_length {
            format!("Content-Length: {}\r\n", total)
        } else {
            String::new()
        };
        let response = format!("HTTP/1.1 200 OK\r\n{}Accept-Ranges: bytes\r\n\r\n", length);
        let _ = stream.write_all(response.as_bytes());
        return;
    }

    if !request.method.eq_ignore_ascii_case("GET") {
        respond(&mut stream, "200 OK", "", b"ok");
        return;
    }

    let Some((start, end_incl)) = request.range.as_deref().and_then(parse_range) else {
        if opts.fail_whole {
            respond(&mut stream, "500 Internal Server Error", "", b"");
        } else {
            respond(&mut stream, "200 OK", "", body);
        }
        return;
    };

    {
        let mut failures = failures.lock().unwrap();
        if let Some(left) = failures.get_mut(&start) {
            if *left > 0 {
                *left -= 1;
                respond(&mut stream, "500 Internal Server Error", "", b"");
                return;
            }
        }
    }

    let end_incl = end_incl.min(total.saturating_sub(1));
    if start > end_incl || start >= total {
        let content_range = format!("Content-Range: bytes */{}\r\n", total);
        respond(
            &mut stream,
            "416 Range Not Satisfiable",
            &content_range,
            b"",
        );
        return;
    }
    let slice = &body[start as usize..=end_incl as usize];
    let content_range = format!("Content-Range: bytes {}-{}/{}\r\n", start, end_incl, total);
    respond(&mut stream, "206 Partial Content", &content_range, slice);
}

/// Reads the request head and, when `Content-Length` is present, its body.
fn read_request(stream: &mut TcpStream) -> Option<LoggedRequest> {
    let mut buf = Vec::new();
    let mut chunk = [0u8; 8192];
    let head_end = loop {
        let n = stream.read(&mut chunk).ok()?;
        if n == 0 {
            return None;
        }
        buf.extend_from_slice(&chunk[..n]);
        if let Some(pos) = buf.windows(4).position(|w| w == b"\r\n\r\n") {
            break pos + 4;
        }
    };

    let head = std::str::from_utf8(&buf[..head_end]).ok()?;
    let mut request = parse_head(head);
    let length = request
        .header("content-length")
        .and_then(|v| v.parse::<usize>().ok())
        .unwrap_or(0);
    let mut body = buf[head_end..].to_vec();
    while body.len() < length {
        let n = stream.read(&mut chunk).ok()?;
        if n == 0 {
            break;
        }
        body.extend_from_slice(&chunk[..n]);
    }
    request.body = body;
    Some(request)
}

fn parse_head(head: &str) -> LoggedRequest {
    let mut lines = head.lines();
    let mut request_line = lines.next().unwrap_or("").split_whitespace();
    let method = request_line.next().unwrap_or("").to_string();
    let path = request_line.next().unwrap_or("").to_string();
    let mut headers = Vec::new();
    for line in lines {
        let line = line.trim();
        if line.is_empty() {
            break;
        }
        if let Some((name, value)) = line.split_once(':') {
            headers.push((name.trim().to_ascii_lowercase(), value.trim().to_string()));
        }
    }
    let range = headers
        .iter()
        .find(|(n, _)| n == "range")
        .map(|(_, v)| v.clone());
    LoggedRequest {
        method,
        path,
        range,
        headers,
        body: Vec::new(),
    }
}

/// Parses `bytes=X-Y` into (start, end_inclusive). An open end means "to EOF".
fn parse_range(value: &str) -> Option<(u64, u64)> {
    let bounds = value.strip_prefix("bytes=")?;
    let (a, b) = bounds.split_once('-')?;
    let start = a.trim().parse::<u64>().ok()?;
    let b = b.trim();
    let end = if b.is_empty() {
        u64::MAX
    } else {
        b.parse::<u64>().ok()?
    };
    Some((start, end))
}
