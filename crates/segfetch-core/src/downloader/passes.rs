//! Pass controller: initial pass plus retry passes over failed ranges.

use std::thread;

use super::segment::fetch_segment;
use super::DownloadSummary;
use crate::headers::HeaderList;
use crate::http::RequestExecutor;
use crate::progress::{ProgressEvent, ProgressObserver};
use crate::retry::{classify, ErrorKind, PassDecision, RetryPolicy};
use crate::segmenter::ByteRange;
use crate::storage::StorageWriter;

/// State of one segmented download call.
pub(crate) struct Session<'a> {
    pub url: &'a str,
    pub headers: &'a HeaderList,
    pub expected_total: u64,
    /// Sum of bytes written by successful attempts. Only grows.
    pub finished: u64,
    /// Ranges for the next pass; after `run_passes`, the abandoned ones.
    pub pending: Vec<ByteRange>,
}

impl<'a> Session<'a> {
    pub fn new(
        url: &'a str,
        headers: &'a HeaderList,
        expected_total: u64,
        planned: Vec<ByteRange>,
    ) -> Self {
        Self {
            url,
            headers,
            expected_total,
            finished: 0,
            pending: planned,
        }
    }
}

/// Attempts every pending range once per pass, in order, deferring failures to
/// the next pass until the policy stops. Ranges keep their planned bounds.
/// The observer sees every attempt, synchronously and in order.
pub(crate) fn run_passes<E: RequestExecutor + ?Sized>(
    executor: &E,
    session: &mut Session<'_>,
    storage: &StorageWriter,
    policy: &RetryPolicy,
    mut progress: Option<&mut dyn ProgressObserver>,
) -> DownloadSummary {
    let mut summary = DownloadSummary::default();
    let mut pass = 0u32;

    loop {
        let pending = std::mem::take(&mut session.pending);
        let attempted = pending.len();
        let mut failed = Vec::new();

        for planned in pending {
            let outcome = fetch_segment(executor, session.url, session.headers, planned, storage);
            summary.attempts += 1;
            let range = outcome.range;
            match &outcome.error {
                None => session.finished += outcome.bytes_written,
                Some(e) => {
                    let kind = classify(e);
                    match kind {
                        ErrorKind::Throttled => summary.throttle_events += 1,
                        ErrorKind::Other => {}
                        _ => summary.error_events += 1,
                    }
                    summary.failed_attempts += 1;
                    tracing::warn!(
                        pass,
                        range = %range,
                        ?kind,
                        error = %e,
                        "segment attempt failed"
                    );
                    failed.push(range);
                }
            }

            if let Some(observer) = progress.as_mut() {
                observer.on_attempt(&ProgressEvent {
                    range_start: range.start,
                    range_end: range.end,
                    ok: outcome.succeeded(),
                    finished: session.finished,
                    total: session.expected_total,
                    pass,
                });
            }
        }

        tracing::debug!(
            pass,
            attempted,
            failed = failed.len(),
            finished = session.finished,
            "pass complete"
        );
        session.pending = failed;

        match policy.decide(pass, session.pending.len()) {
            PassDecision::Stop => break,
            PassDecision::RetryAfter(delay) => {
                if !delay.is_zero() {
                    tracing::debug!(next_pass = pass + 1, ?delay, "waiting before retry pass");
                    thread::sleep(delay);
                }
                pass += 1;
            }
        }
    }

    if !session.pending.is_empty() {
        tracing::warn!(
            abandoned = session.pending.len(),
            max_attempts = policy.max_attempts(),
            "ranges still failing after final pass"
        );
    }
    summary
}
