//! Single-range GET written into the destination at the range's offset.

use std::io::{self, Write};

use crate::headers::{HeaderList, RANGE};
use crate::http::{Request, RequestExecutor};
use crate::retry::SegmentError;
use crate::segmenter::ByteRange;
use crate::storage::StorageWriter;

/// Result of one attempt at one range.
#[derive(Debug)]
pub(crate) struct SegmentOutcome {
    /// Bounds as planned; a retry reuses them unchanged.
    pub range: ByteRange,
    /// Bytes landed in the file; always 0 for a failed attempt.
    pub bytes_written: u64,
    pub error: Option<SegmentError>,
}

impl SegmentOutcome {
    pub fn succeeded(&self) -> bool {
        self.error.is_none()
    }
}

/// Writes a response body into `[range.start, range.end]` and refuses
/// anything past `range.end`.
struct RangeSink<'a> {
    storage: &'a StorageWriter,
    range: ByteRange,
    written: u64,
}

impl Write for RangeSink<'_> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let remaining = self.range.len() - self.written;
        if buf.len() as u64 > remaining {
            return Err(io::Error::new(
                io::ErrorKind::InvalidData,
                format!("response body overruns requested range {}", self.range),
            ));
        }
        self.storage.write_at(self.range.start + self.written, buf)?;
        self.written += buf.len() as u64;
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

/// Fetches `range` of `url` once. The outgoing `Range` header always carries
/// this range, whatever the caller's headers say. No retries here.
pub(crate) fn fetch_segment<E: RequestExecutor + ?Sized>(
    executor: &E,
    url: &str,
    headers: &HeaderList,
    range: ByteRange,
    storage: &StorageWriter,
) -> SegmentOutcome {
    let mut headers = headers.clone();
    headers.set(RANGE, &range.header_value());

    let mut sink = RangeSink {
        storage,
        range,
        written: 0,
    };
    let error = match executor.execute(&Request::get(url, &headers), &mut sink) {
        Err(e) => Some(SegmentError::from(e)),
        Ok(response) if !response.is_success() => Some(SegmentError::Http(response.status)),
        Ok(_) => None,
    };

    if let Some(error) = error {
        return SegmentOutcome {
            range,
            bytes_written: 0,
            error: Some(error),
        };
    }

    if sink.written < range.len() {
        tracing::warn!(
            range = %range,
            written = sink.written,
            expected = range.len(),
            "segment body shorter than requested range"
        );
    }
    SegmentOutcome {
        range,
        bytes_written: sink.written,
        error: None,
    }
}
