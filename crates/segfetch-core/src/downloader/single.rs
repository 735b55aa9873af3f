//! Single-stream GET for resources of unknown length.
//!
//! No ranges, no progress events, no retries: the body is written
//! sequentially from offset 0 and any failure is returned as-is.

use std::io::{self, Write};
use std::path::Path;

use crate::error::DownloadError;
use crate::headers::{HeaderList, RANGE};
use crate::http::{Request, RequestExecutor};
use crate::storage::{StorageWriter, StorageWriterBuilder};

struct SequentialSink<'a> {
    storage: &'a StorageWriter,
    written: u64,
}

impl Write for SequentialSink<'_> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.storage.write_at(self.written, buf)?;
        self.written += buf.len() as u64;
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

/// Creates (truncating) `dest`, then streams one unranged GET of `url` into it.
/// Returns the number of bytes written.
pub(crate) fn fetch_whole<E: RequestExecutor + ?Sized>(
    executor: &E,
    url: &str,
    headers: &HeaderList,
    dest: &Path,
) -> Result<u64, DownloadError> {
    let storage = StorageWriterBuilder::create(dest)
        .map_err(|source| DownloadError::CreateFile {
            path: dest.to_path_buf(),
            source,
        })?
        .build();

    let mut headers = headers.clone();
    headers.remove(RANGE);

    let mut sink = SequentialSink {
        storage: &storage,
        written: 0,
    };
    let response = executor
        .execute(&Request::get(url, &headers), &mut sink)
        .map_err(|source| DownloadError::Fetch {
            url: url.to_string(),
            source,
        })?;
    if !response.is_success() {
        return Err(DownloadError::FetchStatus {
            url: url.to_string(),
            status: response.status,
        });
    }

    tracing::info!(url, bytes = sink.written, "whole-body fetch complete");
    Ok(sink.written)
}
