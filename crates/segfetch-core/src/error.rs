//! Errors surfaced to callers of `Downloader`.

use std::io;
use std::path::PathBuf;

use crate::http::TransportError;

#[derive(Debug, thiserror::Error)]
pub enum DownloadError {
    /// The length probe could not be completed. No file was created.
    #[error("probe of {url} failed")]
    Probe {
        url: String,
        #[source]
        source: TransportError,
    },

    /// The length probe returned a non-2xx status. No file was created.
    #[error("probe of {url} returned HTTP {status}")]
    ProbeStatus { url: String, status: u32 },

    /// The destination could not be opened for writing. No GET was issued.
    #[error("failed to create {}", path.display())]
    CreateFile {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// All passes finished short of the advertised length. The partial file
    /// is left on disk.
    #[error("download failed: {finished} of {expected} bytes written")]
    Incomplete { finished: u64, expected: u64 },

    /// Whole-body fetch (unknown length) failed at the transport or file level.
    #[error("GET {url} failed")]
    Fetch {
        url: String,
        #[source]
        source: TransportError,
    },

    /// Whole-body fetch (unknown length) returned a non-2xx status.
    #[error("GET {url} returned HTTP {status}")]
    FetchStatus { url: String, status: u32 },
}

impl DownloadError {
    /// True for the aggregate "not every byte arrived" failure.
    pub fn is_incomplete(&self) -> bool {
        matches!(self, DownloadError::Incomplete { .. })
    }
}
