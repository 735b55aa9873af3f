//! Segmented downloader engine.
//!
//! Probes the resource length; when it is known, plans fixed-size ranges,
//! fetches each with a ranged GET written at the range's own offset, retries
//! failures on later passes and checks that every byte arrived. When the length
//! is unknown, falls back to one streamed GET.

mod passes;
mod segment;
mod single;
mod validate;

pub use validate::validate;

use std::num::NonZeroU64;
use std::path::Path;

use crate::error::DownloadError;
use crate::headers::HeaderList;
use crate::http::RequestExecutor;
use crate::probe::{self, ProbeOutcome, ProbeResult};
use crate::progress::ProgressObserver;
use crate::retry::RetryPolicy;
use crate::segmenter::{plan_ranges, DEFAULT_PART_SIZE};
use crate::storage::StorageWriterBuilder;

const DEFAULT_PART: NonZeroU64 = match NonZeroU64::new(DEFAULT_PART_SIZE) {
    Some(n) => n,
    None => panic!("default part size must be non-zero"),
};

/// Tunables for a `Downloader`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DownloadOptions {
    /// Size of every planned range except possibly the last.
    pub part_size: NonZeroU64,
    pub retry: RetryPolicy,
    /// Reserve the full length on disk before fetching ranges.
    pub preallocate: bool,
}

impl Default for DownloadOptions {
    fn default() -> Self {
        Self {
            part_size: DEFAULT_PART,
            retry: RetryPolicy::default(),
            preallocate: false,
        }
    }
}

/// Failure counts for one download, by kind.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DownloadSummary {
    pub attempts: u32,
    pub failed_attempts: u32,
    pub throttle_events: u32,
    pub error_events: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DownloadMode {
    /// Ranged passes over this many planned ranges.
    Segmented { ranges: usize },
    /// One unranged GET (length unknown).
    Whole,
}

/// What a successful download did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DownloadReport {
    pub bytes_written: u64,
    /// Length advertised by the probe, if any.
    pub expected_total: Option<u64>,
    pub mode: DownloadMode,
    pub summary: DownloadSummary,
}

pub struct Downloader<E> {
    executor: E,
    options: DownloadOptions,
}

impl<E: RequestExecutor> Downloader<E> {
    pub fn new(executor: E, options: DownloadOptions) -> Self {
        Self { executor, options }
    }

    pub fn options(&self) -> &DownloadOptions {
        &self.options
    }

    pub fn executor(&self) -> &E {
        &self.executor
    }

    /// HEAD `url` and return the metadata used to plan a download.
    pub fn probe(&self, url: &str, headers: &HeaderList) -> Result<ProbeResult, DownloadError> {
        match probe::probe(&self.executor, url, headers) {
            Ok(ProbeOutcome::Ok(result)) => Ok(result),
            Ok(ProbeOutcome::Status(status)) => Err(DownloadError::ProbeStatus {
                url: url.to_string(),
                status,
            }),
            Err(source) => Err(DownloadError::Probe {
                url: url.to_string(),
                source,
            }),
        }
    }

    /// Downloads `url` into `dest`.
    ///
    /// `headers` go out with every request; a `Range` header among them is
    /// replaced per segment. `progress`, if given, sees every segment attempt.
    /// On `DownloadError::Incomplete` the partially written file is left at `dest`.
    pub fn download(
        &self,
        dest: &Path,
        url: &str,
        headers: &HeaderList,
        progress: Option<&mut dyn ProgressObserver>,
    ) -> Result<DownloadReport, DownloadError> {
        let probed = self.probe(url, headers)?;
        self.download_probed(dest, url, headers, &probed, progress)
    }

    /// Like `download`, but reuses metadata from an earlier `probe` of the
    /// same `url` instead of sending another HEAD.
    pub fn download_probed(
        &self,
        dest: &Path,
        url: &str,
        headers: &HeaderList,
        probed: &ProbeResult,
        progress: Option<&mut dyn ProgressObserver>,
    ) -> Result<DownloadReport, DownloadError> {
        let Some(total) = probed.content_length else {
            tracing::info!(url, "length unknown, fetching whole body");
            let bytes_written = single::fetch_whole(&self.executor, url, headers, dest)?;
            return Ok(DownloadReport {
                bytes_written,
                expected_total: None,
                mode: DownloadMode::Whole,
                summary: DownloadSummary::default(),
            });
        };

        let create_failed = |source| DownloadError::CreateFile {
            path: dest.to_path_buf(),
            source,
        };
        let mut builder = StorageWriterBuilder::create(dest).map_err(create_failed)?;
        if self.options.preallocate {
            builder.preallocate(total).map_err(create_failed)?;
        }
        let storage = builder.build();

        let ranges = plan_ranges(total, self.options.part_size.get());
        let range_count = ranges.len();
        tracing::info!(
            url,
            total,
            part_size = self.options.part_size.get(),
            ranges = range_count,
            "starting segmented download"
        );

        let mut session = passes::Session::new(url, headers, total, ranges);
        let summary = passes::run_passes(
            &self.executor,
            &mut session,
            &storage,
            &self.options.retry,
            progress,
        );

        validate(session.finished, total)?;
        tracing::info!(
            url,
            bytes = session.finished,
            ?summary,
            "segmented download complete"
        );

        Ok(DownloadReport {
            bytes_written: session.finished,
            expected_total: Some(total),
            mode: DownloadMode::Segmented { ranges: range_count },
            summary,
        })
    }
}
