//! `segfetch get` – download a URL to a file.

use anyhow::{Context, Result};
use segfetch_core::config::SegfetchConfig;
use segfetch_core::filename::derive_filename;
use segfetch_core::probe::ProbeResult;
use segfetch_core::{Downloader, HeaderList, ProgressEvent, ProgressObserver};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

const PROGRESS_INTERVAL: Duration = Duration::from_millis(500);

/// Prints a progress line at most every `PROGRESS_INTERVAL`, and always for
/// the attempt that completes the download.
struct ProgressPrinter {
    started: Instant,
    last_print: Option<Instant>,
}

impl ProgressPrinter {
    fn new() -> Self {
        Self {
            started: Instant::now(),
            last_print: None,
        }
    }
}

impl ProgressObserver for ProgressPrinter {
    fn on_attempt(&mut self, event: &ProgressEvent) {
        if !event.ok {
            tracing::debug!(
                start = event.range_start,
                end = event.range_end,
                pass = event.pass,
                "range attempt failed"
            );
        }
        let now = Instant::now();
        let due = self
            .last_print
            .map_or(true, |t| now.duration_since(t) >= PROGRESS_INTERVAL);
        if !due && event.finished < event.total {
            return;
        }
        let line = format_progress(event, now.duration_since(self.started).as_secs_f64());
        let mut err = std::io::stderr().lock();
        let _ = write!(err, "\r{}", line);
        let _ = err.flush();
        self.last_print = Some(now);
    }
}

pub(crate) fn format_progress(event: &ProgressEvent, elapsed_secs: f64) -> String {
    let done_mib = event.finished as f64 / 1_048_576.0;
    let total_mib = event.total as f64 / 1_048_576.0;
    let rate_mib = if elapsed_secs > 0.0 {
        done_mib / elapsed_secs
    } else {
        0.0
    };
    format!(
        "  {:.1} / {:.1} MiB ({:.1}%)  {:.2} MiB/s  ",
        done_mib,
        total_mib,
        event.fraction() * 100.0,
        rate_mib
    )
}

/// Output path when none is given: the server's Content-Disposition name,
/// else the last URL path segment.
fn default_output(url: &str, probed: &ProbeResult) -> PathBuf {
    PathBuf::from(derive_filename(url, probed.content_disposition.as_deref()))
}

/// Download `url` to `output` (or a name derived from the URL).
pub fn run_get(
    cfg: &SegfetchConfig,
    url: &str,
    output: Option<&Path>,
    headers: &HeaderList,
    quiet: bool,
) -> Result<()> {
    let downloader = Downloader::new(cfg.client.executor(), cfg.download_options()?);
    let probed = downloader.probe(url, headers)?;
    let dest = output
        .map(Path::to_path_buf)
        .unwrap_or_else(|| default_output(url, &probed));

    let mut printer = ProgressPrinter::new();
    let progress: Option<&mut dyn ProgressObserver> = if quiet {
        None
    } else {
        Some(&mut printer)
    };
    let result = downloader.download_probed(&dest, url, headers, &probed, progress);
    if !quiet {
        eprintln!();
    }

    match result {
        Ok(report) => {
            tracing::info!(?report, dest = %dest.display(), "download finished");
            println!("saved {} ({} bytes)", dest.display(), report.bytes_written);
            Ok(())
        }
        Err(e) if e.is_incomplete() => {
            Err(e).with_context(|| format!("partial file left at {}", dest.display()))
        }
        Err(e) => Err(e.into()),
    }
}
