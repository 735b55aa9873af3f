//! `segfetch probe` – show what a download would do.

use anyhow::Result;
use segfetch_core::config::SegfetchConfig;
use segfetch_core::filename::derive_filename;
use segfetch_core::probe::ProbeResult;
use segfetch_core::segmenter::range_count;
use segfetch_core::{Downloader, HeaderList};

pub fn run_probe(cfg: &SegfetchConfig, url: &str, headers: &HeaderList) -> Result<()> {
    let options = cfg.download_options()?;
    let downloader = Downloader::new(cfg.client.executor(), options);
    let result = downloader.probe(url, headers)?;
    for line in describe(url, &result, options.part_size.get()) {
        println!("{}", line);
    }
    Ok(())
}

fn describe(url: &str, result: &ProbeResult, part_size: u64) -> Vec<String> {
    let mut out = vec![format!("url:           {}", url)];
    match result.content_length {
        Some(total) => {
            out.push(format!("length:        {} bytes", total));
            out.push(format!(
                "plan:          {} range(s) of up to {} bytes",
                range_count(total, part_size),
                part_size
            ));
        }
        None => {
            out.push("length:        unknown".to_string());
            out.push("plan:          single GET, no retries".to_string());
        }
    }
    out.push(format!(
        "accept-ranges: {}",
        if result.accept_ranges {
            "bytes"
        } else {
            "not advertised"
        }
    ));
    if let Some(etag) = &result.etag {
        out.push(format!("etag:          {}", etag));
    }
    if let Some(lm) = &result.last_modified {
        out.push(format!("last-modified: {}", lm));
    }
    out.push(format!(
        "filename:      {}",
        derive_filename(url, result.content_disposition.as_deref())
    ));
    out
}
