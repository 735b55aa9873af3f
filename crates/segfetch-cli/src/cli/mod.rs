//! CLI for the segfetch downloader.

mod commands;

use anyhow::Result;
use clap::{Parser, Subcommand};
use segfetch_core::config::{self, RetryConfig, SegfetchConfig};
use segfetch_core::headers::{HeaderList, InvalidHeader};
use std::path::PathBuf;

use commands::{run_get, run_probe};

/// Top-level CLI for segfetch.
#[derive(Debug, Parser)]
#[command(name = "segfetch")]
#[command(about = "segfetch: segmented, retrying HTTP file downloader", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: CliCommand,
}

#[derive(Debug, Subcommand)]
pub enum CliCommand {
    /// Download a URL to a file.
    Get {
        /// Direct HTTP/HTTPS URL to download.
        url: String,

        /// Output path (default: file name derived from the URL).
        #[arg(short, long, value_name = "PATH")]
        output: Option<PathBuf>,

        /// Extra request header, e.g. -H "Authorization: Bearer x". Repeatable.
        #[arg(
            short = 'H',
            long = "header",
            value_name = "NAME: VALUE",
            value_parser = parse_header
        )]
        headers: Vec<(String, String)>,

        /// Range size in bytes (overrides config).
        #[arg(long, value_name = "BYTES", value_parser = clap::value_parser!(u64).range(1..))]
        part_size: Option<u64>,

        /// Retry passes after the initial pass (overrides config).
        #[arg(long, value_name = "N")]
        retry_passes: Option<u32>,

        /// Do not print progress.
        #[arg(short, long)]
        quiet: bool,
    },

    /// Show what a download of URL would do (length, range support, plan).
    Probe {
        /// Direct HTTP/HTTPS URL to probe.
        url: String,

        /// Extra request header. Repeatable.
        #[arg(
            short = 'H',
            long = "header",
            value_name = "NAME: VALUE",
            value_parser = parse_header
        )]
        headers: Vec<(String, String)>,

        /// Range size in bytes used for the plan (overrides config).
        #[arg(long, value_name = "BYTES", value_parser = clap::value_parser!(u64).range(1..))]
        part_size: Option<u64>,
    },
}

fn parse_header(s: &str) -> Result<(String, String), InvalidHeader> {
    HeaderList::parse_line(s)
}

fn header_list(headers: &[(String, String)]) -> HeaderList {
    headers.iter().map(|(k, v)| (k.as_str(), v.as_str())).collect()
}

/// Applies command-line overrides on top of the file config.
fn apply_overrides(cfg: &mut SegfetchConfig, part_size: Option<u64>, retry_passes: Option<u32>) {
    if let Some(n) = part_size {
        cfg.part_size = n;
    }
    if let Some(n) = retry_passes {
        cfg.retry.get_or_insert_with(RetryConfig::default).retry_passes = n;
    }
}

impl CliCommand {
    pub fn run_from_args() -> Result<()> {
        let cli = Cli::parse();
        let mut cfg = config::load_or_init()?;
        tracing::debug!("loaded config: {:?}", cfg);

        match cli.command {
            CliCommand::Get {
                url,
                output,
                headers,
                part_size,
                retry_passes,
                quiet,
            } => {
                apply_overrides(&mut cfg, part_size, retry_passes);
                run_get(&cfg, &url, output.as_deref(), &header_list(&headers), quiet)?;
            }
            CliCommand::Probe {
                url,
                headers,
                part_size,
            } => {
                apply_overrides(&mut cfg, part_size, None);
                run_probe(&cfg, &url, &header_list(&headers))?;
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests;
