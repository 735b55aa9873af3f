//! CLI parse tests.

use super::{apply_overrides, Cli, CliCommand};
use clap::Parser;

pub(super) fn parse(args: &[&str]) -> CliCommand {
    let cli = Cli::try_parse_from(args).unwrap();
    cli.command
}


#[test]
fn overrides_apply_on_top_of_config() {
    let mut cfg = segfetch_core::config::SegfetchConfig::default();
    apply_overrides(&mut cfg, Some(1024), Some(5));
    let opts = cfg.download_options().unwrap();
    assert_eq!(opts.part_size.get(), 1024);
    assert_eq!(opts.retry.retry_passes, 5);

    let mut untouched = segfetch_core::config::SegfetchConfig::default();
    apply_overrides(&mut untouched, None, None);
    assert_eq!(untouched.part_size, 4_194_304);
    assert!(untouched.retry.is_none());
}
