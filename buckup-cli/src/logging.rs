//! env_logger setup shared by both binaries

use log::LevelFilter;

/// Warnings by default, `-v` for info, `-vv` and up for debug. `RUST_LOG` wins when set.
pub fn level_for(verbose: u8) -> LevelFilter {
    match verbose {
        0 => LevelFilter::Warn,
        1 => LevelFilter::Info,
        _ => LevelFilter::Debug,
    }
}

fn builder(verbose: u8) -> env_logger::Builder {
    let mut builder = env_logger::Builder::new();
    builder
        .filter_level(level_for(verbose))
        .parse_default_env()
        .format_timestamp(None)
        .format_target(false);
    builder
}

/// Call once per process, before anything logs.
pub fn init(verbose: u8) {
    builder(verbose).init();
}
