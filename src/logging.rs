//! Logging setup (env_logger behind the `log` facade)

use log::LevelFilter;

/// Install the global logger
///
/// `RUST_LOG` wins when set; otherwise `info` for this crate, or `debug`
/// with `verbose`. Safe to call more than once.
pub fn init(verbose: bool) {
    let level = if verbose { LevelFilter::Debug } else { LevelFilter::Info };
    let _ = env_logger::Builder::new()
        .filter_module("inshight", level)
        .filter_level(LevelFilter::Warn)
        .parse_default_env()
        .format_timestamp_millis()
        .try_init();
}
