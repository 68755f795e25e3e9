//! Logging setup
//!
//! `RUST_LOG` wins when set. Otherwise `-v` raises the engine crates from
//! `info` to `debug`, `-vv` to `trace`. Logs go to stderr so stdout stays
//! usable for JSON output.

use tracing_subscriber::EnvFilter;

pub fn init(verbose: u8, quiet: bool) {
    let level = match (quiet, verbose) {
        (true, _) => "warn",
        (false, 0) => "info",
        (false, 1) => "debug",
        (false, _) => "trace",
    };

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(format!(
            "warn,reskin={level},reskin_engine={level},reskin_theme={level}"
        ))
    });

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(verbose > 0)
        .with_writer(std::io::stderr)
        .try_init();
}
