//! Tracing subscriber setup
//!
//! Respects `RUST_LOG`; otherwise logs at `info`, or `debug` when verbose.
//! Output goes to stderr so command output on stdout stays clean.

use tracing_subscriber::EnvFilter;

pub fn init(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    // A subscriber may already be installed by the host; keep theirs
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init();
}
