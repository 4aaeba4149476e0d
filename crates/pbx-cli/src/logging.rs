//! Tracing setup for the binary

use tracing_subscriber::EnvFilter;

/// Filter variable checked before `RUST_LOG`
pub(crate) const LOG_ENV: &str = "PBXPATCH_LOG";

/// Install the global subscriber, writing to stderr
///
/// `-v` forces debug; otherwise `PBXPATCH_LOG`, then `RUST_LOG`, then
/// `info`.
pub(crate) fn init(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_env(LOG_ENV)
            .or_else(|_| EnvFilter::try_from_default_env())
            .unwrap_or_else(|_| EnvFilter::new("info"))
    };

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}
