//! Diagnostic logging.
//!
//! Logs go to stderr so stdout carries nothing but the requested token.

use tracing_subscriber::EnvFilter;

/// Filter used when neither `RUST_LOG` nor `--debug` is given.
const DEFAULT_FILTER: &str = "warn";

/// Install the global `tracing` subscriber.
///
/// `RUST_LOG` takes precedence; otherwise `--debug` enables debug output
/// for this crate.
pub fn init(debug: bool) {
    let fallback = if debug {
        format!("{DEFAULT_FILTER},{}=debug", env!("CARGO_CRATE_NAME"))
    } else {
        DEFAULT_FILTER.to_string()
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(fallback));

    // Ignore the error if a subscriber is already installed.
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}
