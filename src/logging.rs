//! Diagnostics: tracing subscriber on stderr

use tracing_subscriber::EnvFilter;

/// Initialize diagnostics on stderr.
///
/// `RUST_LOG` wins when set; otherwise `--debug` turns on this crate's
/// debug events and everything else stays at warn.
pub fn init_logging(debug: bool) {
    let default = if debug {
        "warn,ref_footnotes=debug"
    } else {
        "warn"
    };
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}
