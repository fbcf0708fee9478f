//! Diagnostic logging setup.
//!
//! Logs go to stderr so stdout stays clean for `get --print` and `list`.
//! `MSK_LOG` takes a full `EnvFilter` directive and wins over `-v`.

use tracing_subscriber::EnvFilter;

/// Environment variable holding a tracing filter directive.
pub const LOG_ENV: &str = "MSK_LOG";

/// Filter used when `MSK_LOG` is unset: `-v` → info, `-vv` → debug.
pub fn default_directive(verbosity: u8) -> &'static str {
    match verbosity {
        0 => "msk=warn",
        1 => "msk=info",
        _ => "msk=debug",
    }
}

/// Install the global subscriber. Safe to call more than once.
pub fn init(verbosity: u8) {
    let filter = EnvFilter::try_from_env(LOG_ENV)
        .unwrap_or_else(|_| EnvFilter::new(default_directive(verbosity)));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}
