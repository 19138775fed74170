//! Purpose: Install the `tracing` subscriber for the CLI and for embedded hosts.
//! Exports: `LOG_ENV`, `init`, `init_from_env`.
//! Role: Single place that builds the `EnvFilter` and formatter.
//! Invariants: Installation uses `try_init`; an existing subscriber always wins.
//! Invariants: Output goes to stderr so stdout stays reserved for results.
use tracing_subscriber::EnvFilter;

pub const LOG_ENV: &str = "CLET_LOG";

/// Installs a stderr subscriber. `directive` wins over `CLET_LOG`, which wins
/// over `default`.
pub fn init(directive: Option<&str>, default: &str) {
    let env_filter = directive
        .and_then(|directive| EnvFilter::try_new(directive).ok())
        .or_else(|| EnvFilter::try_from_env(LOG_ENV).ok())
        .unwrap_or_else(|| EnvFilter::new(default));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init();
}

/// For embedded use: installs a subscriber only when `CLET_LOG` is set, so a
/// quiet host stays quiet.
pub fn init_from_env() {
    if std::env::var_os(LOG_ENV).is_some() {
        init(None, "warn");
    }
}
