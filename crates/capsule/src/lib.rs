pub mod app;
pub mod cli;
pub mod domain;
pub mod infra;
pub mod ui;

use tracing_subscriber::EnvFilter;

/// Environment variable holding the log filter, e.g. `CAPSULE_LOG=capsule=debug`.
pub const LOG_ENV: &str = "CAPSULE_LOG";

/// Install the stderr log subscriber. Defaults to `warn` so the TUI stays readable.
pub fn init() {
    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("warn"));
    let _ = tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(filter)
        .try_init();
}
