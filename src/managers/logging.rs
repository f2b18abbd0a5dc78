//! Console logging
//!
//! The job runs unattended under cron, which captures standard streams, so
//! a single console subscriber is enough. `RUST_LOG` overrides the default
//! level.

use tracing_subscriber::EnvFilter;

pub fn init_console_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_level(true)
        .init();
}
