//! Cloudflare Zone Backup Library
//!
//! Exports every zone of a Cloudflare account (BIND records and page rules)
//! to a timestamped local directory, uploads the directory to S3-compatible
//! object storage, and reports the outcome to the configured sinks.

pub mod config;
pub mod error;
pub mod managers;
pub mod providers;
pub mod storage;
pub mod utils;

// Re-export commonly used types
pub use config::Config;
pub use error::{BackupError, Result};
pub use managers::backup::{BackupManager, RunOutcome, RunTimings};
pub use managers::logging::init_console_logging;
pub use managers::reporting::Reporter;
pub use providers::{CloudflareClient, DnsProvider, Zone};
pub use storage::{ObjectStore, S3ObjectStore};
pub use utils::BackupDestination;
