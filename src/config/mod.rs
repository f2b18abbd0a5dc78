//! Configuration module
//!
//! All settings come from `BACKUP_*` environment variables (there are no
//! command-line flags). Required fields are validated eagerly at load time;
//! the optional reporting fields individually gate their sinks.

mod loader;
mod types;

pub use loader::{load_from_env, validate};
pub use types::Config;
