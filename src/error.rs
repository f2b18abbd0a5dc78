//! Error types for the backup pipeline
//!
//! Every external interaction maps into one of these variants. Nothing is
//! recovered locally: the pipeline is fail-fast and non-resumable, and the
//! only error-path branch lives in `main` (failure notification before the
//! process exits non-zero).

use thiserror::Error;

#[derive(Debug, Error)]
pub enum BackupError {
    /// A required setting is missing or inconsistent. Raised before any
    /// network call is made.
    #[error("configuration error: {0}")]
    Config(String),

    /// Zone listing or per-zone export failed (network, auth, rate limit,
    /// or a malformed API response).
    #[error("provider error: {0}")]
    Provider(String),

    /// Local directory creation or artifact write failed. Also covers the
    /// destination directory already existing (same-minute rerun).
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// An object upload failed. The set of already-uploaded objects is
    /// unknown; callers must treat the whole run as failed.
    #[error("storage error: {0}")]
    Storage(String),

    /// A reporting transport failed. Never caught anywhere.
    #[error("reporting error: {0}")]
    Reporting(String),
}

pub type Result<T> = std::result::Result<T, BackupError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_io_error_conversion() {
        let io = std::io::Error::new(std::io::ErrorKind::AlreadyExists, "exists");
        let err: BackupError = io.into();
        assert!(matches!(err, BackupError::Io(_)));
        assert!(err.to_string().contains("exists"));
    }

    #[test]
    fn test_error_display() {
        let err = BackupError::Provider("zone listing failed".to_string());
        assert_eq!(err.to_string(), "provider error: zone listing failed");
    }
}
