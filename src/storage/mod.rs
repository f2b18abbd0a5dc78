//! Object storage abstraction
//!
//! The uploader only depends on the `ObjectStore` trait. The shipped
//! implementation signs S3 PUT requests directly; the `mock` module records
//! uploads for tests, including external test crates.

pub mod s3;

use crate::error::Result;
use std::path::Path;

pub use s3::S3ObjectStore;

/// Capability interface for object storage.
pub trait ObjectStore: Send + Sync {
    /// Upload one local file to `bucket` under `key`. Attempted exactly
    /// once; any failure aborts the run.
    fn put_object(&self, bucket: &str, key: &str, file: &Path) -> Result<()>;
}

/// A mock store for testing that records uploads and returns configured
/// failures. Available for use in external test crates.
pub mod mock {
    use super::*;
    use crate::error::BackupError;
    use std::path::PathBuf;
    use std::sync::{Arc, Mutex};

    /// Recorded upload.
    #[derive(Debug, Clone)]
    pub struct PutCall {
        pub bucket: String,
        pub key: String,
        pub file: PathBuf,
    }

    #[derive(Clone, Default)]
    pub struct MockStore {
        pub puts: Arc<Mutex<Vec<PutCall>>>,
        /// Fail the Nth upload (0-based); None means never fail
        fail_at: Option<usize>,
    }

    impl MockStore {
        pub fn new() -> Self {
            Self::default()
        }

        /// Make the Nth `put_object` call fail.
        pub fn fail_at(mut self, index: usize) -> Self {
            self.fail_at = Some(index);
            self
        }

        pub fn uploaded_keys(&self) -> Vec<String> {
            self.puts.lock().unwrap().iter().map(|p| p.key.clone()).collect()
        }

        pub fn put_count(&self) -> usize {
            self.puts.lock().unwrap().len()
        }
    }

    impl ObjectStore for MockStore {
        fn put_object(&self, bucket: &str, key: &str, file: &Path) -> Result<()> {
            let mut puts = self.puts.lock().unwrap();
            if self.fail_at == Some(puts.len()) {
                return Err(BackupError::Storage(format!("upload failed for {}", key)));
            }
            puts.push(PutCall {
                bucket: bucket.to_string(),
                key: key.to_string(),
                file: file.to_path_buf(),
            });
            Ok(())
        }
    }
}
