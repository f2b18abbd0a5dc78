//! Directory upload
//!
//! The uploader never receives an artifact list: it re-derives the file set
//! by scanning the destination directory. Any stray file placed there before
//! upload is included as well; that is a documented property of the design,
//! not a bug. Uploads are sequential with no retry, and a failure leaves the
//! uploaded set unknown.

use crate::error::{BackupError, Result};
use crate::storage::ObjectStore;
use crate::utils::BackupDestination;
use std::fs;
use std::path::Path;
use tracing::{debug, info};

pub struct DirectoryUploader<'a> {
    store: &'a dyn ObjectStore,
    bucket: &'a str,
}

impl<'a> DirectoryUploader<'a> {
    pub fn new(store: &'a dyn ObjectStore, bucket: &'a str) -> Self {
        Self { store, bucket }
    }

    /// Upload every regular file directly under `local_dir` to the bucket,
    /// keyed so the remote layout mirrors the local one. Returns the number
    /// of uploaded objects.
    pub fn upload_all(&self, local_dir: &Path, dest: &BackupDestination) -> Result<usize> {
        let mut uploaded = 0;

        for entry in fs::read_dir(local_dir)? {
            let entry = entry?;
            if !entry.file_type()?.is_file() {
                continue;
            }

            let file_name = entry.file_name();
            let file_name = file_name.to_str().ok_or_else(|| {
                BackupError::Storage(format!(
                    "artifact name is not valid UTF-8: {:?}",
                    entry.path()
                ))
            })?;

            let key = dest.remote_key(file_name);
            debug!("Uploading {} to s3://{}/{}", file_name, self.bucket, key);
            self.store.put_object(self.bucket, &key, &entry.path())?;
            uploaded += 1;
        }

        info!(
            "Uploaded {} objects to s3://{}/{}",
            uploaded,
            self.bucket,
            dest.prefix()
        );
        Ok(uploaded)
    }
}
