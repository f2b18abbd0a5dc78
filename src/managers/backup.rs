//! Backup manager - orchestrates the timed export/upload pipeline

use crate::config::Config;
use crate::error::Result;
use crate::managers::export::ZoneExporter;
use crate::managers::upload::DirectoryUploader;
use crate::providers::DnsProvider;
use crate::storage::ObjectStore;
use crate::utils::{timed, BackupDestination};
use chrono::{DateTime, Utc};
use std::time::Duration;
use tracing::info;

/// Timings of a successful run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunTimings {
    pub export: Duration,
    pub upload: Duration,
    pub zones: usize,
    pub files: usize,
}

/// Outcome of one run, consumed exactly once by the reporter. There is no
/// partial-success state: any failure anywhere collapses the run to
/// `Failure`.
#[derive(Debug, Clone, Copy)]
pub enum RunOutcome {
    Success(RunTimings),
    Failure,
}

pub struct BackupManager<'a> {
    config: &'a Config,
    provider: &'a dyn DnsProvider,
    store: &'a dyn ObjectStore,
}

impl<'a> BackupManager<'a> {
    pub fn new(
        config: &'a Config,
        provider: &'a dyn DnsProvider,
        store: &'a dyn ObjectStore,
    ) -> Self {
        Self {
            config,
            provider,
            store,
        }
    }

    /// Run the full pipeline with the current clock.
    pub fn run(&self) -> Result<RunTimings> {
        self.run_at(Utc::now())
    }

    /// Run the full pipeline with an injected clock.
    ///
    /// Export fully completes before the first upload starts; errors are not
    /// caught here, the caller owns failure reporting. Already-written local
    /// files and already-uploaded objects are never rolled back.
    pub fn run_at(&self, now: DateTime<Utc>) -> Result<RunTimings> {
        let dest = BackupDestination::new(&self.config.namespace, &self.config.hostname, now);
        let local_dir = dest.local_dir(&self.config.backup_dir);
        info!("Starting zone backup into {}", dest.prefix());

        let exporter = ZoneExporter::new(self.provider);
        let (export_result, export) = timed(|| exporter.export_all(&local_dir));
        let zones = export_result?;
        info!("Export finished in {:.3}s", export.as_secs_f64());

        let uploader = DirectoryUploader::new(self.store, &self.config.aws_bucket);
        let (upload_result, upload) = timed(|| uploader.upload_all(&local_dir, &dest));
        let files = upload_result?;
        info!("Upload finished in {:.3}s", upload.as_secs_f64());

        Ok(RunTimings {
            export,
            upload,
            zones: zones.len(),
            files,
        })
    }
}
