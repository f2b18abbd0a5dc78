//! Backup destination paths
//!
//! A run writes to `<base>/<namespace>/<hostname>/<timestamp>` locally and
//! uploads under the object-key prefix `<namespace>/<hostname>/<timestamp>`,
//! so the local and remote layouts mirror each other exactly. The timestamp
//! has minute precision; two runs in the same minute collide, which the
//! exporter turns into a hard directory-exists failure.

use chrono::{DateTime, Utc};
use std::path::{Path, PathBuf};

/// Timestamp format, e.g. `2024-01-01_00-00_UTC`. The run clock is UTC so
/// the zone suffix is stable and path-safe.
const TIMESTAMP_FORMAT: &str = "%Y-%m-%d_%H-%M_%Z";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BackupDestination {
    namespace: String,
    hostname: String,
    stamp: String,
}

impl BackupDestination {
    pub fn new(namespace: &str, hostname: &str, now: DateTime<Utc>) -> Self {
        Self {
            namespace: namespace.to_string(),
            hostname: hostname.to_string(),
            stamp: now.format(TIMESTAMP_FORMAT).to_string(),
        }
    }

    /// Relative prefix shared by the local directory and the remote keys.
    pub fn prefix(&self) -> String {
        format!("{}/{}/{}", self.namespace, self.hostname, self.stamp)
    }

    /// Local directory for this run under the backup base directory.
    pub fn local_dir(&self, base: &Path) -> PathBuf {
        base.join(&self.namespace).join(&self.hostname).join(&self.stamp)
    }

    /// Remote object key for a file in this run's directory.
    pub fn remote_key(&self, file_name: &str) -> String {
        format!("{}/{}", self.prefix(), file_name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn fixed_destination() -> BackupDestination {
        let now = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 42).unwrap();
        BackupDestination::new("ns", "host", now)
    }

    #[test]
    fn test_timestamp_has_minute_precision_and_zone() {
        let dest = fixed_destination();
        assert_eq!(dest.prefix(), "ns/host/2024-01-01_00-00_UTC");
    }

    #[test]
    fn test_local_dir_mirrors_prefix() {
        let dest = fixed_destination();
        let dir = dest.local_dir(Path::new("/var/backups"));
        assert_eq!(dir, PathBuf::from("/var/backups/ns/host/2024-01-01_00-00_UTC"));
    }

    #[test]
    fn test_remote_key_mirrors_local_layout() {
        let dest = fixed_destination();
        assert_eq!(
            dest.remote_key("a.com.bind"),
            "ns/host/2024-01-01_00-00_UTC/a.com.bind"
        );
    }

    #[test]
    fn test_same_minute_collides_different_minute_does_not() {
        let first = BackupDestination::new(
            "ns",
            "host",
            Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 5).unwrap(),
        );
        let same_minute = BackupDestination::new(
            "ns",
            "host",
            Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 55).unwrap(),
        );
        let next_minute = BackupDestination::new(
            "ns",
            "host",
            Utc.with_ymd_and_hms(2024, 1, 1, 0, 1, 5).unwrap(),
        );
        assert_eq!(first, same_minute);
        assert_ne!(first, next_minute);
    }
}
