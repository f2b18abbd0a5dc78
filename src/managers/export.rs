//! Zone export
//!
//! Writes two artifacts per zone into the destination directory: the BIND
//! record export (`<name>.bind`) and the page rules (`<name>.json`). Zones
//! are processed in provider order; the first failure aborts the export,
//! leaving earlier artifacts on disk.

use crate::error::Result;
use crate::providers::{DnsProvider, Zone};
use std::fs;
use std::path::Path;
use tracing::{debug, info};

pub struct ZoneExporter<'a> {
    provider: &'a dyn DnsProvider,
}

impl<'a> ZoneExporter<'a> {
    pub fn new(provider: &'a dyn DnsProvider) -> Self {
        Self { provider }
    }

    /// Export every zone into `dest_dir`, creating it first.
    ///
    /// Parent directories may already exist, the leaf must not: the
    /// minute-resolution destination is assumed unique per run, so an
    /// existing directory means a same-minute rerun and fails hard.
    pub fn export_all(&self, dest_dir: &Path) -> Result<Vec<Zone>> {
        if let Some(parent) = dest_dir.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::create_dir(dest_dir)?;

        let zones = self.provider.list_zones()?;
        info!("Exporting {} zones to {}", zones.len(), dest_dir.display());

        for zone in &zones {
            self.export_zone(zone, dest_dir)?;
        }

        Ok(zones)
    }

    fn export_zone(&self, zone: &Zone, dest_dir: &Path) -> Result<()> {
        debug!("Exporting zone '{}' ({})", zone.name, zone.id);

        let records = self.provider.export_dns_records(&zone.id)?;
        fs::write(dest_dir.join(format!("{}.bind", zone.name)), records)?;

        let rules = self.provider.export_page_rules(&zone.id)?;
        // Pretty-printed so successive backups stay human-diffable.
        let rules_json = serde_json::to_string_pretty(&rules)
            .map_err(|e| crate::error::BackupError::Provider(format!(
                "failed to serialize page rules for '{}': {}",
                zone.name, e
            )))?;
        fs::write(dest_dir.join(format!("{}.json", zone.name)), rules_json)?;

        Ok(())
    }
}
