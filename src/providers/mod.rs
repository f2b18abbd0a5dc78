//! DNS provider abstraction
//!
//! The pipeline only depends on the `DnsProvider` trait; the Cloudflare
//! client is one implementation. The `mock` module provides a recording
//! implementation for tests, including external test crates.

pub mod cloudflare;

use crate::error::Result;
use serde::Deserialize;

pub use cloudflare::CloudflareClient;

/// A DNS-managed domain as modeled by the provider.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct Zone {
    pub id: String,
    pub name: String,
}

/// Capability interface for the DNS provider.
///
/// Every call is attempted exactly once; no retry anywhere.
pub trait DnsProvider: Send + Sync {
    /// List all zones owned by the account, in provider order.
    fn list_zones(&self) -> Result<Vec<Zone>>;

    /// Export one zone's DNS records in BIND zone-file syntax.
    fn export_dns_records(&self, zone_id: &str) -> Result<String>;

    /// Export one zone's page rules as structured data.
    fn export_page_rules(&self, zone_id: &str) -> Result<serde_json::Value>;
}

/// A mock provider for testing that records calls and returns configured
/// responses. Available for use in external test crates.
pub mod mock {
    use super::*;
    use crate::error::BackupError;
    use std::sync::{Arc, Mutex};

    #[derive(Clone, Default)]
    pub struct MockProvider {
        zones: Vec<Zone>,
        /// Zone IDs whose export calls should fail
        fail_exports: Vec<String>,
        fail_listing: bool,
        /// Recorded export calls, as (method, zone_id) pairs
        pub calls: Arc<Mutex<Vec<(String, String)>>>,
    }

    impl MockProvider {
        pub fn new() -> Self {
            Self::default()
        }

        /// Add a zone; exports for it return canned content derived from
        /// the zone name.
        pub fn with_zone(mut self, id: &str, name: &str) -> Self {
            self.zones.push(Zone {
                id: id.to_string(),
                name: name.to_string(),
            });
            self
        }

        /// Make `list_zones` fail.
        pub fn fail_listing(mut self) -> Self {
            self.fail_listing = true;
            self
        }

        /// Make both export calls fail for the given zone ID.
        pub fn fail_export_of(mut self, zone_id: &str) -> Self {
            self.fail_exports.push(zone_id.to_string());
            self
        }

        pub fn export_call_count(&self) -> usize {
            self.calls.lock().unwrap().len()
        }

        fn record(&self, method: &str, zone_id: &str) {
            self.calls
                .lock()
                .unwrap()
                .push((method.to_string(), zone_id.to_string()));
        }

        fn check_failure(&self, zone_id: &str) -> Result<()> {
            if self.fail_exports.iter().any(|id| id == zone_id) {
                return Err(BackupError::Provider(format!(
                    "export failed for zone {}",
                    zone_id
                )));
            }
            Ok(())
        }
    }

    impl DnsProvider for MockProvider {
        fn list_zones(&self) -> Result<Vec<Zone>> {
            if self.fail_listing {
                return Err(BackupError::Provider("zone listing failed".to_string()));
            }
            Ok(self.zones.clone())
        }

        fn export_dns_records(&self, zone_id: &str) -> Result<String> {
            self.record("export_dns_records", zone_id);
            self.check_failure(zone_id)?;
            let zone = self.zones.iter().find(|z| z.id == zone_id);
            let name = zone.map(|z| z.name.as_str()).unwrap_or("unknown");
            Ok(format!(
                ";; Zone file for {}\n{}.\t300\tIN\tA\t192.0.2.1\n",
                name, name
            ))
        }

        fn export_page_rules(&self, zone_id: &str) -> Result<serde_json::Value> {
            self.record("export_page_rules", zone_id);
            self.check_failure(zone_id)?;
            Ok(serde_json::json!([
                {
                    "id": format!("rule-{}", zone_id),
                    "status": "active",
                    "priority": 1
                }
            ]))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::mock::MockProvider;
    use super::*;

    #[test]
    fn test_mock_provider_lists_zones_in_order() {
        let provider = MockProvider::new()
            .with_zone("z1", "a.com")
            .with_zone("z2", "b.com");
        let zones = provider.list_zones().unwrap();
        assert_eq!(zones.len(), 2);
        assert_eq!(zones[0].name, "a.com");
        assert_eq!(zones[1].name, "b.com");
    }

    #[test]
    fn test_mock_provider_records_calls() {
        let provider = MockProvider::new().with_zone("z1", "a.com");
        provider.export_dns_records("z1").unwrap();
        provider.export_page_rules("z1").unwrap();
        assert_eq!(provider.export_call_count(), 2);
    }

    #[test]
    fn test_mock_provider_configured_failure() {
        let provider = MockProvider::new()
            .with_zone("z1", "a.com")
            .fail_export_of("z1");
        assert!(provider.export_dns_records("z1").is_err());
    }
}
