//! Cloudflare v4 API client
//!
//! Implements `DnsProvider` over plain HTTPS with bearer authentication.
//! Zone listing is paginated; the export endpoints are called once per zone
//! with no retry. The API token never appears in logs or Debug output.

use super::{DnsProvider, Zone};
use crate::error::{BackupError, Result};
use serde::Deserialize;
use std::time::Duration;
use tracing::debug;

/// Cloudflare API base URL
const API_BASE: &str = "https://api.cloudflare.com/client/v4";

/// HTTP timeout for API requests
const HTTP_TIMEOUT: Duration = Duration::from_secs(30);

/// Zones per page when listing
const ZONES_PER_PAGE: u32 = 50;

pub struct CloudflareClient {
    api_token: String,
    base_url: String,
    client: reqwest::blocking::Client,
}

// The Debug implementation intentionally does not expose the API token.
impl std::fmt::Debug for CloudflareClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CloudflareClient")
            .field("api_token", &"<REDACTED>")
            .field("base_url", &self.base_url)
            .finish()
    }
}

/// Standard Cloudflare response envelope.
#[derive(Debug, Deserialize)]
struct ApiEnvelope<T> {
    success: bool,
    #[serde(default)]
    errors: Vec<ApiError>,
    result: Option<T>,
    result_info: Option<ResultInfo>,
}

#[derive(Debug, Deserialize)]
struct ApiError {
    code: i64,
    message: String,
}

#[derive(Debug, Deserialize)]
struct ResultInfo {
    page: u32,
    total_pages: u32,
}

impl CloudflareClient {
    /// Create a client for the production API.
    pub fn new(api_token: &str) -> Result<Self> {
        Self::with_base_url(api_token, API_BASE)
    }

    /// Create a client against a custom base URL (used by tests).
    pub fn with_base_url(api_token: &str, base_url: &str) -> Result<Self> {
        if api_token.is_empty() {
            return Err(BackupError::Config(
                "Cloudflare API token cannot be empty".to_string(),
            ));
        }

        let client = reqwest::blocking::Client::builder()
            .timeout(HTTP_TIMEOUT)
            .build()
            .map_err(|e| BackupError::Provider(format!("failed to build HTTP client: {}", e)))?;

        Ok(Self {
            api_token: api_token.to_string(),
            base_url: base_url.trim_end_matches('/').to_string(),
            client,
        })
    }

    fn get(&self, path: &str) -> Result<reqwest::blocking::Response> {
        let url = format!("{}{}", self.base_url, path);
        debug!("GET {}", url);

        let response = self
            .client
            .get(&url)
            .bearer_auth(&self.api_token)
            .send()
            .map_err(|e| BackupError::Provider(format!("HTTP request failed: {}", e)))?;

        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = response
            .text()
            .unwrap_or_else(|_| "unable to read error response".to_string());

        Err(match status.as_u16() {
            401 | 403 => BackupError::Provider(format!(
                "authentication failed: invalid API token or insufficient permissions (status {})",
                status
            )),
            404 => BackupError::Provider(format!("not found: {}", path)),
            429 => BackupError::Provider(format!("rate limit exceeded (status {})", status)),
            500..=599 => BackupError::Provider(format!(
                "Cloudflare server error (status {}): {}",
                status, body
            )),
            _ => BackupError::Provider(format!("request failed (status {}): {}", status, body)),
        })
    }

    fn unwrap_envelope<T>(&self, envelope: ApiEnvelope<T>, context: &str) -> Result<T> {
        if !envelope.success {
            let detail = envelope
                .errors
                .iter()
                .map(|e| format!("{} (code {})", e.message, e.code))
                .collect::<Vec<_>>()
                .join("; ");
            return Err(BackupError::Provider(format!("{}: {}", context, detail)));
        }
        envelope
            .result
            .ok_or_else(|| BackupError::Provider(format!("{}: empty result", context)))
    }
}

impl DnsProvider for CloudflareClient {
    fn list_zones(&self) -> Result<Vec<Zone>> {
        let mut zones = Vec::new();
        let mut page = 1;

        loop {
            let path = format!("/zones?page={}&per_page={}", page, ZONES_PER_PAGE);
            let response = self.get(&path)?;
            let envelope: ApiEnvelope<Vec<Zone>> = response
                .json()
                .map_err(|e| BackupError::Provider(format!("malformed zone list: {}", e)))?;

            let info = envelope.result_info.as_ref().map(|i| (i.page, i.total_pages));
            zones.extend(self.unwrap_envelope(envelope, "zone listing failed")?);

            match info {
                Some((current, total)) if current < total => page = current + 1,
                _ => break,
            }
        }

        debug!("Listed {} zones", zones.len());
        Ok(zones)
    }

    fn export_dns_records(&self, zone_id: &str) -> Result<String> {
        // The export endpoint returns the BIND zone file directly, without
        // the JSON envelope.
        let response = self.get(&format!("/zones/{}/dns_records/export", zone_id))?;
        response
            .text()
            .map_err(|e| BackupError::Provider(format!("failed to read zone export: {}", e)))
    }

    fn export_page_rules(&self, zone_id: &str) -> Result<serde_json::Value> {
        let response = self.get(&format!("/zones/{}/pagerules", zone_id))?;
        let envelope: ApiEnvelope<serde_json::Value> = response
            .json()
            .map_err(|e| BackupError::Provider(format!("malformed page rules: {}", e)))?;
        self.unwrap_envelope(envelope, "page rule export failed")
    }
}
