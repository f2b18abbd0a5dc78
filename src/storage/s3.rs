//! S3 object store over plain HTTPS
//!
//! Uploads are AWS Signature V4 signed PUT requests built directly on the
//! blocking HTTP client. Against AWS the client uses virtual-hosted-style
//! addressing; a custom endpoint (MinIO and friends) switches to path style.

use super::ObjectStore;
use crate::error::{BackupError, Result};
use chrono::{DateTime, Utc};
use hmac::{Hmac, Mac};
use sha2::{Digest, Sha256};
use std::fs;
use std::path::Path;
use std::time::Duration;
use tracing::debug;

type HmacSha256 = Hmac<Sha256>;

/// HTTP timeout for uploads
const HTTP_TIMEOUT: Duration = Duration::from_secs(300);

const SIGNING_ALGORITHM: &str = "AWS4-HMAC-SHA256";
const SIGNED_HEADERS: &str = "host;x-amz-content-sha256;x-amz-date";

pub struct S3ObjectStore {
    region: String,
    access_key: String,
    secret_key: String,
    endpoint: Option<String>,
    client: reqwest::blocking::Client,
}

// The Debug implementation intentionally does not expose the secret key.
impl std::fmt::Debug for S3ObjectStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("S3ObjectStore")
            .field("region", &self.region)
            .field("access_key", &self.access_key)
            .field("secret_key", &"<REDACTED>")
            .field("endpoint", &self.endpoint)
            .finish()
    }
}

impl S3ObjectStore {
    pub fn new(
        region: &str,
        access_key: &str,
        secret_key: &str,
        endpoint: Option<&str>,
    ) -> Result<Self> {
        let client = reqwest::blocking::Client::builder()
            .timeout(HTTP_TIMEOUT)
            .build()
            .map_err(|e| BackupError::Storage(format!("failed to build HTTP client: {}", e)))?;

        Ok(Self {
            region: region.to_string(),
            access_key: access_key.to_string(),
            secret_key: secret_key.to_string(),
            endpoint: endpoint.map(|e| e.trim_end_matches('/').to_string()),
            client,
        })
    }

    /// Compute host, canonical URI path and full URL for an object.
    fn addressing(&self, bucket: &str, key: &str) -> (String, String, String) {
        let encoded_key = uri_encode(key, false);
        match &self.endpoint {
            // Path style for custom endpoints
            Some(endpoint) => {
                let host = endpoint
                    .trim_start_matches("https://")
                    .trim_start_matches("http://")
                    .to_string();
                let path = format!("/{}/{}", uri_encode(bucket, false), encoded_key);
                let url = format!("{}{}", endpoint, path);
                (host, path, url)
            }
            // Virtual-hosted style for AWS
            None => {
                let host = format!("{}.s3.{}.amazonaws.com", bucket, self.region);
                let path = format!("/{}", encoded_key);
                let url = format!("https://{}{}", host, path);
                (host, path, url)
            }
        }
    }

    /// Build the SigV4 Authorization header for a PUT of `payload_hash`.
    fn authorization(
        &self,
        host: &str,
        uri_path: &str,
        payload_hash: &str,
        now: DateTime<Utc>,
    ) -> String {
        let date = now.format("%Y%m%d").to_string();
        let amz_date = now.format("%Y%m%dT%H%M%SZ").to_string();
        let scope = format!("{}/{}/s3/aws4_request", date, self.region);

        let canonical_headers = format!(
            "host:{}\nx-amz-content-sha256:{}\nx-amz-date:{}\n",
            host, payload_hash, amz_date
        );
        let canonical_request = format!(
            "PUT\n{}\n\n{}\n{}\n{}",
            uri_path, canonical_headers, SIGNED_HEADERS, payload_hash
        );

        let string_to_sign = format!(
            "{}\n{}\n{}\n{}",
            SIGNING_ALGORITHM,
            amz_date,
            scope,
            sha256_hex(canonical_request.as_bytes())
        );

        let signing_key = derive_signing_key(&self.secret_key, &date, &self.region, "s3");
        let signature = hex::encode(hmac_sha256(&signing_key, string_to_sign.as_bytes()));

        format!(
            "{} Credential={}/{}, SignedHeaders={}, Signature={}",
            SIGNING_ALGORITHM, self.access_key, scope, SIGNED_HEADERS, signature
        )
    }
}

impl ObjectStore for S3ObjectStore {
    fn put_object(&self, bucket: &str, key: &str, file: &Path) -> Result<()> {
        let body = fs::read(file)?;
        let payload_hash = sha256_hex(&body);
        let now = Utc::now();

        let (host, uri_path, url) = self.addressing(bucket, key);
        let authorization = self.authorization(&host, &uri_path, &payload_hash, now);
        let amz_date = now.format("%Y%m%dT%H%M%SZ").to_string();

        debug!("PUT {} ({} bytes)", url, body.len());

        let response = self
            .client
            .put(&url)
            .header("Authorization", authorization)
            .header("x-amz-content-sha256", payload_hash)
            .header("x-amz-date", amz_date)
            .body(body)
            .send()
            .map_err(|e| BackupError::Storage(format!("upload of {} failed: {}", key, e)))?;

        let status = response.status();
        if status.is_success() {
            return Ok(());
        }

        let detail = response
            .text()
            .unwrap_or_else(|_| "unable to read error response".to_string());
        Err(BackupError::Storage(format!(
            "upload of {} rejected (status {}): {}",
            key, status, detail
        )))
    }
}

fn hmac_sha256(key: &[u8], data: &[u8]) -> Vec<u8> {
    let mut mac =
        <HmacSha256 as Mac>::new_from_slice(key).expect("HMAC accepts keys of any length");
    mac.update(data);
    mac.finalize().into_bytes().to_vec()
}

fn sha256_hex(data: &[u8]) -> String {
    hex::encode(Sha256::digest(data))
}

/// Derive the SigV4 signing key for a date/region/service scope.
fn derive_signing_key(secret: &str, date: &str, region: &str, service: &str) -> Vec<u8> {
    let k_date = hmac_sha256(format!("AWS4{}", secret).as_bytes(), date.as_bytes());
    let k_region = hmac_sha256(&k_date, region.as_bytes());
    let k_service = hmac_sha256(&k_region, service.as_bytes());
    hmac_sha256(&k_service, b"aws4_request")
}

/// RFC 3986 percent-encoding as S3 canonicalization requires: unreserved
/// characters pass through, `/` passes through unless `encode_slash`.
fn uri_encode(input: &str, encode_slash: bool) -> String {
    let mut out = String::with_capacity(input.len());
    for byte in input.bytes() {
        match byte {
            b'A'..=b'Z' | b'a'..=b'z' | b'0'..=b'9' | b'-' | b'.' | b'_' | b'~' => {
                out.push(byte as char);
            }
            b'/' if !encode_slash => out.push('/'),
            _ => out.push_str(&format!("%{:02X}", byte)),
        }
    }
    out
}
