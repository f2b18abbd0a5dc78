use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Fixed cluster-local domain suffix used in notification text.
const CLUSTER_DOMAIN: &str = "cluster.local";

/// Flat snapshot of all external parameters.
///
/// Created once at process start from the environment and immutable
/// thereafter; every component takes it by reference.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Config {
    /// Cloudflare API token with zone read/export permissions
    pub cloudflare_token: String,

    /// Base directory under which backup runs are written
    pub backup_dir: PathBuf,

    /// Logical namespace of this deployment (first path component)
    pub namespace: String,

    /// Host this job runs on (second path component)
    pub hostname: String,

    /// Object storage settings
    pub aws_region: String,
    pub aws_bucket: String,
    pub aws_access_key: String,
    pub aws_secret_key: String,

    /// Custom S3-compatible endpoint (MinIO etc.); None for AWS S3
    #[serde(default)]
    pub aws_endpoint: Option<String>,

    /// Prometheus Pushgateway address; gates the metrics sink
    #[serde(default)]
    pub pushgateway_url: Option<String>,

    /// Slack bot token and channels; together they gate the chat sink
    #[serde(default)]
    pub slack_token: Option<String>,
    #[serde(default)]
    pub slack_success_channel: Option<String>,
    #[serde(default)]
    pub slack_failure_channel: Option<String>,
}

impl Config {
    /// Fully-qualified name used only for human-readable notification text.
    pub fn fqdn(&self) -> String {
        format!("{}.{}.{}", self.hostname, self.namespace, CLUSTER_DOMAIN)
    }

    /// Whether the Pushgateway sink is configured.
    pub fn metrics_enabled(&self) -> bool {
        self.pushgateway_url.is_some()
    }

    /// Whether the Slack sink is fully configured.
    pub fn slack_enabled(&self) -> bool {
        self.slack_token.is_some()
            && self.slack_success_channel.is_some()
            && self.slack_failure_channel.is_some()
    }
}
