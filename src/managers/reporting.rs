//! Outcome reporting
//!
//! The reporter consumes the run outcome exactly once and fans it out to the
//! sinks the configuration enables: a Pushgateway sink for timing gauges, a
//! Slack sink for success/failure messages, and a console sink as fallback
//! when no remote sink is configured. Transport failures are never caught;
//! a reporting error terminates the process.

use crate::config::Config;
use crate::error::{BackupError, Result};
use crate::managers::backup::{RunOutcome, RunTimings};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::time::Duration;
use tracing::{debug, info};

/// Job name all pushed gauges are grouped under.
const PUSH_JOB_NAME: &str = "cloudflare_backup";

const SLACK_POST_MESSAGE_URL: &str = "https://slack.com/api/chat.postMessage";

/// HTTP timeout for reporting transports
const HTTP_TIMEOUT: Duration = Duration::from_secs(30);

/// One reporting destination.
pub trait ReportSink {
    fn name(&self) -> &'static str;

    /// Emit the outcome. Errors propagate to the caller unhandled.
    fn report(&self, outcome: &RunOutcome) -> Result<()>;
}

/// Fans the outcome out to every configured sink.
pub struct Reporter {
    sinks: Vec<Box<dyn ReportSink>>,
}

impl Reporter {
    /// Build the sink set from configuration. The console sink is the
    /// fallback when neither remote sink is configured.
    pub fn from_config(config: &Config) -> Self {
        let mut sinks: Vec<Box<dyn ReportSink>> = Vec::new();

        if let Some(url) = &config.pushgateway_url {
            sinks.push(Box::new(PushgatewaySink::new(
                url,
                &config.hostname,
                &config.namespace,
            )));
        }

        if config.slack_enabled() {
            // slack_enabled() guarantees all three are present
            sinks.push(Box::new(SlackSink::new(
                config.slack_token.as_deref().unwrap_or_default(),
                config.slack_success_channel.as_deref().unwrap_or_default(),
                config.slack_failure_channel.as_deref().unwrap_or_default(),
                &config.fqdn(),
            )));
        }

        if sinks.is_empty() {
            sinks.push(Box::new(ConsoleSink));
        }

        Self { sinks }
    }

    #[cfg(test)]
    fn with_sinks(sinks: Vec<Box<dyn ReportSink>>) -> Self {
        Self { sinks }
    }

    pub fn report(&self, outcome: &RunOutcome) -> Result<()> {
        for sink in &self.sinks {
            debug!("Reporting outcome via {} sink", sink.name());
            sink.report(outcome)?;
        }
        Ok(())
    }
}

fn secs(duration: Duration) -> f64 {
    duration.as_secs_f64()
}

/// Always-available sink printing to standard output.
pub struct ConsoleSink;

impl ConsoleSink {
    /// The line printed for a successful run, millisecond precision.
    fn success_line(timings: &RunTimings) -> String {
        format!(
            "backup finished: {} zones exported in {:.3}s, {} files uploaded in {:.3}s",
            timings.zones,
            secs(timings.export),
            timings.files,
            secs(timings.upload)
        )
    }
}

impl ReportSink for ConsoleSink {
    fn name(&self) -> &'static str {
        "console"
    }

    fn report(&self, outcome: &RunOutcome) -> Result<()> {
        match outcome {
            RunOutcome::Success(timings) => println!("{}", Self::success_line(timings)),
            RunOutcome::Failure => println!("backup failed, no timings recorded"),
        }
        Ok(())
    }
}

/// Pushes timing gauges to a Prometheus Pushgateway.
///
/// This sink only reports timings: a failed run pushes nothing, so the
/// gateway keeps the gauges of the last successful run. Only the Slack sink
/// distinguishes success from failure.
pub struct PushgatewaySink {
    gateway_url: String,
    hostname: String,
    namespace: String,
}

impl PushgatewaySink {
    pub fn new(gateway_url: &str, hostname: &str, namespace: &str) -> Self {
        Self {
            gateway_url: gateway_url.to_string(),
            hostname: hostname.to_string(),
            namespace: namespace.to_string(),
        }
    }

    fn grouping(&self) -> HashMap<String, String> {
        let mut grouping = HashMap::new();
        grouping.insert("hostname".to_string(), self.hostname.clone());
        grouping.insert("namespace".to_string(), self.namespace.clone());
        grouping
    }

    fn push_timings(&self, timings: &RunTimings) -> Result<()> {
        let registry = prometheus::Registry::new();

        let export_gauge = prometheus::Gauge::with_opts(prometheus::Opts::new(
            "cloudflare_backup_export_seconds",
            "Duration of the zone export phase in seconds",
        ))
        .map_err(|e| BackupError::Reporting(e.to_string()))?;
        let upload_gauge = prometheus::Gauge::with_opts(prometheus::Opts::new(
            "cloudflare_backup_upload_seconds",
            "Duration of the upload phase in seconds",
        ))
        .map_err(|e| BackupError::Reporting(e.to_string()))?;

        registry
            .register(Box::new(export_gauge.clone()))
            .map_err(|e| BackupError::Reporting(e.to_string()))?;
        registry
            .register(Box::new(upload_gauge.clone()))
            .map_err(|e| BackupError::Reporting(e.to_string()))?;

        export_gauge.set(secs(timings.export));
        upload_gauge.set(secs(timings.upload));

        prometheus::push_metrics(
            PUSH_JOB_NAME,
            self.grouping(),
            &self.gateway_url,
            registry.gather(),
            None,
        )
        .map_err(|e| {
            BackupError::Reporting(format!("pushgateway {}: {}", self.gateway_url, e))
        })?;

        info!("Pushed timing gauges to {}", self.gateway_url);
        Ok(())
    }
}

impl ReportSink for PushgatewaySink {
    fn name(&self) -> &'static str {
        "pushgateway"
    }

    fn report(&self, outcome: &RunOutcome) -> Result<()> {
        match outcome {
            RunOutcome::Success(timings) => self.push_timings(timings),
            RunOutcome::Failure => Ok(()),
        }
    }
}

/// Posts a message to Slack; the only sink with distinct success and
/// failure channels.
pub struct SlackSink {
    token: String,
    success_channel: String,
    failure_channel: String,
    fqdn: String,
}

#[derive(Debug, Serialize)]
struct SlackMessage<'a> {
    channel: &'a str,
    text: &'a str,
}

#[derive(Debug, Deserialize)]
struct SlackResponse {
    ok: bool,
    #[serde(default)]
    error: Option<String>,
}

impl SlackSink {
    pub fn new(token: &str, success_channel: &str, failure_channel: &str, fqdn: &str) -> Self {
        Self {
            token: token.to_string(),
            success_channel: success_channel.to_string(),
            failure_channel: failure_channel.to_string(),
            fqdn: fqdn.to_string(),
        }
    }

    fn success_text(&self, timings: &RunTimings) -> String {
        format!(
            "{}: cloudflare zone backup finished (export {:.3}s, upload {:.3}s)",
            self.fqdn,
            secs(timings.export),
            secs(timings.upload)
        )
    }

    fn failure_text(&self) -> String {
        format!("{}: cloudflare zone backup FAILED", self.fqdn)
    }

    fn post_message(&self, channel: &str, text: &str) -> Result<()> {
        let client = reqwest::blocking::Client::builder()
            .timeout(HTTP_TIMEOUT)
            .build()
            .map_err(|e| BackupError::Reporting(format!("failed to build HTTP client: {}", e)))?;

        let response = client
            .post(SLACK_POST_MESSAGE_URL)
            .bearer_auth(&self.token)
            .json(&SlackMessage { channel, text })
            .send()
            .map_err(|e| BackupError::Reporting(format!("Slack request failed: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            return Err(BackupError::Reporting(format!(
                "Slack request rejected with status {}",
                status
            )));
        }

        let body: SlackResponse = response
            .json()
            .map_err(|e| BackupError::Reporting(format!("malformed Slack response: {}", e)))?;
        if !body.ok {
            return Err(BackupError::Reporting(format!(
                "Slack API error: {}",
                body.error.unwrap_or_else(|| "unknown".to_string())
            )));
        }

        info!("Posted Slack message to {}", channel);
        Ok(())
    }
}

impl ReportSink for SlackSink {
    fn name(&self) -> &'static str {
        "slack"
    }

    fn report(&self, outcome: &RunOutcome) -> Result<()> {
        match outcome {
            RunOutcome::Success(timings) => {
                self.post_message(&self.success_channel, &self.success_text(timings))
            }
            // No timings were measured; the failure channel gets a fixed
            // message.
            RunOutcome::Failure => self.post_message(&self.failure_channel, &self.failure_text()),
        }
    }
}
