use super::types::Config;
use crate::error::{BackupError, Result};
use std::env;
use std::path::PathBuf;

/// Load configuration from the environment and validate it.
///
/// All parameters come from `BACKUP_*` variables; the binary takes no flags.
/// Validation happens here, before any network call is made.
pub fn load_from_env() -> Result<Config> {
    let config = Config {
        cloudflare_token: env_string("BACKUP_CLOUDFLARE_TOKEN"),
        backup_dir: PathBuf::from(env_string("BACKUP_DUMP_BASEDIR")),
        namespace: env_string("BACKUP_CLOUDFLARE_NAMESPACE"),
        hostname: env_string("BACKUP_CLOUDFLARE_HOSTNAME"),
        aws_region: env_string("BACKUP_AWS_REGION"),
        aws_bucket: env_string("BACKUP_AWS_BUCKET"),
        aws_access_key: env_string("BACKUP_AWS_ACCESS_KEY"),
        aws_secret_key: env_string("BACKUP_AWS_SECRET_KEY"),
        aws_endpoint: env_optional("BACKUP_AWS_ENDPOINT"),
        pushgateway_url: env_optional("BACKUP_PUSHGATEWAY_URL"),
        slack_token: env_optional("BACKUP_SLACK_TOKEN"),
        slack_success_channel: env_optional("BACKUP_SLACK_SUCCESS_CHANNEL"),
        slack_failure_channel: env_optional("BACKUP_SLACK_FAILURE_CHANNEL"),
    };
    validate(&config)?;
    Ok(config)
}

/// Validate a configuration snapshot.
///
/// Required fields must be non-empty; the Slack settings must be all-present
/// or all-absent so a half-configured sink cannot silently drop one side of
/// the success/failure split.
pub fn validate(config: &Config) -> Result<()> {
    let required = [
        ("BACKUP_CLOUDFLARE_TOKEN", &config.cloudflare_token),
        ("BACKUP_CLOUDFLARE_NAMESPACE", &config.namespace),
        ("BACKUP_CLOUDFLARE_HOSTNAME", &config.hostname),
        ("BACKUP_AWS_REGION", &config.aws_region),
        ("BACKUP_AWS_BUCKET", &config.aws_bucket),
        ("BACKUP_AWS_ACCESS_KEY", &config.aws_access_key),
        ("BACKUP_AWS_SECRET_KEY", &config.aws_secret_key),
    ];
    for (name, value) in required {
        if value.is_empty() {
            return Err(BackupError::Config(format!("{} is not set", name)));
        }
    }

    if config.backup_dir.as_os_str().is_empty() {
        return Err(BackupError::Config(
            "BACKUP_DUMP_BASEDIR is not set".to_string(),
        ));
    }

    let slack_parts = [
        &config.slack_token,
        &config.slack_success_channel,
        &config.slack_failure_channel,
    ];
    let set = slack_parts.iter().filter(|p| p.is_some()).count();
    if set != 0 && set != slack_parts.len() {
        return Err(BackupError::Config(
            "Slack reporting needs BACKUP_SLACK_TOKEN, BACKUP_SLACK_SUCCESS_CHANNEL \
             and BACKUP_SLACK_FAILURE_CHANNEL together"
                .to_string(),
        ));
    }

    Ok(())
}

fn env_string(name: &str) -> String {
    env::var(name).unwrap_or_default()
}

fn env_optional(name: &str) -> Option<String> {
    env::var(name).ok().filter(|v| !v.is_empty())
}
