use anyhow::Result;
use cf_zone_backup::managers::backup::RunOutcome;
use cf_zone_backup::{
    config, init_console_logging, BackupManager, CloudflareClient, Reporter, S3ObjectStore,
};
use tracing::error;

fn main() -> Result<()> {
    init_console_logging();

    // All parameters come from BACKUP_* environment variables; validation
    // fails fast before any network call.
    let config = config::load_from_env()?;

    let provider = CloudflareClient::new(&config.cloudflare_token)?;
    let store = S3ObjectStore::new(
        &config.aws_region,
        &config.aws_access_key,
        &config.aws_secret_key,
        config.aws_endpoint.as_deref(),
    )?;

    let manager = BackupManager::new(&config, &provider, &store);
    let reporter = Reporter::from_config(&config);

    // The pipeline does not catch its own errors; the only error-path
    // branch is here, where the failure notification fires before the
    // process exits non-zero. Reporting errors themselves propagate.
    match manager.run() {
        Ok(timings) => {
            reporter.report(&RunOutcome::Success(timings))?;
            Ok(())
        }
        Err(err) => {
            error!("Backup run failed: {}", err);
            reporter.report(&RunOutcome::Failure)?;
            Err(err.into())
        }
    }
}
