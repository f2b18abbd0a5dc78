// Integration tests for the backup pipeline over mock provider and store

use cf_zone_backup::managers::backup::RunOutcome;
use cf_zone_backup::providers::mock::MockProvider;
use cf_zone_backup::storage::mock::MockStore;
use cf_zone_backup::{BackupError, BackupManager, Config, DnsProvider};
use chrono::{DateTime, TimeZone, Utc};
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

fn test_config(base: &Path) -> Config {
    Config {
        cloudflare_token: "cf-token".to_string(),
        backup_dir: PathBuf::from(base),
        namespace: "ns".to_string(),
        hostname: "host".to_string(),
        aws_region: "eu-west-1".to_string(),
        aws_bucket: "zone-backups".to_string(),
        aws_access_key: "ak".to_string(),
        aws_secret_key: "sk".to_string(),
        aws_endpoint: None,
        pushgateway_url: None,
        slack_token: None,
        slack_success_channel: None,
        slack_failure_channel: None,
    }
}

fn fixed_now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap()
}

#[test]
fn test_two_zone_scenario_produces_mirrored_artifacts() {
    let temp = TempDir::new().unwrap();
    let config = test_config(temp.path());
    let provider = MockProvider::new()
        .with_zone("z1", "a.com")
        .with_zone("z2", "b.com");
    let store = MockStore::new();

    let timings = BackupManager::new(&config, &provider, &store)
        .run_at(fixed_now())
        .unwrap();

    // Artifact count = 2 x zone count, both locally and remotely.
    assert_eq!(timings.zones, 2);
    assert_eq!(timings.files, 4);

    let local_dir = temp.path().join("ns/host/2024-01-01_00-00_UTC");
    let mut local_files: Vec<String> = fs::read_dir(&local_dir)
        .unwrap()
        .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
        .collect();
    local_files.sort();
    assert_eq!(
        local_files,
        vec!["a.com.bind", "a.com.json", "b.com.bind", "b.com.json"]
    );

    let mut keys = store.uploaded_keys();
    keys.sort();
    assert_eq!(
        keys,
        vec![
            "ns/host/2024-01-01_00-00_UTC/a.com.bind",
            "ns/host/2024-01-01_00-00_UTC/a.com.json",
            "ns/host/2024-01-01_00-00_UTC/b.com.bind",
            "ns/host/2024-01-01_00-00_UTC/b.com.json",
        ]
    );
}

#[test]
fn test_path_symmetry_between_local_and_remote() {
    let temp = TempDir::new().unwrap();
    let config = test_config(temp.path());
    let provider = MockProvider::new().with_zone("z1", "a.com");
    let store = MockStore::new();

    BackupManager::new(&config, &provider, &store)
        .run_at(fixed_now())
        .unwrap();

    // Every uploaded key equals the uploaded file's path relative to the
    // backup base directory.
    for put in store.puts.lock().unwrap().iter() {
        let relative = put.file.strip_prefix(temp.path()).unwrap();
        assert_eq!(put.key, relative.to_string_lossy());
        assert_eq!(put.bucket, "zone-backups");
    }
}

#[test]
fn test_rerun_in_same_minute_fails_without_overwriting() {
    let temp = TempDir::new().unwrap();
    let config = test_config(temp.path());
    let provider = MockProvider::new().with_zone("z1", "a.com");
    let store = MockStore::new();
    let manager = BackupManager::new(&config, &provider, &store);

    manager.run_at(fixed_now()).unwrap();
    let marker = temp.path().join("ns/host/2024-01-01_00-00_UTC/a.com.bind");
    let original = fs::read_to_string(&marker).unwrap();

    let err = manager.run_at(fixed_now()).unwrap_err();
    match err {
        BackupError::Io(io) => assert_eq!(io.kind(), std::io::ErrorKind::AlreadyExists),
        other => panic!("expected Io error, got {:?}", other),
    }
    assert_eq!(fs::read_to_string(&marker).unwrap(), original);
}

#[test]
fn test_export_failure_leaves_artifacts_but_uploads_nothing() {
    let temp = TempDir::new().unwrap();
    let config = test_config(temp.path());
    let provider = MockProvider::new()
        .with_zone("z1", "a.com")
        .with_zone("z2", "b.com")
        .with_zone("z3", "c.com")
        .fail_export_of("z2");
    let store = MockStore::new();

    let err = BackupManager::new(&config, &provider, &store)
        .run_at(fixed_now())
        .unwrap_err();
    assert!(matches!(err, BackupError::Provider(_)));

    let local_dir = temp.path().join("ns/host/2024-01-01_00-00_UTC");
    assert!(local_dir.join("a.com.bind").is_file());
    assert!(local_dir.join("a.com.json").is_file());
    assert!(!local_dir.join("b.com.bind").exists());
    assert!(!local_dir.join("c.com.bind").exists());
    assert_eq!(store.put_count(), 0);
}

#[test]
fn test_upload_failure_leaves_uploaded_set_partial() {
    let temp = TempDir::new().unwrap();
    let config = test_config(temp.path());
    let provider = MockProvider::new()
        .with_zone("z1", "a.com")
        .with_zone("z2", "b.com");
    let store = MockStore::new().fail_at(2);

    let err = BackupManager::new(&config, &provider, &store)
        .run_at(fixed_now())
        .unwrap_err();
    assert!(matches!(err, BackupError::Storage(_)));
    // Objects uploaded before the failure are not rolled back.
    assert_eq!(store.put_count(), 2);
}

#[test]
fn test_empty_zone_list_is_a_successful_run() {
    let temp = TempDir::new().unwrap();
    let config = test_config(temp.path());
    let provider = MockProvider::new();
    let store = MockStore::new();

    let timings = BackupManager::new(&config, &provider, &store)
        .run_at(fixed_now())
        .unwrap();

    assert_eq!(timings.zones, 0);
    assert_eq!(timings.files, 0);
    assert!(timings.export < std::time::Duration::from_secs(5));

    let local_dir = temp.path().join("ns/host/2024-01-01_00-00_UTC");
    assert!(local_dir.is_dir());
    assert_eq!(fs::read_dir(local_dir).unwrap().count(), 0);
    assert_eq!(store.put_count(), 0);

    // The outcome carries the timings through to the reporter unchanged.
    match RunOutcome::Success(timings) {
        RunOutcome::Success(t) => assert_eq!(t, timings),
        RunOutcome::Failure => unreachable!(),
    }
}

#[test]
fn test_bind_export_content_is_written_verbatim() {
    let temp = TempDir::new().unwrap();
    let config = test_config(temp.path());
    let provider = MockProvider::new().with_zone("z1", "a.com");
    let store = MockStore::new();

    BackupManager::new(&config, &provider, &store)
        .run_at(fixed_now())
        .unwrap();

    let bind = fs::read_to_string(
        temp.path().join("ns/host/2024-01-01_00-00_UTC/a.com.bind"),
    )
    .unwrap();
    assert_eq!(bind, provider.export_dns_records("z1").unwrap());
}
