use ops_functions_core::contract::{StorageEvent, BACKUP_NOTIFICATION_SUBJECT};
use ops_functions_lambda::adapters::object_store::{
    CopyRequest, ServerSideEncryption, StorageErrorKind,
};
use ops_functions_lambda::config::BackupConfig;
use ops_functions_lambda::handlers::backup::{handle_storage_event, BackupError};
use ops_functions_lambda::test_helpers::{
    capture_logs, records_for_event, RecordingNotifier, RecordingObjectStore,
};
use serde_json::{json, Value};

fn backup_config() -> BackupConfig {
    BackupConfig::from_lookup(|name: &str| match name {
        "BACKUP_BUCKET" => Some("uploads-backup".to_string()),
        "TOPIC_ARN" => Some("arn:aws:sns:eu-west-2:123456789012:backups".to_string()),
        _ => None,
    })
    .expect("backup config")
}

fn storage_event(payload: Value) -> StorageEvent {
    serde_json::from_value(payload).expect("storage event")
}

fn put_record(key: &str) -> Value {
    json!({
        "eventVersion": "2.1",
        "eventSource": "aws:s3",
        "eventName": "ObjectCreated:Put",
        "s3": {
            "bucket": {"name": "uploads", "arn": "arn:aws:s3:::uploads"},
            "object": {"key": key, "size": 2048, "eTag": "abc123"}
        }
    })
}

#[test]
fn encoded_upload_is_copied_encrypted_and_announced() {
    let store = RecordingObjectStore::new();
    let notifier = RecordingNotifier::new();
    let event = storage_event(json!({ "Records": [put_record("reports%2F2024.csv")] }));

    let (result, logs) =
        capture_logs(|| handle_storage_event(&event, &backup_config(), &store, &notifier));
    let response = result.expect("backup should succeed");

    assert_eq!(response.status_code, 200);
    assert_eq!(
        store.copies(),
        vec![CopyRequest {
            source_bucket: "uploads".to_string(),
            source_key: "reports/2024.csv".to_string(),
            version_id: None,
            destination_bucket: "uploads-backup".to_string(),
            destination_key: "reports/2024.csv".to_string(),
            encryption: ServerSideEncryption::Aes256,
        }]
    );

    let published = notifier.published();
    assert_eq!(published.len(), 1);
    assert_eq!(published[0].subject, BACKUP_NOTIFICATION_SUBJECT);
    assert!(published[0].message.contains("\"status\":\"COPIED\""));
    assert!(published[0]
        .message
        .contains("\"backupKey\":\"reports/2024.csv\""));

    assert_eq!(records_for_event(&logs, "copied").len(), 1);
    assert_eq!(records_for_event(&logs, "batch_done").len(), 1);
}

#[test]
fn redelivered_batch_copies_each_object_once() {
    let store = RecordingObjectStore::new();
    let notifier = RecordingNotifier::new();
    let event = storage_event(json!({
        "Records": [put_record("a.txt"), put_record("nested%2Fb+c.txt")]
    }));

    handle_storage_event(&event, &backup_config(), &store, &notifier).expect("first delivery");
    let (result, logs) =
        capture_logs(|| handle_storage_event(&event, &backup_config(), &store, &notifier));
    result.expect("second delivery");

    assert_eq!(store.copies().len(), 2);
    assert_eq!(notifier.published().len(), 2);
    let skips = records_for_event(&logs, "skip_copy");
    assert_eq!(skips.len(), 2);
    assert_eq!(skips[1]["key"], "nested/b c.txt");
}

#[test]
fn denied_probe_fails_the_invocation() {
    let store = RecordingObjectStore::new();
    store.fail_probe("secret.txt", StorageErrorKind::PermissionDenied);
    let notifier = RecordingNotifier::new();
    let event = storage_event(json!({ "Records": [put_record("secret.txt")] }));

    let error = handle_storage_event(&event, &backup_config(), &store, &notifier)
        .expect_err("denied probe should fail");

    assert!(matches!(error, BackupError::Probe { .. }));
    assert!(error.to_string().contains("permission_denied"));
    assert!(store.copies().is_empty());
    assert!(notifier.published().is_empty());
}

#[test]
fn record_without_storage_entity_rejects_the_batch() {
    let parsed: Result<StorageEvent, _> = serde_json::from_value(json!({
        "Records": [{"eventName": "ObjectCreated:Put"}]
    }));

    assert!(parsed.is_err());
}
