//! Idempotent copy-and-notify flow for object-creation notifications.
//!
//! Records are handled strictly in order. An existing destination object is
//! taken as proof of an earlier copy and skipped. Any probe, copy or publish
//! failure aborts the rest of the batch without undoing earlier records; a
//! copy whose notification failed is not re-notified when the platform
//! redelivers the batch, because the retried probe finds the destination.

use ops_functions_core::contract::{
    ChangeRecord, CopyOutcome, FunctionResponse, StorageEvent, BACKUP_NOTIFICATION_SUBJECT,
};
use ops_functions_core::object_keys::{backup_key_for, decode_object_key};
use serde_json::json;
use tracing::{error, info};

use crate::adapters::notifier::Notifier;
use crate::adapters::object_store::{
    CopyRequest, ObjectStore, ServerSideEncryption, StorageError,
};
use crate::config::BackupConfig;

const COMPONENT: &str = "backup_handler";

#[derive(Debug, thiserror::Error)]
pub enum BackupError {
    #[error("existence check failed for {bucket}/{key}: {source}")]
    Probe {
        bucket: String,
        key: String,
        source: StorageError,
    },
    #[error("copy into {bucket}/{key} failed: {source}")]
    Copy {
        bucket: String,
        key: String,
        source: StorageError,
    },
    #[error("failed to serialize copy outcome: {0}")]
    Serialize(#[from] serde_json::Error),
    #[error("notification for {key} failed after copy: {message}")]
    Publish { key: String, message: String },
}

/// What happened to a single record of the batch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecordDisposition {
    Ignored,
    AlreadyBackedUp { key: String },
    Copied(CopyOutcome),
}

pub fn handle_storage_event(
    event: &StorageEvent,
    config: &BackupConfig,
    store: &impl ObjectStore,
    notifier: &impl Notifier,
) -> Result<FunctionResponse, BackupError> {
    let dispositions = back_up_records(event, config, store, notifier)?;

    let copied = dispositions
        .iter()
        .filter(|disposition| matches!(disposition, RecordDisposition::Copied(_)))
        .count();
    let skipped = dispositions
        .iter()
        .filter(|disposition| matches!(disposition, RecordDisposition::AlreadyBackedUp { .. }))
        .count();
    info!(
        component = COMPONENT,
        event = "batch_done",
        records = dispositions.len(),
        copied,
        skipped,
        "backup batch processed"
    );

    Ok(FunctionResponse::ok(json!({ "ok": true })))
}

/// Process every record in order, stopping at the first failure.
pub fn back_up_records(
    event: &StorageEvent,
    config: &BackupConfig,
    store: &impl ObjectStore,
    notifier: &impl Notifier,
) -> Result<Vec<RecordDisposition>, BackupError> {
    let mut dispositions = Vec::with_capacity(event.records.len());
    for record in &event.records {
        dispositions.push(back_up_record(record, config, store, notifier)?);
    }
    Ok(dispositions)
}

fn back_up_record(
    record: &ChangeRecord,
    config: &BackupConfig,
    store: &impl ObjectStore,
    notifier: &impl Notifier,
) -> Result<RecordDisposition, BackupError> {
    if !record.is_object_created() {
        return Ok(RecordDisposition::Ignored);
    }

    let source_bucket = record.s3.bucket.name.clone();
    let source_key = decode_object_key(&record.s3.object.key);
    let version_id = record
        .s3
        .object
        .version_id
        .clone()
        .filter(|version| !version.is_empty());
    let backup_key = backup_key_for(&source_key);

    match store.probe_object(&config.backup_bucket, &backup_key) {
        Ok(()) => {
            info!(
                component = COMPONENT,
                event = "skip_copy",
                key = %backup_key,
                "backup already present"
            );
            return Ok(RecordDisposition::AlreadyBackedUp { key: backup_key });
        }
        Err(error) if error.is_not_found() => {}
        Err(source) => {
            return Err(BackupError::Probe {
                bucket: config.backup_bucket.clone(),
                key: backup_key,
                source,
            });
        }
    }

    let request = CopyRequest {
        source_bucket: source_bucket.clone(),
        source_key: source_key.clone(),
        version_id: version_id.clone(),
        destination_bucket: config.backup_bucket.clone(),
        destination_key: backup_key.clone(),
        encryption: ServerSideEncryption::Aes256,
    };
    store
        .copy_object(&request)
        .map_err(|source| BackupError::Copy {
            bucket: config.backup_bucket.clone(),
            key: backup_key.clone(),
            source,
        })?;

    let outcome = CopyOutcome::copied(
        source_bucket,
        source_key,
        version_id,
        config.backup_bucket.clone(),
        backup_key,
    );
    info!(
        component = COMPONENT,
        event = "copied",
        status = %outcome.status,
        sourceBucket = %outcome.source_bucket,
        sourceKey = %outcome.source_key,
        versionId = outcome.version_id.as_deref(),
        backupBucket = %outcome.backup_bucket,
        backupKey = %outcome.backup_key,
        "object backed up"
    );

    let body = serde_json::to_string(&outcome)?;
    if let Err(message) = notifier.publish(&config.topic_arn, BACKUP_NOTIFICATION_SUBJECT, &body) {
        error!(
            component = COMPONENT,
            event = "publish_failed",
            backupKey = %outcome.backup_key,
            error = %message,
            "copy succeeded but notification was not sent"
        );
        return Err(BackupError::Publish {
            key: outcome.backup_key,
            message,
        });
    }

    Ok(RecordDisposition::Copied(outcome))
}
