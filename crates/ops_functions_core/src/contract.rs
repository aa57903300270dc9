use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Event-kind prefix shared by every object-creation notification.
pub const OBJECT_CREATED_PREFIX: &str = "ObjectCreated:";
pub const COPIED_STATUS: &str = "COPIED";
pub const BACKUP_NOTIFICATION_SUBJECT: &str = "File Backed Up";

/// Batch of storage notifications delivered to the backup function.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct StorageEvent {
    #[serde(rename = "Records", default)]
    pub records: Vec<ChangeRecord>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ChangeRecord {
    #[serde(rename = "eventName", default)]
    pub event_name: String,
    pub s3: StorageEntity,
}

impl ChangeRecord {
    pub fn is_object_created(&self) -> bool {
        self.event_name.starts_with(OBJECT_CREATED_PREFIX)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct StorageEntity {
    pub bucket: BucketRef,
    pub object: ObjectRef,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct BucketRef {
    pub name: String,
}

/// Object descriptor as delivered on the wire; `key` is still percent-encoded.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ObjectRef {
    pub key: String,
    #[serde(rename = "versionId", default, skip_serializing_if = "Option::is_none")]
    pub version_id: Option<String>,
}

/// Result of a completed backup copy. Serialized once for the log record and
/// once for the notification body.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct CopyOutcome {
    pub status: String,
    pub source_bucket: String,
    pub source_key: String,
    pub version_id: Option<String>,
    pub backup_bucket: String,
    pub backup_key: String,
}

impl CopyOutcome {
    pub fn copied(
        source_bucket: impl Into<String>,
        source_key: impl Into<String>,
        version_id: Option<String>,
        backup_bucket: impl Into<String>,
        backup_key: impl Into<String>,
    ) -> Self {
        Self {
            status: COPIED_STATUS.to_string(),
            source_bucket: source_bucket.into(),
            source_key: source_key.into(),
            version_id,
            backup_bucket: backup_bucket.into(),
            backup_key: backup_key.into(),
        }
    }
}

/// Response envelope returned by every function.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct FunctionResponse {
    #[serde(rename = "statusCode")]
    pub status_code: u16,
    pub body: String,
}

impl FunctionResponse {
    pub fn ok(body: Value) -> Self {
        Self {
            status_code: 200,
            body: body.to_string(),
        }
    }
}
