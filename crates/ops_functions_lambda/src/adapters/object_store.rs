use std::fmt;

/// Closed classification of storage failures, independent of transport.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageErrorKind {
    NotFound,
    TransientIo,
    PermissionDenied,
    Other,
}

impl StorageErrorKind {
    pub fn from_status(status: u16) -> Self {
        match status {
            404 => Self::NotFound,
            401 | 403 => Self::PermissionDenied,
            408 | 429 | 500..=599 => Self::TransientIo,
            _ => Self::Other,
        }
    }

    fn as_str(self) -> &'static str {
        match self {
            Self::NotFound => "not_found",
            Self::TransientIo => "transient_io",
            Self::PermissionDenied => "permission_denied",
            Self::Other => "other",
        }
    }
}

impl fmt::Display for StorageErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{kind}: {message}")]
pub struct StorageError {
    pub kind: StorageErrorKind,
    pub message: String,
}

impl StorageError {
    pub fn new(kind: StorageErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(StorageErrorKind::NotFound, message)
    }

    pub fn is_not_found(&self) -> bool {
        self.kind == StorageErrorKind::NotFound
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ServerSideEncryption {
    Aes256,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CopyRequest {
    pub source_bucket: String,
    pub source_key: String,
    pub version_id: Option<String>,
    pub destination_bucket: String,
    pub destination_key: String,
    pub encryption: ServerSideEncryption,
}

pub trait ObjectStore {
    /// Metadata-only existence probe. A missing object is reported as an
    /// error of kind [`StorageErrorKind::NotFound`].
    fn probe_object(&self, bucket: &str, key: &str) -> Result<(), StorageError>;

    fn copy_object(&self, request: &CopyRequest) -> Result<(), StorageError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn maps_status_codes_to_kinds() {
        assert_eq!(StorageErrorKind::from_status(404), StorageErrorKind::NotFound);
        assert_eq!(
            StorageErrorKind::from_status(403),
            StorageErrorKind::PermissionDenied
        );
        assert_eq!(
            StorageErrorKind::from_status(401),
            StorageErrorKind::PermissionDenied
        );
        assert_eq!(StorageErrorKind::from_status(503), StorageErrorKind::TransientIo);
        assert_eq!(StorageErrorKind::from_status(429), StorageErrorKind::TransientIo);
        assert_eq!(StorageErrorKind::from_status(400), StorageErrorKind::Other);
    }

    #[test]
    fn display_includes_kind_and_message() {
        let error = StorageError::new(StorageErrorKind::PermissionDenied, "head object denied");
        assert_eq!(error.to_string(), "permission_denied: head object denied");
        assert!(!error.is_not_found());
    }
}
