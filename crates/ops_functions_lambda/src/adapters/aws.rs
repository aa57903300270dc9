use std::collections::HashMap;

use aws_sdk_dynamodb::types::AttributeValue;
use aws_sdk_s3::config::http::HttpResponse;
use aws_sdk_s3::error::{DisplayErrorContext, SdkError};
use ops_functions_core::object_keys::copy_source_path;

use super::block_on;
use super::notifier::Notifier;
use super::object_store::{
    CopyRequest, ObjectStore, ServerSideEncryption, StorageError, StorageErrorKind,
};
use super::record_table::{ItemValue, RecordTable, TableItem};

#[derive(Debug, Clone)]
pub struct S3ObjectStore {
    client: aws_sdk_s3::Client,
}

impl S3ObjectStore {
    pub fn new(client: aws_sdk_s3::Client) -> Self {
        Self { client }
    }
}

impl ObjectStore for S3ObjectStore {
    fn probe_object(&self, bucket: &str, key: &str) -> Result<(), StorageError> {
        let request = self.client.head_object().bucket(bucket).key(key);
        block_on(async move {
            request
                .send()
                .await
                .map(|_| ())
                .map_err(|error| classify_sdk_error("head object", error))
        })
    }

    fn copy_object(&self, request: &CopyRequest) -> Result<(), StorageError> {
        let copy_source = copy_source_path(
            &request.source_bucket,
            &request.source_key,
            request.version_id.as_deref(),
        );
        let encryption = match request.encryption {
            ServerSideEncryption::Aes256 => aws_sdk_s3::types::ServerSideEncryption::Aes256,
        };
        let call = self
            .client
            .copy_object()
            .bucket(&request.destination_bucket)
            .key(&request.destination_key)
            .copy_source(copy_source)
            .server_side_encryption(encryption);

        block_on(async move {
            call.send()
                .await
                .map(|_| ())
                .map_err(|error| classify_sdk_error("copy object", error))
        })
    }
}

fn classify_sdk_error<E>(operation: &str, error: SdkError<E, HttpResponse>) -> StorageError
where
    E: std::error::Error + 'static,
{
    let kind = match &error {
        SdkError::TimeoutError(_) | SdkError::DispatchFailure(_) | SdkError::ResponseError(_) => {
            StorageErrorKind::TransientIo
        }
        _ => error
            .raw_response()
            .map(|response| StorageErrorKind::from_status(response.status().as_u16()))
            .unwrap_or(StorageErrorKind::Other),
    };
    StorageError::new(
        kind,
        format!("{operation} failed: {}", DisplayErrorContext(&error)),
    )
}

#[derive(Debug, Clone)]
pub struct SnsNotifier {
    client: aws_sdk_sns::Client,
}

impl SnsNotifier {
    pub fn new(client: aws_sdk_sns::Client) -> Self {
        Self { client }
    }
}

impl Notifier for SnsNotifier {
    fn publish(&self, topic_arn: &str, subject: &str, message: &str) -> Result<(), String> {
        let request = self
            .client
            .publish()
            .topic_arn(topic_arn)
            .subject(subject)
            .message(message);

        block_on(async move {
            request.send().await.map(|_| ()).map_err(|error| {
                format!(
                    "failed to publish notification: {}",
                    aws_sdk_sns::error::DisplayErrorContext(&error)
                )
            })
        })
    }
}

#[derive(Debug, Clone)]
pub struct DynamoRecordTable {
    client: aws_sdk_dynamodb::Client,
}

impl DynamoRecordTable {
    pub fn new(client: aws_sdk_dynamodb::Client) -> Self {
        Self { client }
    }
}

impl RecordTable for DynamoRecordTable {
    fn put_item(&self, table_name: &str, item: &TableItem) -> Result<(), String> {
        let attributes: HashMap<String, AttributeValue> = item
            .iter()
            .map(|(name, value)| (name.clone(), attribute_value(value)))
            .collect();
        let request = self
            .client
            .put_item()
            .table_name(table_name)
            .set_item(Some(attributes));

        block_on(async move {
            request.send().await.map(|_| ()).map_err(|error| {
                format!(
                    "failed to write table item: {}",
                    aws_sdk_dynamodb::error::DisplayErrorContext(&error)
                )
            })
        })
    }
}

fn attribute_value(value: &ItemValue) -> AttributeValue {
    match value {
        ItemValue::Text(text) => AttributeValue::S(text.clone()),
        ItemValue::Number(number) => AttributeValue::N(number.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use aws_sdk_s3::operation::head_object::HeadObjectError;
    use aws_sdk_s3::types::error::NotFound;
    use aws_smithy_runtime_api::http::StatusCode;
    use aws_smithy_types::body::SdkBody;

    use super::*;

    fn raw_response(status: u16) -> HttpResponse {
        HttpResponse::new(
            StatusCode::try_from(status).expect("valid status code"),
            SdkBody::empty(),
        )
    }

    fn head_service_error(status: u16) -> SdkError<HeadObjectError, HttpResponse> {
        SdkError::service_error(
            HeadObjectError::NotFound(NotFound::builder().build()),
            raw_response(status),
        )
    }

    #[test]
    fn service_errors_are_classified_by_status() {
        let missing = classify_sdk_error("head object", head_service_error(404));
        assert!(missing.is_not_found());
        assert!(missing.message.starts_with("head object failed"));

        let denied = classify_sdk_error("head object", head_service_error(403));
        assert_eq!(denied.kind, StorageErrorKind::PermissionDenied);

        let throttled = classify_sdk_error("head object", head_service_error(503));
        assert_eq!(throttled.kind, StorageErrorKind::TransientIo);

        let rejected = classify_sdk_error("head object", head_service_error(400));
        assert_eq!(rejected.kind, StorageErrorKind::Other);
    }

    #[test]
    fn transport_failures_are_transient() {
        let timeout: SdkError<HeadObjectError, HttpResponse> =
            SdkError::timeout_error("deadline exceeded");
        assert_eq!(
            classify_sdk_error("copy object", timeout).kind,
            StorageErrorKind::TransientIo
        );

        let truncated: SdkError<HeadObjectError, HttpResponse> =
            SdkError::response_error("truncated body", raw_response(200));
        assert_eq!(
            classify_sdk_error("copy object", truncated).kind,
            StorageErrorKind::TransientIo
        );
    }
}
