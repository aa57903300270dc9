use aws_config::BehaviorVersion;
use lambda_runtime::{service_fn, Error, LambdaEvent};
use ops_functions_core::contract::{FunctionResponse, StorageEvent};
use ops_functions_lambda::adapters::aws::{S3ObjectStore, SnsNotifier};
use ops_functions_lambda::config::BackupConfig;
use ops_functions_lambda::handlers::backup::handle_storage_event;
use ops_functions_lambda::telemetry;

struct BackupDeps {
    config: BackupConfig,
    store: S3ObjectStore,
    notifier: SnsNotifier,
}

async fn handle_request(
    event: LambdaEvent<serde_json::Value>,
    deps: &BackupDeps,
) -> Result<FunctionResponse, Error> {
    let storage_event: StorageEvent = serde_json::from_value(event.payload)
        .map_err(|error| Error::from(format!("invalid storage event: {error}")))?;

    handle_storage_event(&storage_event, &deps.config, &deps.store, &deps.notifier)
        .map_err(Error::from)
}

#[tokio::main]
async fn main() -> Result<(), Error> {
    telemetry::init_logging()?;
    let config = BackupConfig::from_env()?;

    let aws_config = aws_config::load_defaults(BehaviorVersion::latest()).await;
    let deps = BackupDeps {
        config,
        store: S3ObjectStore::new(aws_sdk_s3::Client::new(&aws_config)),
        notifier: SnsNotifier::new(aws_sdk_sns::Client::new(&aws_config)),
    };
    let deps = &deps;

    lambda_runtime::run(service_fn(move |event| async move {
        handle_request(event, deps).await
    }))
    .await
}
