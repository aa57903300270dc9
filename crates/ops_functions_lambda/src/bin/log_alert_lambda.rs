use aws_config::BehaviorVersion;
use lambda_runtime::{service_fn, Error, LambdaEvent};
use ops_functions_core::contract::FunctionResponse;
use ops_functions_core::log_subscription::SubscriptionEnvelope;
use ops_functions_lambda::adapters::aws::{DynamoRecordTable, SnsNotifier};
use ops_functions_lambda::config::LogAlertConfig;
use ops_functions_lambda::handlers::log_alert::handle_log_subscription;
use ops_functions_lambda::telemetry;

struct LogAlertDeps {
    config: LogAlertConfig,
    table: DynamoRecordTable,
    notifier: SnsNotifier,
}

async fn handle_request(
    event: LambdaEvent<serde_json::Value>,
    deps: &LogAlertDeps,
) -> Result<FunctionResponse, Error> {
    let envelope: SubscriptionEnvelope = serde_json::from_value(event.payload)
        .map_err(|error| Error::from(format!("invalid log subscription event: {error}")))?;

    handle_log_subscription(&envelope, &deps.config, &deps.table, &deps.notifier)
        .map_err(Error::from)
}

#[tokio::main]
async fn main() -> Result<(), Error> {
    telemetry::init_logging()?;
    let config = LogAlertConfig::from_env()?;

    let aws_config = aws_config::load_defaults(BehaviorVersion::latest()).await;
    let deps = LogAlertDeps {
        config,
        table: DynamoRecordTable::new(aws_sdk_dynamodb::Client::new(&aws_config)),
        notifier: SnsNotifier::new(aws_sdk_sns::Client::new(&aws_config)),
    };
    let deps = &deps;

    lambda_runtime::run(service_fn(move |event| async move {
        handle_request(event, deps).await
    }))
    .await
}
