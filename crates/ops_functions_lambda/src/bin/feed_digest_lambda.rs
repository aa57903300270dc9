use aws_config::BehaviorVersion;
use chrono::Utc;
use lambda_runtime::{service_fn, Error, LambdaEvent};
use ops_functions_core::contract::FunctionResponse;
use ops_functions_lambda::adapters::aws::{DynamoRecordTable, SnsNotifier};
use ops_functions_lambda::adapters::chat_completion::OpenRouterClient;
use ops_functions_lambda::adapters::feed_source::HttpFeedSource;
use ops_functions_lambda::config::FeedDigestConfig;
use ops_functions_lambda::handlers::feed_digest::{handle_digest_request, DigestServices};
use ops_functions_lambda::telemetry;

struct FeedDigestDeps {
    config: FeedDigestConfig,
    feed: HttpFeedSource,
    completion: OpenRouterClient,
    table: DynamoRecordTable,
    notifier: SnsNotifier,
}

// Scheduled trigger; the payload carries nothing the digest needs.
async fn handle_request(
    _event: LambdaEvent<serde_json::Value>,
    deps: &FeedDigestDeps,
) -> Result<FunctionResponse, Error> {
    let services = DigestServices {
        feed: &deps.feed,
        completion: &deps.completion,
        table: &deps.table,
        notifier: &deps.notifier,
    };

    handle_digest_request(&deps.config, &services, Utc::now()).map_err(Error::from)
}

#[tokio::main]
async fn main() -> Result<(), Error> {
    telemetry::init_logging()?;
    let config = FeedDigestConfig::from_env()?;

    let aws_config = aws_config::load_defaults(BehaviorVersion::latest()).await;
    let deps = FeedDigestDeps {
        feed: HttpFeedSource::new()?,
        completion: OpenRouterClient::new(&config.api_key)?,
        table: DynamoRecordTable::new(aws_sdk_dynamodb::Client::new(&aws_config)),
        notifier: SnsNotifier::new(aws_sdk_sns::Client::new(&aws_config)),
        config,
    };
    let deps = &deps;

    lambda_runtime::run(service_fn(move |event| async move {
        handle_request(event, deps).await
    }))
    .await
}
