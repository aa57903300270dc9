use lambda_runtime::{service_fn, Error, LambdaEvent};
use ops_functions_lambda::handlers::health::handle_health_check;
use ops_functions_lambda::telemetry;
use serde_json::Value;

async fn handle_request(_event: LambdaEvent<Value>) -> Result<Value, Error> {
    Ok(handle_health_check(&mut rand::thread_rng()))
}

#[tokio::main]
async fn main() -> Result<(), Error> {
    telemetry::init_logging()?;
    lambda_runtime::run(service_fn(handle_request)).await
}
