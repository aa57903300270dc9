use rand::Rng;
use serde_json::{json, Value};
use tracing::{error, info};

const COMPONENT: &str = "health_handler";
const SIMULATED_FAILURE_PROBABILITY: f64 = 0.4;

/// Liveness stub. Occasionally logs a fake dependency failure so alerting on
/// the log group can be exercised end to end; the response is always ok.
pub fn handle_health_check(rng: &mut impl Rng) -> Value {
    info!(component = COMPONENT, event = "health_ok", "health check ok");
    if rng.gen_bool(SIMULATED_FAILURE_PROBABILITY) {
        error!(
            component = COMPONENT,
            event = "simulated_failure",
            "simulated failure: TimeoutError connecting to DB"
        );
    }
    json!({ "ok": true })
}
