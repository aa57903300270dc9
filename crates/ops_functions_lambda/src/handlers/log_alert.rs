use ops_functions_core::contract::FunctionResponse;
use ops_functions_core::log_subscription::{
    alert_subject, decode_subscription_data, summarize_matches, AlertMatch,
    SubscriptionDecodeError, SubscriptionEnvelope,
};
use serde_json::json;
use tracing::info;

use crate::adapters::notifier::Notifier;
use crate::adapters::record_table::{RecordTable, TableItem};
use crate::config::LogAlertConfig;

const COMPONENT: &str = "log_alert_handler";

#[derive(Debug, thiserror::Error)]
pub enum LogAlertError {
    #[error("failed to decode log subscription payload: {0}")]
    Decode(#[from] SubscriptionDecodeError),
    #[error("failed to store alert {id}: {message}")]
    Store { id: String, message: String },
    #[error("failed to serialize alert summary: {0}")]
    Serialize(#[from] serde_json::Error),
    #[error("failed to publish alert summary: {0}")]
    Publish(String),
}

/// Decode a subscription delivery, persist every matching line and send one
/// summary notification per delivery with at least one match.
pub fn handle_log_subscription(
    envelope: &SubscriptionEnvelope,
    config: &LogAlertConfig,
    table: &impl RecordTable,
    notifier: &impl Notifier,
) -> Result<FunctionResponse, LogAlertError> {
    let batch = decode_subscription_data(&envelope.awslogs.data)?;
    let matches = config.matcher.collect_matches(&batch);

    for alert in &matches {
        table
            .put_item(&config.table_name, &alert_item(alert))
            .map_err(|message| LogAlertError::Store {
                id: alert.id.clone(),
                message,
            })?;
    }

    if let Some(summary) = summarize_matches(&matches) {
        let body = serde_json::to_string_pretty(&summary)?;
        notifier
            .publish(
                &config.topic_arn,
                &alert_subject(&batch.log_group, summary.count),
                &body,
            )
            .map_err(LogAlertError::Publish)?;
    }

    info!(
        component = COMPONENT,
        event = "log_batch_done",
        group = %batch.log_group,
        matched = matches.len(),
        "log batch processed"
    );

    Ok(FunctionResponse::ok(
        json!({ "ok": true, "matched": matches.len() }),
    ))
}

fn alert_item(alert: &AlertMatch) -> TableItem {
    TableItem::from([
        ("service".to_string(), alert.service.as_str().into()),
        ("ts".to_string(), alert.ts.into()),
        ("level".to_string(), alert.level.as_str().into()),
        ("stream".to_string(), alert.stream.as_str().into()),
        ("id".to_string(), alert.id.as_str().into()),
        ("message".to_string(), alert.message.as_str().into()),
    ])
}
