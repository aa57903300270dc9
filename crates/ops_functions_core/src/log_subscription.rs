//! Log-subscription batch decoding and alert matching.
//!
//! Subscription payloads arrive as `{"awslogs": {"data": "..."}}` where `data`
//! is base64-encoded gzip of a JSON batch for one log group and stream.

use std::io::Read;

use base64::Engine as _;
use flate2::read::MultiGzDecoder;
use regex::{Regex, RegexBuilder};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub const DEFAULT_LEVEL_PATTERN: &str = r"(ERROR|Exception|Traceback|Timeout)";
pub const ALERT_LEVEL: &str = "ERROR";
pub const MAX_MESSAGE_CHARS: usize = 2_000;
pub const SUMMARY_EXAMPLE_CHARS: usize = 180;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SubscriptionEnvelope {
    pub awslogs: EncodedLogData,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct EncodedLogData {
    pub data: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct SubscriptionBatch {
    #[serde(default)]
    pub owner: String,
    pub log_group: String,
    pub log_stream: String,
    #[serde(default)]
    pub message_type: Option<String>,
    #[serde(default)]
    pub subscription_filters: Vec<String>,
    #[serde(default)]
    pub log_events: Vec<LogEvent>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct LogEvent {
    #[serde(default)]
    pub id: Option<String>,
    pub timestamp: i64,
    #[serde(default)]
    pub message: String,
}

#[derive(Debug, thiserror::Error)]
pub enum SubscriptionDecodeError {
    #[error("invalid base64 log payload: {0}")]
    Base64(#[from] base64::DecodeError),
    #[error("failed to inflate log payload: {0}")]
    Inflate(#[from] std::io::Error),
    #[error("malformed log subscription batch: {0}")]
    Json(#[from] serde_json::Error),
}

pub fn decode_subscription_data(data: &str) -> Result<SubscriptionBatch, SubscriptionDecodeError> {
    let compressed = base64::engine::general_purpose::STANDARD.decode(data.trim())?;
    let mut raw = Vec::new();
    MultiGzDecoder::new(compressed.as_slice()).read_to_end(&mut raw)?;
    Ok(serde_json::from_slice(&raw)?)
}

/// One log line that matched the alert pattern, shaped as a table item.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct AlertMatch {
    pub service: String,
    pub ts: i64,
    pub level: String,
    pub stream: String,
    pub id: String,
    pub message: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct AlertSummary {
    pub service: String,
    pub count: usize,
    pub example: String,
    pub stream: String,
    pub first_ts: i64,
    pub last_ts: i64,
}

#[derive(Debug, Clone)]
pub struct AlertMatcher {
    pattern: Regex,
}

impl AlertMatcher {
    /// Compile `pattern` case-insensitively.
    pub fn new(pattern: &str) -> Result<Self, regex::Error> {
        let pattern = RegexBuilder::new(pattern).case_insensitive(true).build()?;
        Ok(Self { pattern })
    }

    pub fn is_match(&self, message: &str) -> bool {
        self.pattern.is_match(message)
    }

    pub fn collect_matches(&self, batch: &SubscriptionBatch) -> Vec<AlertMatch> {
        batch
            .log_events
            .iter()
            .filter(|event| self.is_match(&event.message))
            .map(|event| AlertMatch {
                service: batch.log_group.clone(),
                ts: event.timestamp,
                level: ALERT_LEVEL.to_string(),
                stream: batch.log_stream.clone(),
                id: event
                    .id
                    .clone()
                    .unwrap_or_else(|| Uuid::new_v4().to_string()),
                message: truncate_chars(&event.message, MAX_MESSAGE_CHARS),
            })
            .collect()
    }
}

pub fn summarize_matches(matches: &[AlertMatch]) -> Option<AlertSummary> {
    let first = matches.first()?;
    let last = matches.last()?;
    let example = truncate_chars(&first.message.trim().replace('\n', " "), SUMMARY_EXAMPLE_CHARS);

    Some(AlertSummary {
        service: first.service.clone(),
        count: matches.len(),
        example,
        stream: first.stream.clone(),
        first_ts: first.ts,
        last_ts: last.ts,
    })
}

pub fn alert_subject(log_group: &str, count: usize) -> String {
    format!("[ALERT] {log_group} matched {count} error log(s)")
}

fn truncate_chars(value: &str, limit: usize) -> String {
    value.chars().take(limit).collect()
}
