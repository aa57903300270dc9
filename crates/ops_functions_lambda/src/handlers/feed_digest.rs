//! Weekly digest: fetch the feed, summarize the latest posts through a chat
//! completion, store the result and notify subscribers.

use chrono::{DateTime, SecondsFormat, Utc};
use ops_functions_core::contract::FunctionResponse;
use ops_functions_core::feed::{
    compose_digest_prompt, latest_posts, FeedParseError, DEFAULT_POST_LIMIT,
};
use serde_json::json;
use tracing::info;

use crate::adapters::chat_completion::ChatCompletion;
use crate::adapters::feed_source::FeedSource;
use crate::adapters::notifier::Notifier;
use crate::adapters::record_table::{RecordTable, TableItem};
use crate::config::FeedDigestConfig;

const COMPONENT: &str = "feed_digest_handler";
pub const DIGEST_NOTIFICATION_SUBJECT: &str = "Substack Meta Essay";

#[derive(Debug, thiserror::Error)]
pub enum FeedDigestError {
    #[error("{0}")]
    Fetch(String),
    #[error(transparent)]
    Parse(#[from] FeedParseError),
    #[error("{0}")]
    Completion(String),
    #[error("failed to store digest {date_key}: {message}")]
    Store { date_key: String, message: String },
    #[error("failed to publish digest: {0}")]
    Publish(String),
}

/// External services the digest run talks to.
pub struct DigestServices<'a, F, C, T, N> {
    pub feed: &'a F,
    pub completion: &'a C,
    pub table: &'a T,
    pub notifier: &'a N,
}

pub fn handle_digest_request<F, C, T, N>(
    config: &FeedDigestConfig,
    services: &DigestServices<'_, F, C, T, N>,
    now: DateTime<Utc>,
) -> Result<FunctionResponse, FeedDigestError>
where
    F: FeedSource,
    C: ChatCompletion,
    T: RecordTable,
    N: Notifier,
{
    let document = services
        .feed
        .fetch_feed(&config.feed_url)
        .map_err(FeedDigestError::Fetch)?;
    let posts = latest_posts(&document, DEFAULT_POST_LIMIT)?;
    info!(
        component = COMPONENT,
        event = "posts_loaded",
        posts = posts.len(),
        "feed posts loaded"
    );

    let prompt = compose_digest_prompt(&posts);
    let digest = services
        .completion
        .complete(&prompt)
        .map_err(FeedDigestError::Completion)?;

    let date_key = now.format("%Y%m%d").to_string();
    let item = TableItem::from([
        ("date_key".to_string(), date_key.as_str().into()),
        (
            "timestamp".to_string(),
            now.to_rfc3339_opts(SecondsFormat::Micros, true).into(),
        ),
        ("response_html".to_string(), digest.as_str().into()),
    ]);
    services
        .table
        .put_item(&config.table_name, &item)
        .map_err(|message| FeedDigestError::Store {
            date_key: date_key.clone(),
            message,
        })?;

    services
        .notifier
        .publish(&config.topic_arn, DIGEST_NOTIFICATION_SUBJECT, &digest)
        .map_err(FeedDigestError::Publish)?;

    info!(
        component = COMPONENT,
        event = "digest_stored",
        record_key = %date_key,
        posts_processed = posts.len(),
        "digest stored and published"
    );

    Ok(FunctionResponse::ok(json!({
        "message": "Success",
        "record_key": date_key,
        "posts_processed": posts.len(),
    })))
}
