use std::time::Duration;

use super::block_on;

const FEED_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

pub trait FeedSource {
    fn fetch_feed(&self, url: &str) -> Result<String, String>;
}

/// Plain HTTP(S) GET of a feed document.
#[derive(Debug, Clone)]
pub struct HttpFeedSource {
    client: reqwest::Client,
}

impl HttpFeedSource {
    pub fn new() -> Result<Self, reqwest::Error> {
        let client = reqwest::Client::builder()
            .timeout(FEED_REQUEST_TIMEOUT)
            .build()?;
        Ok(Self { client })
    }
}

impl FeedSource for HttpFeedSource {
    fn fetch_feed(&self, url: &str) -> Result<String, String> {
        let request = self.client.get(url);
        block_on(async move {
            let response = request
                .send()
                .await
                .map_err(|error| format!("failed to fetch feed: {error}"))?;
            response
                .text()
                .await
                .map_err(|error| format!("failed to read feed body: {error}"))
        })
    }
}
