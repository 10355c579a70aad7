use async_trait::async_trait;
use std::time::Duration;
use tracing::debug;

use crate::config::Config;
use crate::error::Result;

/// Source of the booking page body. Tests feed canned HTML through the same
/// pipeline a live fetch uses.
#[async_trait]
pub trait PageSource: Send + Sync {
    async fn fetch(&self) -> Result<String>;
}

/// Plain HTTP fetch with a fixed timeout. Retry policy belongs to the
/// scheduler, not here.
pub struct HttpFetcher {
    client: reqwest::Client,
    url: String,
}

impl HttpFetcher {
    pub fn new(config: &Config) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_seconds))
            .user_agent(config.user_agent.clone())
            .build()?;
        Ok(Self {
            client,
            url: config.target_url.clone(),
        })
    }
}

#[async_trait]
impl PageSource for HttpFetcher {
    async fn fetch(&self) -> Result<String> {
        debug!("Fetching booking page from {}", self.url);
        let response = self
            .client
            .get(&self.url)
            .send()
            .await?
            .error_for_status()?;
        let body = response.text().await?;
        debug!("Fetched {} bytes", body.len());
        Ok(body)
    }
}
