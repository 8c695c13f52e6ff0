//! HTTP client for the ECB reference rate document.

use async_trait::async_trait;
use eurofx_common::{FxError, FxResult};
use eurofx_fx::{FeedDocument, RateFeed};
use reqwest::Client;
use tracing::{debug, warn};

use crate::config::EcbClientConfig;
use crate::model::decode_document;

/// Fetches the ECB rate document, retrying server errors with a fixed delay.
pub struct EcbClient {
    http: Client,
    config: EcbClientConfig,
}

impl EcbClient {
    /// Create a new client.
    pub fn new(config: EcbClientConfig) -> FxResult<Self> {
        config.validate().map_err(FxError::Config)?;

        let http = Client::builder()
            .timeout(config.request_timeout)
            .build()
            .map_err(|e| FxError::Config(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self { http, config })
    }

    /// Fetch the raw document body.
    ///
    /// 5xx responses and network failures are retried up to `max_retries`
    /// times. Any other non-2xx status fails immediately.
    pub async fn fetch_raw(&self) -> FxResult<String> {
        let mut attempt = 0;
        loop {
            match self.fetch_once().await {
                Ok(body) => return Ok(body),
                Err(e) if e.is_retryable() && attempt < self.config.max_retries => {
                    attempt += 1;
                    warn!(
                        url = %self.config.url,
                        attempt,
                        max_retries = self.config.max_retries,
                        error = %e,
                        "Rate fetch failed, retrying"
                    );
                    tokio::time::sleep(self.config.retry_delay).await;
                }
                Err(e) => return Err(e),
            }
        }
    }

    async fn fetch_once(&self) -> FxResult<String> {
        debug!("GET {}", self.config.url);

        let response = self
            .http
            .get(&self.config.url)
            .send()
            .await
            .map_err(|e| FxError::Request(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(FxError::Transport {
                status_code: status.as_u16(),
            });
        }

        response
            .text()
            .await
            .map_err(|e| FxError::Request(format!("Failed to read response body: {}", e)))
    }
}

#[async_trait]
impl RateFeed for EcbClient {
    fn name(&self) -> &str {
        "ECB"
    }

    async fn fetch(&self) -> FxResult<FeedDocument> {
        let body = self.fetch_raw().await?;
        decode_document(&body)
    }
}
