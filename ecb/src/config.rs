//! ECB client configuration.

use std::time::Duration;

/// Rolling 90-day history of the euro foreign exchange reference rates.
pub const DEFAULT_ECB_URL: &str =
    "https://www.ecb.europa.eu/stats/eurofxref/eurofxref-hist-90d.xml";

/// Configuration for the ECB rate client.
#[derive(Debug, Clone)]
pub struct EcbClientConfig {
    /// URL of the rate document.
    pub url: String,
    /// Extra attempts after a retryable failure.
    pub max_retries: usize,
    /// Fixed delay between attempts.
    pub retry_delay: Duration,
    /// Timeout for a single request.
    pub request_timeout: Duration,
}

impl Default for EcbClientConfig {
    fn default() -> Self {
        Self {
            url: DEFAULT_ECB_URL.to_string(),
            max_retries: 3,
            retry_delay: Duration::from_secs(3),
            request_timeout: Duration::from_secs(30),
        }
    }
}

impl EcbClientConfig {
    /// Load configuration from environment variables.
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Ok(url) = std::env::var("ECB_RATES_URL") {
            config.url = url;
        }

        if let Ok(retries) = std::env::var("ECB_MAX_RETRIES") {
            if let Ok(retries) = retries.parse() {
                config.max_retries = retries;
            }
        }

        if let Ok(delay) = std::env::var("ECB_RETRY_DELAY_MS") {
            if let Ok(delay) = delay.parse() {
                config.retry_delay = Duration::from_millis(delay);
            }
        }

        if let Ok(timeout) = std::env::var("ECB_REQUEST_TIMEOUT_SECS") {
            if let Ok(timeout) = timeout.parse() {
                config.request_timeout = Duration::from_secs(timeout);
            }
        }

        config
    }

    /// Validate configuration.
    pub fn validate(&self) -> Result<(), String> {
        if self.url.is_empty() {
            return Err("Rate URL cannot be empty".to_string());
        }

        if !self.url.starts_with("http://") && !self.url.starts_with("https://") {
            return Err(format!("Rate URL must be http(s): {}", self.url));
        }

        if self.request_timeout.is_zero() {
            return Err("Request timeout cannot be zero".to_string());
        }

        Ok(())
    }
}
