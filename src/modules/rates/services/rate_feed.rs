use crate::core::{AppError, Result};
use crate::modules::rates::models::RateSource;
use async_trait::async_trait;
use reqwest::Client;
use rust_decimal::Decimal;
use serde::Deserialize;
use std::collections::HashMap;
use std::time::Duration;

/// A source of the USD -> IDR exchange rate
#[async_trait]
pub trait RateFeed: Send + Sync {
    /// Which cache slot a successful fetch is attributed to
    fn source(&self) -> RateSource;

    async fn fetch(&self) -> Result<Decimal>;
}

/// Expected feed response shape: `{"rates": {"IDR": 15800.0, ...}}`
#[derive(Debug, Deserialize)]
struct RateFeedResponse {
    rates: HashMap<String, Decimal>,
}

/// HTTP exchange-rate feed client
pub struct HttpRateFeed {
    client: Client,
    url: String,
    source: RateSource,
}

impl HttpRateFeed {
    /// Create a feed client for the given endpoint.
    ///
    /// # Arguments
    /// * `url` - Feed endpoint returning a `rates` map keyed by currency code
    /// * `source` - Cache slot this feed fills (primary or backup)
    pub fn new(url: String, source: RateSource) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .map_err(AppError::Transport)?;

        Ok(Self {
            client,
            url,
            source,
        })
    }
}

#[async_trait]
impl RateFeed for HttpRateFeed {
    fn source(&self) -> RateSource {
        self.source
    }

    async fn fetch(&self) -> Result<Decimal> {
        let response = self
            .client
            .get(&self.url)
            .send()
            .await
            .map_err(|e| AppError::rate_fetch(format!("{} feed unreachable: {}", self.source, e)))?;

        if !response.status().is_success() {
            return Err(AppError::rate_fetch(format!(
                "{} feed answered HTTP {}",
                self.source,
                response.status().as_u16()
            )));
        }

        let body: RateFeedResponse = response
            .json()
            .await
            .map_err(|e| AppError::rate_fetch(format!("{} feed body unreadable: {}", self.source, e)))?;

        let rate = body
            .rates
            .get("IDR")
            .copied()
            .ok_or_else(|| AppError::rate_fetch(format!("{} feed has no IDR rate", self.source)))?;

        if rate <= Decimal::ZERO {
            return Err(AppError::rate_fetch(format!(
                "{} feed returned non-positive rate {}",
                self.source, rate
            )));
        }

        Ok(rate)
    }
}
