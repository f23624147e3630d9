use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::config::{EtlConfig, MarketsQuery};
use crate::error::ExtractError;

/// One entry of the `/coins/markets` response.
///
/// Only `id` is required for decoding. The remaining selected fields are
/// optional here so that a record missing one of them reaches the transform
/// step and is reported there, instead of failing the whole response decode.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawMarketRecord {
    pub id: String,
    #[serde(default)]
    pub symbol: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub current_price: Option<f64>,
    #[serde(default)]
    pub market_cap: Option<f64>,
    #[serde(default)]
    pub total_volume: Option<f64>,
    /// ISO-8601, as reported by CoinGecko
    #[serde(default)]
    pub last_updated: Option<String>,
}

/// Where a cycle's raw records come from
#[async_trait]
pub trait MarketSource: Send + Sync {
    async fn fetch_markets(&self) -> Result<Vec<RawMarketRecord>, ExtractError>;
}

#[derive(Clone)]
pub struct CoinGeckoService {
    client: Client,
    base_url: String,
    query: MarketsQuery,
}

impl CoinGeckoService {
    pub fn new(
        base_url: String,
        query: MarketsQuery,
        timeout: Duration,
    ) -> Result<Self, ExtractError> {
        let client = Client::builder().timeout(timeout).build()?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            query,
        })
    }

    pub fn from_config(config: &EtlConfig) -> Result<Self, ExtractError> {
        Self::new(
            config.coingecko_base_url.clone(),
            config.markets.clone(),
            config.http_timeout,
        )
    }

    /// Query string for `/coins/markets`. Sparkline data is always off.
    pub fn markets_params(query: &MarketsQuery) -> Vec<(&'static str, String)> {
        vec![
            ("vs_currency", query.vs_currency.clone()),
            ("ids", query.coin_ids.join(",")),
            ("order", query.order.clone()),
            ("per_page", query.per_page.to_string()),
            ("page", query.page.to_string()),
            ("sparkline", "false".to_string()),
        ]
    }

    /// Fetch market snapshots for the tracked coins. Single request, no retry.
    pub async fn fetch_markets(&self) -> Result<Vec<RawMarketRecord>, ExtractError> {
        tracing::info!(
            coins = %self.query.coin_ids.join(","),
            vs_currency = %self.query.vs_currency,
            "Fetching markets from CoinGecko"
        );

        let url = format!("{}/coins/markets", self.base_url);

        let response = self
            .client
            .get(&url)
            .header("accept", "application/json")
            .query(&Self::markets_params(&self.query))
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(ExtractError::Status { status, body });
        }

        let body = response.bytes().await?;
        let records: Vec<RawMarketRecord> = serde_json::from_slice(&body)?;

        tracing::info!("Fetched {} market records from CoinGecko", records.len());

        Ok(records)
    }
}

#[async_trait]
impl MarketSource for CoinGeckoService {
    async fn fetch_markets(&self) -> Result<Vec<RawMarketRecord>, ExtractError> {
        CoinGeckoService::fetch_markets(self).await
    }
}
