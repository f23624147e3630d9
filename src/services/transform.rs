//! Reshape raw market records into the dimension and fact projections

use chrono::{DateTime, NaiveDateTime, Utc};
use std::collections::HashSet;

use crate::error::TransformError;
use crate::services::coingecko::RawMarketRecord;

/// Static coin identity, one per distinct coin id
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CoinDimensionRow {
    pub coin_id: String,
    pub symbol: String,
    pub name: String,
}

/// Point-in-time metrics for one coin in one cycle
#[derive(Debug, Clone, PartialEq)]
pub struct MarketFactRow {
    pub coin_id: String,
    pub price_usd: f64,
    pub market_cap: f64,
    pub total_volume: f64,
    pub last_updated: DateTime<Utc>,
    pub ingestion_timestamp: DateTime<Utc>,
}

/// Both projections of one extraction
#[derive(Debug, Clone, PartialEq)]
pub struct MarketSnapshot {
    pub coins: Vec<CoinDimensionRow>,
    pub facts: Vec<MarketFactRow>,
    pub ingestion_timestamp: DateTime<Utc>,
}

/// Project `records` into a [`MarketSnapshot`].
///
/// Returns `Ok(None)` for an empty batch. Every fact row carries the same
/// `ingestion_timestamp`. Dimension rows are deduplicated by coin id, first
/// occurrence wins and discovery order is kept.
pub fn transform(
    records: &[RawMarketRecord],
    ingestion_timestamp: DateTime<Utc>,
) -> Result<Option<MarketSnapshot>, TransformError> {
    if records.is_empty() {
        return Ok(None);
    }

    let mut seen: HashSet<&str> = HashSet::with_capacity(records.len());
    let mut coins = Vec::with_capacity(records.len());
    let mut facts = Vec::with_capacity(records.len());

    for record in records {
        let symbol = required(record, "symbol", record.symbol.as_ref())?;
        let name = required(record, "name", record.name.as_ref())?;
        if seen.insert(record.id.as_str()) {
            coins.push(CoinDimensionRow {
                coin_id: record.id.clone(),
                symbol: symbol.clone(),
                name: name.clone(),
            });
        }

        let last_updated_raw = required(record, "last_updated", record.last_updated.as_ref())?;
        let last_updated = parse_last_updated(last_updated_raw).map_err(|source| {
            TransformError::InvalidTimestamp {
                coin_id: record.id.clone(),
                value: last_updated_raw.clone(),
                source,
            }
        })?;

        facts.push(MarketFactRow {
            coin_id: record.id.clone(),
            price_usd: required(record, "current_price", record.current_price)?,
            market_cap: required(record, "market_cap", record.market_cap)?,
            total_volume: required(record, "total_volume", record.total_volume)?,
            last_updated,
            ingestion_timestamp,
        });
    }

    tracing::debug!(
        coins = coins.len(),
        facts = facts.len(),
        ingestion_timestamp = %ingestion_timestamp,
        "Transformed market records"
    );

    Ok(Some(MarketSnapshot {
        coins,
        facts,
        ingestion_timestamp,
    }))
}

/// ISO-8601 with an offset, or without one (read as UTC)
fn parse_last_updated(value: &str) -> Result<DateTime<Utc>, chrono::ParseError> {
    match DateTime::parse_from_rfc3339(value) {
        Ok(parsed) => Ok(parsed.with_timezone(&Utc)),
        Err(rfc3339_err) => NaiveDateTime::parse_from_str(value, "%Y-%m-%dT%H:%M:%S%.f")
            .map(|naive| naive.and_utc())
            .map_err(|_| rfc3339_err),
    }
}

fn required<T>(
    record: &RawMarketRecord,
    field: &'static str,
    value: Option<T>,
) -> Result<T, TransformError> {
    value.ok_or_else(|| TransformError::MissingField {
        coin_id: record.id.clone(),
        field,
    })
}
