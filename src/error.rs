//! Error types for each pipeline stage
//!
//! Connection and configuration errors are fatal at startup. Everything a
//! single cycle can produce is wrapped in [`CycleError`] and handled by the
//! scheduler without stopping the process.

use sea_orm::DbErr;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid value for {key}: {value:?} ({reason})")]
    InvalidValue {
        key: &'static str,
        value: String,
        reason: String,
    },

    #[error("{key} must list at least one coin id")]
    EmptyCoinList { key: &'static str },
}

#[derive(Debug, Error)]
pub enum ConnectError {
    #[error("Could not connect to the database after {attempts} attempts: {last_error}")]
    Exhausted { attempts: u32, last_error: DbErr },
}

#[derive(Debug, Error)]
pub enum ExtractError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("CoinGecko API error {status}: {body}")]
    Status {
        status: reqwest::StatusCode,
        body: String,
    },

    #[error("Could not decode markets response: {0}")]
    Decode(#[from] serde_json::Error),
}

#[derive(Debug, Error)]
pub enum TransformError {
    #[error("Record {coin_id:?} is missing field '{field}'")]
    MissingField { coin_id: String, field: &'static str },

    #[error("Record {coin_id:?} has unparseable last_updated {value:?}: {source}")]
    InvalidTimestamp {
        coin_id: String,
        value: String,
        source: chrono::ParseError,
    },
}

#[derive(Debug, Error)]
pub enum LoadError {
    #[error("Failed to replace dim_coin: {0}")]
    Dimension(DbErr),

    #[error("Failed to append fact_market_history: {0}")]
    Fact(DbErr),
}

/// Anything that aborts a single cycle. Never fatal to the scheduler.
#[derive(Debug, Error)]
pub enum CycleError {
    #[error("Extraction failed: {0}")]
    Extract(#[from] ExtractError),

    #[error("Transformation failed: {0}")]
    Transform(#[from] TransformError),

    #[error("Both writes failed: {dimension}; {fact}")]
    Load { dimension: LoadError, fact: LoadError },
}
