//! Persist a [`MarketSnapshot`]
//!
//! - dim_coin: full replace (delete all, insert current set) in one transaction
//! - fact_market_history: append only, existing rows are never touched
//!
//! The two writes are independent. A failure in one does not skip the other
//! and nothing spans both.

use sea_orm::{
    ConnectionTrait, DatabaseConnection, DbErr, EntityTrait, Set, TransactionTrait,
};
use tracing::{error, info};

use crate::entities::{dim_coin, fact_market_history, prelude::*};
use crate::error::LoadError;
use crate::services::transform::{CoinDimensionRow, MarketFactRow, MarketSnapshot};

/// Result of each write of one load
#[derive(Debug)]
pub struct LoadReport {
    /// Rows now in dim_coin
    pub dimension: Result<u64, LoadError>,
    /// Rows appended to fact_market_history
    pub facts: Result<u64, LoadError>,
}

impl LoadReport {
    pub fn is_complete(&self) -> bool {
        self.dimension.is_ok() && self.facts.is_ok()
    }
}

/// Write both projections, attempting each regardless of the other's outcome
pub async fn load_snapshot(db: &DatabaseConnection, snapshot: &MarketSnapshot) -> LoadReport {
    let dimension = replace_dim_coins(db, &snapshot.coins)
        .await
        .map_err(LoadError::Dimension);
    match &dimension {
        Ok(count) => info!(rows = count, "Replaced dim_coin"),
        Err(e) => error!(error = %e, "dim_coin load failed"),
    }

    let facts = append_market_facts(db, &snapshot.facts)
        .await
        .map_err(LoadError::Fact);
    match &facts {
        Ok(count) => info!(
            rows = count,
            ingestion_timestamp = %snapshot.ingestion_timestamp,
            "Appended to fact_market_history"
        ),
        Err(e) => error!(error = %e, "fact_market_history load failed"),
    }

    LoadReport { dimension, facts }
}

/// Replace the whole coin dimension with `rows`.
///
/// Coins absent from `rows` are dropped. An empty slice is a no-op, so a cycle
/// with nothing to load never wipes the table.
pub async fn replace_dim_coins(
    db: &DatabaseConnection,
    rows: &[CoinDimensionRow],
) -> Result<u64, DbErr> {
    if rows.is_empty() {
        return Ok(0);
    }

    let txn = db.begin().await?;

    let deleted = DimCoin::delete_many().exec(&txn).await?.rows_affected;
    let inserted = insert_dim_coins(&txn, rows).await?;

    txn.commit().await?;

    tracing::debug!(deleted, inserted, "dim_coin replaced");
    Ok(inserted)
}

async fn insert_dim_coins<C: ConnectionTrait>(
    conn: &C,
    rows: &[CoinDimensionRow],
) -> Result<u64, DbErr> {
    let models = rows.iter().map(|row| dim_coin::ActiveModel {
        coin_id: Set(row.coin_id.clone()),
        symbol: Set(row.symbol.clone()),
        name: Set(row.name.clone()),
    });

    DimCoin::insert_many(models)
        .exec_without_returning(conn)
        .await
}

/// Append `rows` to the fact history. An empty slice is a no-op.
pub async fn append_market_facts(
    db: &DatabaseConnection,
    rows: &[MarketFactRow],
) -> Result<u64, DbErr> {
    if rows.is_empty() {
        return Ok(0);
    }

    let models = rows.iter().map(|row| fact_market_history::ActiveModel {
        coin_id: Set(row.coin_id.clone()),
        price_usd: Set(row.price_usd),
        market_cap: Set(row.market_cap),
        total_volume: Set(row.total_volume),
        last_updated: Set(row.last_updated),
        ingestion_timestamp: Set(row.ingestion_timestamp),
        ..Default::default()
    });

    FactMarketHistory::insert_many(models)
        .exec_without_returning(db)
        .await
}
