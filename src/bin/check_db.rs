//! Print the most recent market snapshots stored by the pipeline.
//!
//! Uses the same profile/`DATABASE_URL` resolution as the pipeline, so
//! `ETL_PROFILE=local` inspects the local SQLite file.

use dotenvy::dotenv;
use sea_orm::{Database, EntityTrait, Order, QueryOrder, QuerySelect};
use std::env;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

use crypto_market_etl::config::EtlConfig;
use crypto_market_etl::entities::{fact_market_history, prelude::*};

const DEFAULT_LIMIT: u64 = 6;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "warn".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    dotenv().ok();

    let config = EtlConfig::from_env()?;
    let limit: u64 = env::var("CHECK_DB_LIMIT")
        .ok()
        .and_then(|s| s.parse().ok())
        .unwrap_or(DEFAULT_LIMIT);

    let db = Database::connect(&config.database_url).await?;

    let rows = FactMarketHistory::find()
        .order_by(fact_market_history::Column::IngestionTimestamp, Order::Desc)
        .order_by(fact_market_history::Column::Id, Order::Asc)
        .limit(limit)
        .all(&db)
        .await?;

    println!("--- STORED MARKET SNAPSHOTS ({}) ---", config.redacted_database_url());
    println!(
        "{:<12} {:>14} {:>20} {:>18} {:<26} {:<26}",
        "coin_id", "price_usd", "market_cap", "total_volume", "last_updated", "ingestion_timestamp"
    );
    for row in &rows {
        println!(
            "{:<12} {:>14.2} {:>20.0} {:>18.0} {:<26} {:<26}",
            row.coin_id,
            row.price_usd,
            row.market_cap,
            row.total_volume,
            row.last_updated.format("%Y-%m-%d %H:%M:%S"),
            row.ingestion_timestamp.format("%Y-%m-%d %H:%M:%S%.3f"),
        );
    }
    if rows.is_empty() {
        println!("(no rows)");
    }

    Ok(())
}
