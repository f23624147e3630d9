#![allow(dead_code)]

use async_trait::async_trait;
use chrono::{DateTime, Duration as ChronoDuration, TimeZone, Utc};
use sea_orm::{ConnectOptions, Database, DatabaseConnection, DbErr};
use sea_orm_migration::MigratorTrait;
use std::sync::Mutex;
use std::time::Duration;
use tokio::sync::watch;

use crypto_market_etl::services::clock::Clock;
use crypto_market_etl::services::coingecko::RawMarketRecord;

/// Set up a fresh in-memory SQLite database with the schema applied.
/// A single pooled connection keeps every query on the same memory database.
pub async fn setup_test_db() -> Result<DatabaseConnection, DbErr> {
    let mut options = ConnectOptions::new("sqlite::memory:");
    options
        .max_connections(1)
        .min_connections(1)
        .sqlx_logging(false);

    let db = Database::connect(options).await?;
    migration::Migrator::up(&db, None).await?;
    Ok(db)
}

pub fn record(id: &str, symbol: &str, name: &str, price: f64) -> RawMarketRecord {
    RawMarketRecord {
        id: id.to_string(),
        symbol: Some(symbol.to_string()),
        name: Some(name.to_string()),
        current_price: Some(price),
        market_cap: Some(price * 19_000_000.0),
        total_volume: Some(price * 500_000.0),
        last_updated: Some("2024-01-01T00:00:00Z".to_string()),
    }
}

pub fn tracked_coins() -> Vec<RawMarketRecord> {
    vec![
        record("bitcoin", "btc", "Bitcoin", 50_000.0),
        record("ethereum", "eth", "Ethereum", 3_000.0),
        record("solana", "sol", "Solana", 100.0),
    ]
}

/// Clock that starts at a fixed instant, advances on every sleep and never
/// actually waits. Fires `shutdown` once `stop_after_sleeps` sleeps happened.
pub struct ManualClock {
    now: Mutex<DateTime<Utc>>,
    sleeps: Mutex<Vec<Duration>>,
    stop_after_sleeps: Option<usize>,
    shutdown: Option<watch::Sender<bool>>,
}

impl ManualClock {
    pub fn new() -> Self {
        Self {
            now: Mutex::new(Utc.with_ymd_and_hms(2024, 1, 1, 0, 1, 0).unwrap()),
            sleeps: Mutex::new(Vec::new()),
            stop_after_sleeps: None,
            shutdown: None,
        }
    }

    pub fn stopping_after(sleeps: usize, shutdown: watch::Sender<bool>) -> Self {
        Self {
            stop_after_sleeps: Some(sleeps),
            shutdown: Some(shutdown),
            ..Self::new()
        }
    }

    pub fn sleeps(&self) -> Vec<Duration> {
        self.sleeps.lock().unwrap().clone()
    }
}

#[async_trait]
impl Clock for ManualClock {
    fn now(&self) -> DateTime<Utc> {
        *self.now.lock().unwrap()
    }

    async fn sleep(&self, duration: Duration) {
        let count = {
            let mut sleeps = self.sleeps.lock().unwrap();
            sleeps.push(duration);
            sleeps.len()
        };
        {
            let mut now = self.now.lock().unwrap();
            *now += ChronoDuration::from_std(duration).unwrap();
        }

        if let (Some(limit), Some(shutdown)) = (self.stop_after_sleeps, &self.shutdown) {
            if count >= limit {
                let _ = shutdown.send(true);
            }
        }

        tokio::task::yield_now().await;
    }
}
