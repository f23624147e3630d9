use sea_orm_migration::MigratorTrait;
use std::process::ExitCode;
use std::sync::Arc;
use tokio::sync::watch;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crypto_market_etl::config::EtlConfig;
use crypto_market_etl::jobs::market_snapshot_sync::Scheduler;
use crypto_market_etl::services::clock::{Clock, SystemClock};
use crypto_market_etl::services::coingecko::CoinGeckoService;
use crypto_market_etl::services::database::establish_connection;

#[tokio::main]
async fn main() -> ExitCode {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,crypto_market_etl=debug,sqlx=warn".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load environment variables
    dotenvy::dotenv().ok();

    let config = match EtlConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            tracing::error!("Invalid configuration: {}", e);
            return ExitCode::FAILURE;
        }
    };

    tracing::info!(
        profile = ?config.profile,
        run_mode = ?config.run_mode,
        coins = %config.markets.coin_ids.join(","),
        "Starting crypto market ETL"
    );

    let clock: Arc<dyn Clock> = Arc::new(SystemClock);

    // Connect to database
    let db = match establish_connection(&config, clock.as_ref()).await {
        Ok(db) => db,
        Err(e) => {
            tracing::error!("{}", e);
            return ExitCode::FAILURE;
        }
    };

    // Run migrations
    tracing::info!("Running migrations...");
    if let Err(e) = migration::Migrator::up(&db, None).await {
        tracing::error!("Failed to run migrations: {}", e);
        return ExitCode::FAILURE;
    }

    let coingecko = match CoinGeckoService::from_config(&config) {
        Ok(service) => service,
        Err(e) => {
            tracing::error!("Failed to build CoinGecko client: {}", e);
            return ExitCode::FAILURE;
        }
    };

    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::info!("Shutdown signal received");
            let _ = shutdown_tx.send(true);
        }
    });

    let scheduler = Scheduler::from_config(&config, Arc::new(coingecko), db, clock);
    scheduler.run(shutdown_rx).await;

    tracing::info!("Pipeline finished");
    ExitCode::SUCCESS
}
