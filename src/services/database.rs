//! Database connection with startup retry
//!
//! The store may come up after the pipeline (e.g. a Postgres container in the
//! same compose file), so connecting is retried a fixed number of times with a
//! fixed delay. No backoff, no jitter.

use sea_orm::{ConnectOptions, Database, DatabaseConnection, DbErr};
use std::future::Future;
use std::time::Duration;
use tracing::{info, warn};

use crate::config::EtlConfig;
use crate::error::ConnectError;
use crate::services::clock::Clock;

/// How many times to try and how long to wait in between
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub delay: Duration,
}

impl From<&EtlConfig> for RetryPolicy {
    fn from(config: &EtlConfig) -> Self {
        Self {
            max_attempts: config.connect_max_attempts,
            delay: config.connect_retry_delay,
        }
    }
}

/// Connect to the configured store and verify the handle with a ping.
///
/// Returns [`ConnectError::Exhausted`] once every attempt has failed; callers
/// treat that as fatal.
pub async fn establish_connection(
    config: &EtlConfig,
    clock: &dyn Clock,
) -> Result<DatabaseConnection, ConnectError> {
    let policy = RetryPolicy::from(config);
    let target = config.redacted_database_url();

    info!(target_url = %target, max_attempts = policy.max_attempts, "Connecting to database");

    let db = retry_connect(policy, clock, |_attempt| {
        connect_and_ping(config.database_url.clone())
    })
    .await?;

    info!(target_url = %target, "Database connection established");
    Ok(db)
}

async fn connect_and_ping(url: String) -> Result<DatabaseConnection, DbErr> {
    let mut options = ConnectOptions::new(url);
    options.sqlx_logging(false);

    let db = Database::connect(options).await?;
    db.ping().await?;
    Ok(db)
}

/// Run `connect` up to `policy.max_attempts` times, sleeping `policy.delay`
/// between failures. Never sleeps after the last attempt.
pub async fn retry_connect<T, F, Fut>(
    policy: RetryPolicy,
    clock: &dyn Clock,
    mut connect: F,
) -> Result<T, ConnectError>
where
    F: FnMut(u32) -> Fut,
    Fut: Future<Output = Result<T, DbErr>>,
{
    let max_attempts = policy.max_attempts.max(1);
    let mut attempt = 1;

    loop {
        match connect(attempt).await {
            Ok(handle) => return Ok(handle),
            Err(e) if attempt >= max_attempts => {
                warn!(attempt, max_attempts, error = %e, "Database not ready, giving up");
                return Err(ConnectError::Exhausted {
                    attempts: attempt,
                    last_error: e,
                });
            }
            Err(e) => {
                warn!(
                    attempt,
                    max_attempts,
                    retry_in_secs = policy.delay.as_secs(),
                    error = %e,
                    "Database not ready, retrying"
                );
                clock.sleep(policy.delay).await;
                attempt += 1;
            }
        }
    }
}
