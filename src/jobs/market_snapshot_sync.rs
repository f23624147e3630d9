//! Market Snapshot Sync Job
//!
//! Runs the extract, transform, load cycle against CoinGecko and the
//! configured store. In `forever` mode the cycle repeats after a fixed sleep
//! until the shutdown signal fires. In `once` mode a single cycle runs.
//! A failing cycle is logged and never stops the loop.

use sea_orm::DatabaseConnection;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tracing::{debug, error, info, warn};

use crate::config::{EtlConfig, RunMode};
use crate::error::CycleError;
use crate::services::clock::Clock;
use crate::services::coingecko::MarketSource;
use crate::services::loader::{LoadReport, load_snapshot};
use crate::services::transform::transform;

/// What happened in one cycle
#[derive(Debug)]
pub enum CycleOutcome {
    /// Both writes succeeded
    Loaded(LoadReport),
    /// Exactly one of the two writes failed
    PartiallyLoaded(LoadReport),
    /// Extraction returned no records; nothing was written
    NoData,
    /// Extract or transform failed, or both writes failed
    Failed(CycleError),
}

impl CycleOutcome {
    fn from_report(report: LoadReport) -> Self {
        match report {
            LoadReport {
                dimension: Err(dimension),
                facts: Err(fact),
            } => CycleOutcome::Failed(CycleError::Load { dimension, fact }),
            report if report.is_complete() => CycleOutcome::Loaded(report),
            report => CycleOutcome::PartiallyLoaded(report),
        }
    }
}

/// One extract, transform, load pass over a fixed store handle
pub struct EtlPipeline {
    source: Arc<dyn MarketSource>,
    db: DatabaseConnection,
    clock: Arc<dyn Clock>,
}

impl EtlPipeline {
    pub fn new(
        source: Arc<dyn MarketSource>,
        db: DatabaseConnection,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self { source, db, clock }
    }

    pub async fn run_cycle(&self) -> CycleOutcome {
        info!("Starting extraction");
        let records = match self.source.fetch_markets().await {
            Ok(records) => records,
            Err(e) => return CycleOutcome::Failed(e.into()),
        };

        // One snapshot time for the whole batch
        let ingestion_timestamp = self.clock.now();

        let snapshot = match transform(&records, ingestion_timestamp) {
            Ok(Some(snapshot)) => snapshot,
            Ok(None) => {
                info!("No data to load");
                return CycleOutcome::NoData;
            }
            Err(e) => return CycleOutcome::Failed(e.into()),
        };

        let report = load_snapshot(&self.db, &snapshot).await;
        CycleOutcome::from_report(report)
    }
}

/// Cycle counts of a scheduler run
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct RunSummary {
    pub cycles: u64,
    pub loaded: u64,
    pub partially_loaded: u64,
    pub no_data: u64,
    pub failed: u64,
}

impl RunSummary {
    fn record(&mut self, outcome: &CycleOutcome) {
        self.cycles += 1;
        match outcome {
            CycleOutcome::Loaded(_) => self.loaded += 1,
            CycleOutcome::PartiallyLoaded(_) => self.partially_loaded += 1,
            CycleOutcome::NoData => self.no_data += 1,
            CycleOutcome::Failed(_) => self.failed += 1,
        }
    }
}

pub struct Scheduler {
    pipeline: EtlPipeline,
    clock: Arc<dyn Clock>,
    mode: RunMode,
    interval: Duration,
}

impl Scheduler {
    pub fn new(
        pipeline: EtlPipeline,
        clock: Arc<dyn Clock>,
        mode: RunMode,
        interval: Duration,
    ) -> Self {
        Self {
            pipeline,
            clock,
            mode,
            interval,
        }
    }

    /// Build a scheduler from config around an established connection
    pub fn from_config(
        config: &EtlConfig,
        source: Arc<dyn MarketSource>,
        db: DatabaseConnection,
        clock: Arc<dyn Clock>,
    ) -> Self {
        let pipeline = EtlPipeline::new(source, db, clock.clone());
        Self::new(pipeline, clock, config.run_mode, config.cycle_interval)
    }

    /// Run cycles until `shutdown` becomes true (or once, in `RunMode::Once`).
    ///
    /// The signal is checked before every cycle and raced against the sleep.
    /// An in-flight cycle is never interrupted.
    pub async fn run(&self, mut shutdown: watch::Receiver<bool>) -> RunSummary {
        let mut summary = RunSummary::default();

        info!(
            mode = ?self.mode,
            interval_secs = self.interval.as_secs(),
            "Market snapshot sync started"
        );

        loop {
            if *shutdown.borrow() {
                info!("Shutdown requested, stopping market snapshot sync");
                break;
            }

            let outcome = self.pipeline.run_cycle().await;
            log_outcome(&outcome);
            summary.record(&outcome);

            if self.mode == RunMode::Once {
                break;
            }

            debug!(
                "Waiting {} seconds before the next cycle",
                self.interval.as_secs()
            );
            tokio::select! {
                _ = self.clock.sleep(self.interval) => {}
                changed = shutdown.changed() => {
                    // A dropped sender means nobody can ask us to stop; keep sleeping.
                    if changed.is_err() {
                        self.clock.sleep(self.interval).await;
                    }
                }
            }
        }

        info!(
            cycles = summary.cycles,
            loaded = summary.loaded,
            partially_loaded = summary.partially_loaded,
            no_data = summary.no_data,
            failed = summary.failed,
            "Market snapshot sync stopped"
        );

        summary
    }
}

fn log_outcome(outcome: &CycleOutcome) {
    match outcome {
        CycleOutcome::Loaded(report) => info!(
            coins = report.dimension.as_ref().copied().unwrap_or_default(),
            facts = report.facts.as_ref().copied().unwrap_or_default(),
            "Cycle complete"
        ),
        CycleOutcome::PartiallyLoaded(report) => warn!(
            dimension_ok = report.dimension.is_ok(),
            facts_ok = report.facts.is_ok(),
            "Cycle partially loaded"
        ),
        CycleOutcome::NoData => info!("Cycle complete, nothing loaded"),
        // Each failed write was already logged by the loader
        CycleOutcome::Failed(CycleError::Load { .. }) => {
            warn!("Cycle not loaded, will retry next cycle")
        }
        CycleOutcome::Failed(e) => error!(error = %e, "Cycle failed, will retry next cycle"),
    }
}
