pub mod market_snapshot_sync;
