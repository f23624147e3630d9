// src/lib.rs

pub mod config;
pub mod error;

pub mod entities {
    pub mod prelude;
    pub mod dim_coin;
    pub mod fact_market_history;
}

pub mod services {
    pub mod clock;
    pub mod coingecko;
    pub mod database;
    pub mod transform;
    pub mod loader;
}

pub mod jobs;
