//! `SeaORM` Entity for the append-only market snapshot history

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "fact_market_history")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    /// References dim_coin.coin_id by convention only
    pub coin_id: String,
    #[sea_orm(column_type = "Double")]
    pub price_usd: f64,
    #[sea_orm(column_type = "Double")]
    pub market_cap: f64,
    #[sea_orm(column_type = "Double")]
    pub total_volume: f64,
    /// Timestamp reported by the source
    pub last_updated: DateTimeUtc,
    /// Shared by every row of one ETL cycle
    pub ingestion_timestamp: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
