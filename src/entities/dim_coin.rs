//! `SeaORM` Entity for the coin dimension table

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "dim_coin")]
pub struct Model {
    /// CoinGecko coin id, e.g. "bitcoin"
    #[sea_orm(primary_key, auto_increment = false)]
    pub coin_id: String,
    pub symbol: String,
    pub name: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
