pub use super::dim_coin::Entity as DimCoin;
pub use super::fact_market_history::Entity as FactMarketHistory;
