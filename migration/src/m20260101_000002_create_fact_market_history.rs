use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // No foreign key to dim_coin: the dimension is wiped every cycle.
        manager
            .create_table(
                Table::create()
                    .table(FactMarketHistory::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(FactMarketHistory::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(FactMarketHistory::CoinId)
                            .string()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(FactMarketHistory::PriceUsd)
                            .double()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(FactMarketHistory::MarketCap)
                            .double()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(FactMarketHistory::TotalVolume)
                            .double()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(FactMarketHistory::LastUpdated)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(FactMarketHistory::IngestionTimestamp)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .to_owned(),
            )
            .await?;

        // Batch lookups by snapshot time
        manager
            .create_index(
                Index::create()
                    .name("idx_fact_market_history_ingestion")
                    .table(FactMarketHistory::Table)
                    .col(FactMarketHistory::IngestionTimestamp)
                    .to_owned(),
            )
            .await?;

        // Per-coin time series
        manager
            .create_index(
                Index::create()
                    .name("idx_fact_market_history_coin_ingestion")
                    .table(FactMarketHistory::Table)
                    .col(FactMarketHistory::CoinId)
                    .col(FactMarketHistory::IngestionTimestamp)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(FactMarketHistory::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum FactMarketHistory {
    Table,
    Id,
    CoinId,
    PriceUsd,
    MarketCap,
    TotalVolume,
    LastUpdated,
    IngestionTimestamp,
}
