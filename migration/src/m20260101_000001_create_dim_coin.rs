use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(DimCoin::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(DimCoin::CoinId)
                            .string()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(DimCoin::Symbol).string().not_null())
                    .col(ColumnDef::new(DimCoin::Name).string().not_null())
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(DimCoin::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum DimCoin {
    Table,
    CoinId,
    Symbol,
    Name,
}
