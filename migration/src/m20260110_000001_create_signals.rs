use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Signals::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Signals::Id).big_integer().auto_increment().primary_key())
                    .col(ColumnDef::new(Signals::EmittedAt).timestamp().not_null())
                    .col(ColumnDef::new(Signals::SignalType).string().not_null())
                    .col(ColumnDef::new(Signals::EntryPrice).double().not_null())
                    .col(ColumnDef::new(Signals::Slope).double().not_null())
                    .col(ColumnDef::new(Signals::HistAvg).double().not_null())
                    .col(ColumnDef::new(Signals::HistNow).double().not_null())
                    .col(ColumnDef::new(Signals::PriceRange).double().not_null())
                    .col(ColumnDef::new(Signals::SlopeThreshold).double().not_null())
                    .col(ColumnDef::new(Signals::Lookback).integer().not_null())
                    .col(ColumnDef::new(Signals::PriceAt10min).double().null())
                    .col(ColumnDef::new(Signals::PriceAt30min).double().null())
                    .col(ColumnDef::new(Signals::PriceAt1hour).double().null())
                    .col(ColumnDef::new(Signals::Result).string().not_null().default("pending"))
                    .col(ColumnDef::new(Signals::ProfitLoss).double().null())
                    .col(ColumnDef::new(Signals::ThresholdUsed).double().null())
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_signals_result")
                    .table(Signals::Table)
                    .col(Signals::Result)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_signals_emitted_at")
                    .table(Signals::Table)
                    .col(Signals::EmittedAt)
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Signals::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum Signals {
    Table,
    Id,
    EmittedAt,
    SignalType,
    EntryPrice,
    Slope,
    HistAvg,
    HistNow,
    PriceRange,
    SlopeThreshold,
    Lookback,
    #[sea_orm(iden = "price_at_10min")]
    PriceAt10min,
    #[sea_orm(iden = "price_at_30min")]
    PriceAt30min,
    #[sea_orm(iden = "price_at_1hour")]
    PriceAt1hour,
    Result,
    ProfitLoss,
    ThresholdUsed,
}
