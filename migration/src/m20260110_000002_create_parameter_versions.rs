use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(ParameterVersions::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(ParameterVersions::Id)
                            .big_integer()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(ParameterVersions::SlopeThreshold).double().not_null())
                    .col(ColumnDef::new(ParameterVersions::Lookback).integer().not_null())
                    .col(ColumnDef::new(ParameterVersions::HistConfirmBars).integer().not_null())
                    .col(ColumnDef::new(ParameterVersions::CooldownMinutes).big_integer().not_null())
                    .col(
                        ColumnDef::new(ParameterVersions::LabeledCount)
                            .big_integer()
                            .not_null()
                            .default(0),
                    )
                    .col(ColumnDef::new(ParameterVersions::CreatedAt).timestamp().not_null())
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(ParameterVersions::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum ParameterVersions {
    Table,
    Id,
    SlopeThreshold,
    Lookback,
    HistConfirmBars,
    CooldownMinutes,
    LabeledCount,
    CreatedAt,
}
