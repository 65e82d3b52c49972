use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Heartbeat::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Heartbeat::Id).integer().primary_key())
                    .col(ColumnDef::new(Heartbeat::LastTickAt).timestamp().null())
                    .col(ColumnDef::new(Heartbeat::LastSealAt).timestamp().null())
                    .col(ColumnDef::new(Heartbeat::BarCount).integer().not_null().default(0))
                    .col(ColumnDef::new(Heartbeat::OpenBarStartedAt).timestamp().null())
                    .col(
                        ColumnDef::new(Heartbeat::OpenBarIncomplete)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(ColumnDef::new(Heartbeat::UpdatedAt).timestamp().not_null())
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Heartbeat::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum Heartbeat {
    Table,
    Id,
    LastTickAt,
    LastSealAt,
    BarCount,
    OpenBarStartedAt,
    OpenBarIncomplete,
    UpdatedAt,
}
