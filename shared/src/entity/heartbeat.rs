//! `SeaORM` Entity for the single-row heartbeat the control loop upserts
//! every tick. Read by the status API; operational state, not history.

use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "heartbeat")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: i32,
    pub last_tick_at: Option<DateTimeUtc>,
    pub last_seal_at: Option<DateTimeUtc>,
    pub bar_count: i32,
    pub open_bar_started_at: Option<DateTimeUtc>,
    pub open_bar_incomplete: bool,
    pub updated_at: DateTimeUtc,
}

/// The heartbeat table always addresses this row.
pub const HEARTBEAT_ROW_ID: i32 = 1;

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
