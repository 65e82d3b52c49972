//! `SeaORM` Entity for the append-only parameter history. The newest row is
//! the live configuration; older rows are kept for auditing.

use sea_orm::entity::prelude::*;

use crate::models::Parameters;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "parameter_versions")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub slope_threshold: f64,
    pub lookback: i32,
    pub hist_confirm_bars: i32,
    pub cooldown_minutes: i64,
    pub labeled_count: i64,
    pub created_at: DateTimeUtc,
}

impl Model {
    pub fn to_parameters(&self) -> Parameters {
        Parameters {
            slope_threshold: self.slope_threshold,
            lookback: self.lookback.max(0) as usize,
            hist_confirm_bars: self.hist_confirm_bars.max(0) as usize,
            cooldown_minutes: self.cooldown_minutes,
            labeled_count: self.labeled_count.max(0) as u64,
            last_update: self.created_at,
        }
    }
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
