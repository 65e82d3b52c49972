//! `SeaORM` Entity for the append-only signal log.
//!
//! Rows are inserted once when a pattern fires and mutated only by the
//! outcome tracker, which fills the three delayed price fields and the
//! terminal result.

use sea_orm::entity::prelude::*;

use crate::models::{SignalKind, SignalResult};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "signals")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub emitted_at: DateTimeUtc,
    pub signal_type: String,
    pub entry_price: f64,
    pub slope: f64,
    pub hist_avg: f64,
    pub hist_now: f64,
    pub price_range: f64,
    // Threshold snapshot at emission time
    pub slope_threshold: f64,
    pub lookback: i32,
    // Delayed observations, filled by the outcome tracker
    pub price_at_10min: Option<f64>,
    pub price_at_30min: Option<f64>,
    pub price_at_1hour: Option<f64>,
    pub result: String, // "pending", "success", "fail", "neutral"
    pub profit_loss: Option<f64>,
    pub threshold_used: Option<f64>,
}

/// Where a signal sits in its observation lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ObservationStage {
    Pending,
    PartiallyObserved,
    Labeled,
}

impl ObservationStage {
    pub fn as_str(&self) -> &'static str {
        match self {
            ObservationStage::Pending => "pending",
            ObservationStage::PartiallyObserved => "partially_observed",
            ObservationStage::Labeled => "labeled",
        }
    }
}

impl Model {
    pub fn kind(&self) -> Option<SignalKind> {
        SignalKind::from_str(&self.signal_type)
    }

    pub fn outcome(&self) -> SignalResult {
        SignalResult::from_str(&self.result).unwrap_or(SignalResult::Pending)
    }

    pub fn stage(&self) -> ObservationStage {
        if self.outcome().is_labeled() {
            ObservationStage::Labeled
        } else if self.price_at_10min.is_some() || self.price_at_30min.is_some() {
            ObservationStage::PartiallyObserved
        } else {
            ObservationStage::Pending
        }
    }
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::SignalKind;
    use chrono::Utc;

    fn row() -> Model {
        Model {
            id: 1,
            emitted_at: Utc::now(),
            signal_type: SignalKind::BottomDivergence.as_str().to_string(),
            entry_price: 18000.0,
            slope: -3.5,
            hist_avg: 1.0,
            hist_now: 1.2,
            price_range: 80.0,
            slope_threshold: 3.0,
            lookback: 10,
            price_at_10min: None,
            price_at_30min: None,
            price_at_1hour: None,
            result: "pending".to_string(),
            profit_loss: None,
            threshold_used: None,
        }
    }

    #[test]
    fn test_stage_tracks_observation_lifecycle() {
        let mut s = row();
        assert_eq!(s.stage(), ObservationStage::Pending);
        assert_eq!(s.stage().as_str(), "pending");

        s.price_at_10min = Some(18010.0);
        assert_eq!(s.stage(), ObservationStage::PartiallyObserved);
        assert_eq!(s.stage().as_str(), "partially_observed");

        s.price_at_30min = Some(18020.0);
        s.price_at_1hour = Some(18040.0);
        s.result = "success".to_string();
        assert_eq!(s.stage(), ObservationStage::Labeled);
        assert_eq!(s.stage().as_str(), "labeled");
    }
}
