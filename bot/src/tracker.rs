//! Delayed outcome labeling.
//!
//! Every sealed bar, each pending signal is checked against its 10/30/60
//! minute horizons. A delayed price field is written at most once; the
//! 60-minute observation is terminal and assigns the result against a
//! volatility-scaled threshold.

use anyhow::Result;
use chrono::{DateTime, Utc};
use sea_orm::{ActiveValue, DatabaseConnection, EntityTrait};
use tracing::{info, warn};

use shared::entity::signals;
use shared::models::{Bias, SignalResult};

use crate::store;

const THRESHOLD_SCALE: f64 = 0.3;
const THRESHOLD_MIN: f64 = 20.0;
const THRESHOLD_MAX: f64 = 50.0;

/// Profit/loss bound for labeling, scaled from the signal's originating
/// price range: 30% of the range, clamped to [20, 50] points.
pub fn dynamic_threshold(price_range: f64) -> f64 {
    (price_range * THRESHOLD_SCALE).clamp(THRESHOLD_MIN, THRESHOLD_MAX)
}

/// Signed points gained by following the signal's bias.
pub fn profit_loss(bias: Bias, entry_price: f64, current_price: f64) -> f64 {
    match bias {
        Bias::Bullish => current_price - entry_price,
        Bias::Bearish => entry_price - current_price,
    }
}

pub fn label_outcome(profit_loss: f64, threshold: f64) -> SignalResult {
    if profit_loss > threshold {
        SignalResult::Success
    } else if profit_loss < -threshold {
        SignalResult::Fail
    } else {
        SignalResult::Neutral
    }
}

/// Advance every pending signal's observation state against the current
/// price. Returns the number of rows updated.
pub async fn update_signal_outcomes(
    db: &DatabaseConnection,
    current_price: f64,
    now: DateTime<Utc>,
) -> Result<usize> {
    let pending = store::pending_signals(db).await?;
    let mut updated = 0;

    for row in pending {
        let elapsed_minutes = (now - row.emitted_at).num_seconds() as f64 / 60.0;
        let mut changed = false;
        let mut update = signals::ActiveModel {
            id: ActiveValue::Set(row.id),
            ..Default::default()
        };

        if row.price_at_10min.is_none() && elapsed_minutes >= 10.0 {
            update.price_at_10min = ActiveValue::Set(Some(current_price));
            changed = true;
        }
        if row.price_at_30min.is_none() && elapsed_minutes >= 30.0 {
            update.price_at_30min = ActiveValue::Set(Some(current_price));
            changed = true;
        }
        if row.price_at_1hour.is_none() && elapsed_minutes >= 60.0 {
            let Some(kind) = row.kind() else {
                warn!("Signal {} has unknown type '{}', skipping", row.id, row.signal_type);
                continue;
            };
            let pl = profit_loss(kind.bias(), row.entry_price, current_price);
            let threshold = dynamic_threshold(row.price_range);
            let result = label_outcome(pl, threshold);

            update.price_at_1hour = ActiveValue::Set(Some(current_price));
            update.profit_loss = ActiveValue::Set(Some(pl));
            update.threshold_used = ActiveValue::Set(Some(threshold));
            update.result = ActiveValue::Set(result.as_str().to_string());
            changed = true;
            info!(
                "Signal {} labeled {} (P/L {:+.1}, threshold {:.1})",
                row.id,
                result.as_str(),
                pl,
                threshold
            );
        }

        if changed {
            signals::Entity::update(update).exec(db).await?;
            updated += 1;
        }
    }

    Ok(updated)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};
    use migration::{Migrator, MigratorTrait};
    use sea_orm::{Database, EntityTrait};
    use shared::models::{Parameters, SignalKind};

    use crate::signal::SignalData;

    async fn memory_db() -> DatabaseConnection {
        let db = Database::connect("sqlite::memory:").await.unwrap();
        Migrator::up(&db, None).await.unwrap();
        db
    }

    #[tokio::test]
    async fn test_delayed_fields_and_terminal_result_are_write_once() {
        let db = memory_db().await;
        let emitted_at = Utc.with_ymd_and_hms(2026, 1, 12, 1, 0, 0).unwrap();
        let data = SignalData {
            slope: -3.5,
            hist_avg: 1.0,
            hist_now: 1.2,
            hist_prev: 0.8,
            price_range: 100.0, // dynamic threshold 30
        };
        let id = store::insert_signal(
            &db,
            SignalKind::BottomDivergence,
            18000.0,
            &data,
            &Parameters::default(),
            emitted_at,
        )
        .await
        .unwrap();

        let fetch = |db: DatabaseConnection| async move {
            signals::Entity::find_by_id(id).one(&db).await.unwrap().unwrap()
        };

        // 10-minute horizon observed once; a later pre-30min pass must not
        // move it.
        let n = update_signal_outcomes(&db, 18010.0, emitted_at + Duration::minutes(11))
            .await
            .unwrap();
        assert_eq!(n, 1);
        let n = update_signal_outcomes(&db, 18020.0, emitted_at + Duration::minutes(12))
            .await
            .unwrap();
        assert_eq!(n, 0);
        let row = fetch(db.clone()).await;
        assert_eq!(row.price_at_10min, Some(18010.0));
        assert_eq!(row.price_at_30min, None);
        assert_eq!(row.result, "pending");

        // 30-minute horizon fills without touching the earlier field.
        update_signal_outcomes(&db, 18030.0, emitted_at + Duration::minutes(31))
            .await
            .unwrap();
        let row = fetch(db.clone()).await;
        assert_eq!(row.price_at_10min, Some(18010.0));
        assert_eq!(row.price_at_30min, Some(18030.0));

        // 60-minute horizon is terminal: bullish bias, +40 over threshold 30.
        update_signal_outcomes(&db, 18040.0, emitted_at + Duration::minutes(61))
            .await
            .unwrap();
        let row = fetch(db.clone()).await;
        assert_eq!(row.price_at_1hour, Some(18040.0));
        assert_eq!(row.result, "success");
        assert_eq!(row.profit_loss, Some(40.0));
        assert_eq!(row.threshold_used, Some(30.0));

        // A labeled row is never revisited, even much later at a wild price.
        let n = update_signal_outcomes(&db, 17000.0, emitted_at + Duration::minutes(120))
            .await
            .unwrap();
        assert_eq!(n, 0);
        let row = fetch(db).await;
        assert_eq!(row.price_at_10min, Some(18010.0));
        assert_eq!(row.price_at_30min, Some(18030.0));
        assert_eq!(row.price_at_1hour, Some(18040.0));
        assert_eq!(row.result, "success");
    }

    #[test]
    fn test_dynamic_threshold_clamps() {
        assert_eq!(dynamic_threshold(10.0), 20.0); // 3.0 clamped up
        assert_eq!(dynamic_threshold(100.0), 30.0);
        assert_eq!(dynamic_threshold(1000.0), 50.0); // 300.0 clamped down
    }

    #[test]
    fn test_profit_loss_by_bias() {
        assert_eq!(profit_loss(Bias::Bullish, 18000.0, 18040.0), 40.0);
        assert_eq!(profit_loss(Bias::Bearish, 18000.0, 18040.0), -40.0);
        assert_eq!(profit_loss(Bias::Bearish, 18000.0, 17950.0), 50.0);
    }

    #[test]
    fn test_label_outcome() {
        assert_eq!(label_outcome(31.0, 30.0), SignalResult::Success);
        assert_eq!(label_outcome(-31.0, 30.0), SignalResult::Fail);
        assert_eq!(label_outcome(30.0, 30.0), SignalResult::Neutral);
        assert_eq!(label_outcome(-30.0, 30.0), SignalResult::Neutral);
        assert_eq!(label_outcome(0.0, 30.0), SignalResult::Neutral);
    }
}
