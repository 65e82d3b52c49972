//! Durable-store access for the control loop.
//!
//! Signals and parameter versions are append-only; only the outcome tracker
//! mutates signal rows, and only on the delayed-observation fields. The
//! heartbeat is a single upserted status row.

use anyhow::Result;
use chrono::{DateTime, Utc};
use sea_orm::{
    ActiveValue, ColumnTrait, DatabaseConnection, EntityTrait, Order, QueryFilter, QueryOrder,
};
use tracing::info;

use shared::entity::{heartbeat, parameter_versions, signals};
use shared::models::{Parameters, SignalKind, SignalResult};

use crate::signal::SignalData;

/// Load the newest parameter version, or defaults when none was persisted.
pub async fn load_parameters(db: &DatabaseConnection) -> Result<Parameters> {
    let latest = parameter_versions::Entity::find()
        .order_by(parameter_versions::Column::Id, Order::Desc)
        .one(db)
        .await?;

    match latest {
        Some(row) => {
            let params = row.to_parameters();
            info!(
                "Loaded persisted parameters: slope={}, lookback={}",
                params.slope_threshold, params.lookback
            );
            Ok(params)
        }
        None => Ok(Parameters::default()),
    }
}

/// Append a new parameter version. Existing versions are never edited.
pub async fn save_parameters(db: &DatabaseConnection, params: &Parameters) -> Result<()> {
    let version = parameter_versions::ActiveModel {
        slope_threshold: ActiveValue::Set(params.slope_threshold),
        lookback: ActiveValue::Set(params.lookback as i32),
        hist_confirm_bars: ActiveValue::Set(params.hist_confirm_bars as i32),
        cooldown_minutes: ActiveValue::Set(params.cooldown_minutes),
        labeled_count: ActiveValue::Set(params.labeled_count as i64),
        created_at: ActiveValue::Set(params.last_update),
        ..Default::default()
    };
    parameter_versions::Entity::insert(version).exec(db).await?;
    Ok(())
}

/// Record an emitted signal with its evidence and threshold snapshot.
pub async fn insert_signal(
    db: &DatabaseConnection,
    kind: SignalKind,
    entry_price: f64,
    data: &SignalData,
    params: &Parameters,
    emitted_at: DateTime<Utc>,
) -> Result<i64> {
    let row = signals::ActiveModel {
        emitted_at: ActiveValue::Set(emitted_at),
        signal_type: ActiveValue::Set(kind.as_str().to_string()),
        entry_price: ActiveValue::Set(entry_price),
        slope: ActiveValue::Set(data.slope),
        hist_avg: ActiveValue::Set(data.hist_avg),
        hist_now: ActiveValue::Set(data.hist_now),
        price_range: ActiveValue::Set(data.price_range),
        slope_threshold: ActiveValue::Set(params.slope_threshold),
        lookback: ActiveValue::Set(params.lookback as i32),
        result: ActiveValue::Set(SignalResult::Pending.as_str().to_string()),
        ..Default::default()
    };
    let res = signals::Entity::insert(row).exec(db).await?;
    info!("Signal {} recorded: {}", res.last_insert_id, kind.as_str());
    Ok(res.last_insert_id)
}

/// All signals still awaiting their final observation.
pub async fn pending_signals(db: &DatabaseConnection) -> Result<Vec<signals::Model>> {
    let rows = signals::Entity::find()
        .filter(signals::Column::Result.eq(SignalResult::Pending.as_str()))
        .order_by(signals::Column::EmittedAt, Order::Asc)
        .all(db)
        .await?;
    Ok(rows)
}

/// Every signal ever emitted, oldest first.
pub async fn all_signals(db: &DatabaseConnection) -> Result<Vec<signals::Model>> {
    let rows = signals::Entity::find()
        .order_by(signals::Column::EmittedAt, Order::Asc)
        .all(db)
        .await?;
    Ok(rows)
}

/// Snapshot of loop liveness written every tick.
#[derive(Debug, Clone, Copy)]
pub struct HeartbeatSnapshot {
    pub last_tick_at: Option<DateTime<Utc>>,
    pub last_seal_at: Option<DateTime<Utc>>,
    pub bar_count: usize,
    pub open_bar_started_at: Option<DateTime<Utc>>,
    pub open_bar_incomplete: bool,
}

pub async fn upsert_heartbeat(db: &DatabaseConnection, snap: &HeartbeatSnapshot) -> Result<()> {
    let existing = heartbeat::Entity::find_by_id(heartbeat::HEARTBEAT_ROW_ID)
        .one(db)
        .await?;

    let row = heartbeat::ActiveModel {
        id: ActiveValue::Set(heartbeat::HEARTBEAT_ROW_ID),
        last_tick_at: ActiveValue::Set(snap.last_tick_at),
        last_seal_at: ActiveValue::Set(snap.last_seal_at),
        bar_count: ActiveValue::Set(snap.bar_count as i32),
        open_bar_started_at: ActiveValue::Set(snap.open_bar_started_at),
        open_bar_incomplete: ActiveValue::Set(snap.open_bar_incomplete),
        updated_at: ActiveValue::Set(Utc::now()),
    };

    if existing.is_some() {
        heartbeat::Entity::update(row).exec(db).await?;
    } else {
        heartbeat::Entity::insert(row).exec(db).await?;
    }
    Ok(())
}
