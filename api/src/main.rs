//! Read-only status API over the signal store.
//!
//! The bot is the only writer; this server just exposes what it has
//! recorded. Every handler degrades to a generic 500 JSON body on a store
//! error, with the detail kept in the server log.

use anyhow::Result;
use axum::{
    extract::State,
    http::StatusCode,
    routing::get,
    Json, Router,
};
use sea_orm::{DatabaseConnection, EntityTrait, QueryOrder, QuerySelect};
use serde_json::{json, Value};
use shared::entity::{heartbeat, signals};
use shared::{get_db_connection, Config, SignalStats};
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{error, info};

const RECENT_SIGNALS_LIMIT: u64 = 20;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::INFO)
        .init();

    info!("Starting TXF watch API server...");

    let config = Config::from_env()?;
    let db = get_db_connection(&config.database_url).await?;
    info!("Connected to database");

    let app = Router::new()
        .route("/health", get(health_check))
        .route("/api/heartbeat", get(get_heartbeat))
        .route("/api/signals/recent", get(recent_signals))
        .route("/api/statistics", get(statistics))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(db);

    let listener = tokio::net::TcpListener::bind(&config.api_bind).await?;
    info!("API server listening on http://{}", config.api_bind);

    axum::serve(listener, app).await?;

    Ok(())
}

async fn health_check() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}

/// Last-tick / last-bar freshness written by the bot every poll.
async fn get_heartbeat(
    State(db): State<DatabaseConnection>,
) -> Result<Json<Value>, (StatusCode, Json<Value>)> {
    let row = heartbeat::Entity::find_by_id(heartbeat::HEARTBEAT_ROW_ID)
        .one(&db)
        .await
        .map_err(internal_error)?;

    match row {
        Some(hb) => Ok(Json(json!({
            "last_tick_at": hb.last_tick_at,
            "last_seal_at": hb.last_seal_at,
            "bar_count": hb.bar_count,
            "open_bar_started_at": hb.open_bar_started_at,
            "open_bar_incomplete": hb.open_bar_incomplete,
            "updated_at": hb.updated_at,
        }))),
        None => Ok(Json(json!({ "status": "no heartbeat yet" }))),
    }
}

async fn recent_signals(
    State(db): State<DatabaseConnection>,
) -> Result<Json<Value>, (StatusCode, Json<Value>)> {
    let rows = signals::Entity::find()
        .order_by_desc(signals::Column::EmittedAt)
        .limit(RECENT_SIGNALS_LIMIT)
        .all(&db)
        .await
        .map_err(internal_error)?;

    let items: Vec<Value> = rows
        .iter()
        .map(|s| {
            json!({
                "id": s.id,
                "emitted_at": s.emitted_at,
                "signal_type": s.signal_type,
                "label": s.kind().map(|k| k.label()),
                "entry_price": s.entry_price,
                "slope": s.slope,
                "stage": s.stage().as_str(),
                "result": s.result,
                "profit_loss": s.profit_loss,
            })
        })
        .collect();

    Ok(Json(json!({ "signals": items })))
}

async fn statistics(
    State(db): State<DatabaseConnection>,
) -> Result<Json<Value>, (StatusCode, Json<Value>)> {
    let rows = signals::Entity::find()
        .all(&db)
        .await
        .map_err(internal_error)?;

    match SignalStats::from_signals(&rows) {
        Some(stats) => Ok(Json(json!(stats))),
        None => Ok(Json(json!({ "message": "no labeled signals yet" }))),
    }
}

fn internal_error(e: sea_orm::DbErr) -> (StatusCode, Json<Value>) {
    error!("Database error: {}", e);
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(json!({ "error": "internal server error" })),
    )
}
