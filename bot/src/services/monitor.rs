//! The sequential control loop.
//!
//! One tick every few seconds: fetch a quote, admit it as a tick, fold it
//! into the bar aggregator, and on every sealed bar recompute the oscillator,
//! advance pending signal outcomes and evaluate the classifier. A separate
//! 30-minute cadence recomputes statistics and runs the optimizer. All
//! mutable state lives here; nothing else writes to the store.

use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use chrono::{DateTime, Utc};
use tokio::time::interval;
use tracing::{debug, error, info, warn};

use shared::models::{Parameters, SignalKind};
use shared::stats::SignalStats;

use crate::indicators::macd_series;
use crate::market::{Bar, BarAggregator, Tick};
use crate::optimizer::{self, OptimizeOutcome};
use crate::services::notifier::{self, Notifier};
use crate::services::quote::{Quote, QuoteClient};
use crate::signal::classifier;
use crate::state::AppState;
use crate::store::{self, HeartbeatSnapshot};
use crate::tracker;

/// Classification does not start before this many sealed bars exist.
const MIN_BARS_FOR_MONITORING: usize = 60;

/// An unchanged price is still recorded as a tick after this long, so the
/// open bar keeps advancing through quiet stretches.
const REPEAT_TICK_SECS: i64 = 30;

/// Statistics + optimization cadence.
const ANALYSIS_INTERVAL_SECS: i64 = 1800;

pub struct Monitor {
    state: Arc<AppState>,
    quote_client: QuoteClient,
    notifier: Notifier,
    aggregator: BarAggregator,
    params: Parameters,
    last_emitted: Option<(SignalKind, DateTime<Utc>)>,
    last_price: Option<f64>,
    last_record_time: Option<DateTime<Utc>>,
    last_tick_at: Option<DateTime<Utc>>,
    last_seal_at: Option<DateTime<Utc>>,
    last_analysis_at: DateTime<Utc>,
    data_ready: bool,
}

impl Monitor {
    pub async fn new(state: Arc<AppState>) -> Result<Self> {
        let params = store::load_parameters(&state.db).await?;
        info!(
            "Monitor starting with parameters: slope={}, lookback={}, confirm={}, cooldown={}m",
            params.slope_threshold, params.lookback, params.hist_confirm_bars, params.cooldown_minutes
        );
        let quote_client = QuoteClient::new(state.config.quote_url.clone())?;
        let notifier = Notifier::new(&state.config.bot_token, state.config.chat_id);
        Ok(Monitor {
            state,
            quote_client,
            notifier,
            aggregator: BarAggregator::new(),
            params,
            last_emitted: None,
            last_price: None,
            last_record_time: None,
            last_tick_at: None,
            last_seal_at: None,
            last_analysis_at: Utc::now(),
            data_ready: false,
        })
    }

    /// Run forever. Each tick is independent: a failure is logged and the
    /// next tick retries from scratch.
    pub async fn run(mut self) -> Result<()> {
        let mut ticker = interval(Duration::from_secs(self.state.config.poll_interval_secs));
        loop {
            ticker.tick().await;
            if let Err(e) = self.poll_once().await {
                warn!("Tick skipped: {}", e);
            }
        }
    }

    async fn poll_once(&mut self) -> Result<()> {
        match self.quote_client.fetch_latest().await {
            Ok(Some(quote)) => {
                self.last_tick_at = Some(Utc::now());
                self.process_quote(quote).await?;
            }
            Ok(None) => debug!("No usable quote this round"),
            Err(e) => warn!("Quote fetch failed: {}", e),
        }

        // The optimization cadence is wall-clock driven, independent of bar
        // completion.
        if (Utc::now() - self.last_analysis_at).num_seconds() >= ANALYSIS_INTERVAL_SECS {
            self.last_analysis_at = Utc::now();
            if let Err(e) = self.analyze_and_optimize().await {
                error!("Optimization cycle failed: {}", e);
            }
        }

        self.write_heartbeat().await;
        Ok(())
    }

    async fn process_quote(&mut self, quote: Quote) -> Result<()> {
        if !self.should_record(&quote) {
            return Ok(());
        }
        self.last_price = Some(quote.price);
        self.last_record_time = Some(quote.timestamp);

        let tick = Tick {
            timestamp: quote.timestamp,
            price: quote.price,
            cumulative_volume: quote.cumulative_volume,
        };
        if let Some(bar) = self.aggregator.apply(&tick) {
            self.last_seal_at = Some(Utc::now());
            self.on_sealed_bar(&bar, quote.price).await?;
        }
        Ok(())
    }

    /// A quote becomes a tick when the price moved, or when enough time
    /// passed that even a flat price is worth recording.
    fn should_record(&self, quote: &Quote) -> bool {
        match (self.last_price, self.last_record_time) {
            (None, _) => true,
            (Some(p), _) if p != quote.price => true,
            (_, None) => true,
            (_, Some(t)) => (quote.timestamp - t).num_seconds() >= REPEAT_TICK_SECS,
        }
    }

    async fn on_sealed_bar(&mut self, bar: &Bar, current_price: f64) -> Result<()> {
        let closes = self.aggregator.closes();
        let macd = macd_series(&closes);

        // Delayed outcome labeling runs on every sealed bar.
        let updated = tracker::update_signal_outcomes(&self.state.db, bar.close, Utc::now()).await?;
        if updated > 0 {
            info!("Updated outcome state of {} signal(s)", updated);
        }

        if closes.len() < MIN_BARS_FOR_MONITORING {
            debug!(
                "Collecting bars: {}/{}",
                closes.len(),
                MIN_BARS_FOR_MONITORING
            );
            return Ok(());
        }
        if !self.data_ready {
            self.data_ready = true;
            info!("Bar history warmed up, monitoring for signals");
        }

        let Some((kind, data)) = classifier::classify(&closes, &macd, &self.params) else {
            return Ok(());
        };

        let now = Utc::now();
        if !cooldown_clear(self.last_emitted, kind, now, self.params.cooldown_minutes) {
            debug!("Signal {} suppressed by cooldown/dedup", kind.as_str());
            return Ok(());
        }

        store::insert_signal(&self.state.db, kind, current_price, &data, &self.params, now).await?;
        self.last_emitted = Some((kind, now));

        let message = notifier::signal_message(kind, now, current_price, &data, &self.params);
        self.notifier.send(message).await;
        info!("🔔 Alert fired: {}", kind.label());
        Ok(())
    }

    async fn analyze_and_optimize(&mut self) -> Result<()> {
        let rows = store::all_signals(&self.state.db).await?;
        let Some(stats) = SignalStats::from_signals(&rows) else {
            debug!("No labeled signals yet, skipping optimization");
            return Ok(());
        };
        log_statistics(&stats);

        let min_labeled = self.state.config.min_labeled_for_optimization;
        match optimizer::optimize(&self.params, &stats, min_labeled) {
            OptimizeOutcome::Adjusted { new_params, reason } => {
                info!(
                    "Optimizer: {} (slope {} → {}, lookback {} → {})",
                    reason,
                    self.params.slope_threshold,
                    new_params.slope_threshold,
                    self.params.lookback,
                    new_params.lookback
                );
                store::save_parameters(&self.state.db, &new_params).await?;
                let message = notifier::optimization_message(&self.params, &new_params, &stats);
                self.notifier.send(message).await;
                self.params = new_params;
            }
            OptimizeOutcome::InsufficientData { labeled, required } => {
                info!(
                    "Optimizer: insufficient data ({} labeled, {} required)",
                    labeled, required
                );
            }
            OptimizeOutcome::NoNewData => {
                debug!("Optimizer: no signals labeled since last adjustment");
            }
            OptimizeOutcome::NoChange => {
                info!(
                    "Optimizer: win rate {:.1}% leaves thresholds unchanged",
                    stats.success_rate
                );
            }
        }
        Ok(())
    }

    async fn write_heartbeat(&self) {
        let snap = HeartbeatSnapshot {
            last_tick_at: self.last_tick_at,
            last_seal_at: self.last_seal_at,
            bar_count: self.aggregator.len(),
            open_bar_started_at: self.aggregator.open_bar_started_at(),
            open_bar_incomplete: self.aggregator.open_bar_incomplete(),
        };
        if let Err(e) = store::upsert_heartbeat(&self.state.db, &snap).await {
            warn!("Heartbeat write failed: {}", e);
        }
    }
}

/// A signal fires only when its kind differs from the last emitted one and
/// the cooldown window has passed since that emission.
fn cooldown_clear(
    last_emitted: Option<(SignalKind, DateTime<Utc>)>,
    kind: SignalKind,
    now: DateTime<Utc>,
    cooldown_minutes: i64,
) -> bool {
    match last_emitted {
        None => true,
        Some((last_kind, last_at)) => {
            kind != last_kind && (now - last_at).num_minutes() >= cooldown_minutes
        }
    }
}

fn log_statistics(stats: &SignalStats) {
    info!("📊 Signal statistics");
    info!(
        "  total: {} | success: {} | fail: {} | neutral: {}",
        stats.total_signals, stats.success_count, stats.fail_count, stats.neutral_count
    );
    info!(
        "  win rate: {:.1}% | avg P/L: {:+.1} points",
        stats.success_rate, stats.avg_profit
    );
    for (kind, t) in &stats.by_signal_type {
        info!(
            "  {}: n={} win={:.1}% avg={:+.1}",
            kind, t.total, t.success_rate, t.avg_profit
        );
    }
}
