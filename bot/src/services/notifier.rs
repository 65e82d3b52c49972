//! Fire-and-forget Telegram notifications.
//!
//! Send failures are logged and dropped; the control loop never waits on a
//! retry and never treats a failed send as fatal.

use chrono::{DateTime, Utc};
use teloxide::prelude::*;
use tracing::{error, info};

use shared::models::{Parameters, SignalKind};
use shared::stats::SignalStats;

use crate::signal::SignalData;

pub struct Notifier {
    bot: Bot,
    chat_id: ChatId,
}

impl Notifier {
    pub fn new(token: &str, chat_id: i64) -> Self {
        Notifier {
            bot: Bot::new(token),
            chat_id: ChatId(chat_id),
        }
    }

    pub async fn send(&self, text: String) {
        match self.bot.send_message(self.chat_id, text).await {
            Ok(_) => info!("Alert sent to chat {}", self.chat_id),
            Err(e) => error!("Failed to send alert: {}", e),
        }
    }
}

pub fn signal_message(
    kind: SignalKind,
    emitted_at: DateTime<Utc>,
    price: f64,
    data: &SignalData,
    params: &Parameters,
) -> String {
    format!(
        "⚠️ {}\n\
         ⏰ {}\n\
         💰 Price: {:.0}\n\
         📊 Slope: {:+.2}\n\
         📊 Histogram: {:+.2}\n\
         🤖 Params: slope={}, lookback={}",
        kind.label(),
        emitted_at.format("%Y-%m-%d %H:%M:%S"),
        price,
        data.slope,
        data.hist_now,
        params.slope_threshold,
        params.lookback,
    )
}

pub fn optimization_message(old: &Parameters, new: &Parameters, stats: &SignalStats) -> String {
    format!(
        "🤖 Parameters auto-tuned\n\
         Win rate: {:.1}% over {} labeled signals\n\
         slope: {} → {}\n\
         lookback: {} → {}",
        stats.success_rate,
        stats.total_signals,
        old.slope_threshold,
        new.slope_threshold,
        old.lookback,
        new.lookback,
    )
}
