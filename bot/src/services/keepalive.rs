//! Periodic self-ping so free-tier hosting does not idle the process out.
//!
//! Runs as a fully independent task; it shares no state with the control
//! loop.

use std::time::Duration;

use tokio::time::interval;
use tracing::{info, warn};

const PING_INTERVAL_SECS: u64 = 600;

pub fn spawn(url: String) {
    tokio::spawn(async move {
        let client = reqwest::Client::new();
        let mut timer = interval(Duration::from_secs(PING_INTERVAL_SECS));
        info!("Keepalive task started for {}", url);
        loop {
            timer.tick().await;
            match client.get(&url).timeout(Duration::from_secs(10)).send().await {
                Ok(_) => info!("Pinged self to stay awake"),
                Err(e) => warn!("Keepalive ping failed: {}", e),
            }
        }
    });
}
