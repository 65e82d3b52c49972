use dotenv::dotenv;

pub struct Config {
    pub database_url: String,
    pub bot_token: String,
    pub chat_id: i64,
    pub quote_url: String,
    pub keepalive_url: Option<String>,
    pub poll_interval_secs: u64,
    pub min_labeled_for_optimization: usize,
    pub lock_file: String,
    pub api_bind: String,
}

impl Config {
    pub fn from_env() -> Result<Self, anyhow::Error> {
        dotenv().ok();

        Ok(Config {
            database_url: std::env::var("DATABASE_URL")
                .unwrap_or_else(|_| "sqlite://macd_data/txfwatch.sqlite?mode=rwc".to_string()),
            bot_token: std::env::var("BOT_TOKEN")?,
            chat_id: std::env::var("CHAT_ID")?.parse()?,
            quote_url: std::env::var("QUOTE_URL")
                .unwrap_or_else(|_| "https://mis.taifex.com.tw/futures/api/getQuoteList".to_string()),
            keepalive_url: std::env::var("KEEPALIVE_URL").ok(),
            poll_interval_secs: std::env::var("POLL_INTERVAL_SECS")
                .unwrap_or_else(|_| "3".to_string())
                .parse()
                .unwrap_or(3),
            min_labeled_for_optimization: std::env::var("MIN_LABELED_FOR_OPTIMIZATION")
                .unwrap_or_else(|_| "20".to_string())
                .parse()
                .unwrap_or(20),
            lock_file: std::env::var("LOCK_FILE")
                .unwrap_or_else(|_| "macd_data/txfwatch.lock".to_string()),
            api_bind: std::env::var("API_BIND").unwrap_or_else(|_| "0.0.0.0:9999".to_string()),
        })
    }
}
