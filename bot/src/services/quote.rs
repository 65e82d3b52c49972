//! TAIFEX quote-list client.
//!
//! Polls the exchange's `getQuoteList` endpoint for the TXF contract family
//! and selects the most liquid non-spot contract. Any transport, status or
//! decode problem degrades to "no tick this round" for the caller.

use anyhow::Result;
use chrono::{DateTime, NaiveDate, NaiveTime, TimeZone, Timelike, Utc};
use chrono_tz::Asia::Taipei;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, warn};

const FETCH_TIMEOUT_SECS: u64 = 5;
const SYMBOL_FAMILY: &str = "TXF";

/// One usable tick extracted from the quote list.
#[derive(Debug, Clone, Copy)]
pub struct Quote {
    pub timestamp: DateTime<Utc>,
    pub price: f64,
    pub ref_price: f64,
    pub cumulative_volume: i64,
}

#[derive(Serialize)]
struct QuotePayload {
    #[serde(rename = "MarketType")]
    market_type: &'static str,
    #[serde(rename = "SymbolType")]
    symbol_type: &'static str,
    #[serde(rename = "KindID")]
    kind_id: &'static str,
    #[serde(rename = "CID")]
    cid: &'static str,
    #[serde(rename = "ExpireMonth")]
    expire_month: &'static str,
    #[serde(rename = "RowSize")]
    row_size: &'static str,
    #[serde(rename = "PageNo")]
    page_no: &'static str,
    #[serde(rename = "SortColumn")]
    sort_column: &'static str,
    #[serde(rename = "AscDesc")]
    asc_desc: &'static str,
}

#[derive(Deserialize)]
struct QuoteResponse {
    #[serde(rename = "RtData")]
    rt_data: Option<RtData>,
}

#[derive(Deserialize)]
struct RtData {
    #[serde(rename = "QuoteList", default)]
    quote_list: Vec<ContractQuote>,
}

#[derive(Deserialize)]
struct ContractQuote {
    #[serde(rename = "SymbolID", default)]
    symbol_id: String,
    #[serde(rename = "CLastPrice", default)]
    last_price: Option<String>,
    #[serde(rename = "CRefPrice", default)]
    ref_price: Option<String>,
    #[serde(rename = "CTotalVolume", default)]
    total_volume: Option<String>,
    #[serde(rename = "CDate", default)]
    date: Option<String>,
    #[serde(rename = "CTime", default)]
    time: Option<String>,
}

/// TAIFEX session selector: day session 08:45-13:45, night session from
/// 15:00 through 05:00, Taipei time.
pub fn market_type_now() -> &'static str {
    let now = Utc::now().with_timezone(&Taipei).time();
    let minutes = now.hour() * 60 + now.minute();
    if (8 * 60 + 45..=13 * 60 + 45).contains(&minutes) {
        return "0";
    }
    if minutes >= 15 * 60 || minutes <= 5 * 60 {
        return "1";
    }
    "0"
}

pub struct QuoteClient {
    client: reqwest::Client,
    url: String,
}

impl QuoteClient {
    pub fn new(url: String) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(FETCH_TIMEOUT_SECS))
            .build()?;
        Ok(QuoteClient { client, url })
    }

    /// Fetch the current quote list and pick a tick. `Ok(None)` means the
    /// exchange had nothing usable this round.
    pub async fn fetch_latest(&self) -> Result<Option<Quote>> {
        let payload = QuotePayload {
            market_type: market_type_now(),
            symbol_type: "F",
            kind_id: "1",
            cid: SYMBOL_FAMILY,
            expire_month: "",
            row_size: "全部",
            page_no: "",
            sort_column: "",
            asc_desc: "A",
        };

        let response = self.client.post(&self.url).json(&payload).send().await?;
        if !response.status().is_success() {
            warn!("Quote endpoint returned status {}", response.status());
            return Ok(None);
        }

        let body = response.text().await?;
        let Some(quotes) = parse_quote_list(&body) else {
            return Ok(None);
        };
        if quotes.is_empty() {
            debug!("Quote list empty");
            return Ok(None);
        }

        Ok(select_contract(&quotes))
    }
}

/// Decode the quote-list body. A malformed or shapeless response is "no
/// usable quote", not an error.
fn parse_quote_list(body: &str) -> Option<Vec<ContractQuote>> {
    match serde_json::from_str::<QuoteResponse>(body) {
        Ok(response) => response.rt_data.map(|rt| rt.quote_list),
        Err(e) => {
            warn!("Quote response decode failed: {}", e);
            None
        }
    }
}

/// Among TXF contract quotes (symbol extends the bare family code, i.e. not
/// the spot index row) with a present last price, take the one with the
/// highest cumulative volume.
fn select_contract(quotes: &[ContractQuote]) -> Option<Quote> {
    let mut best: Option<(&ContractQuote, f64, i64)> = None;
    for q in quotes {
        if !q.symbol_id.starts_with(SYMBOL_FAMILY) || q.symbol_id.len() == SYMBOL_FAMILY.len() {
            continue;
        }
        let Some(price) = q.last_price.as_deref().and_then(parse_number) else {
            continue;
        };
        let volume = q
            .total_volume
            .as_deref()
            .and_then(|v| v.trim().parse::<i64>().ok())
            .unwrap_or(0);
        match best {
            Some((_, _, best_volume)) if volume <= best_volume => {}
            _ => best = Some((q, price, volume)),
        }
    }

    best.map(|(q, price, volume)| Quote {
        timestamp: exchange_timestamp(q).unwrap_or_else(Utc::now),
        price,
        ref_price: q
            .ref_price
            .as_deref()
            .and_then(parse_number)
            .unwrap_or(price),
        cumulative_volume: volume,
    })
}

fn parse_number(s: &str) -> Option<f64> {
    let trimmed = s.trim();
    if trimmed.is_empty() {
        return None;
    }
    trimmed.replace(',', "").parse().ok()
}

/// Combine the quote's CDate (yyyymmdd) and CTime (HHMMSS), Taipei time.
fn exchange_timestamp(q: &ContractQuote) -> Option<DateTime<Utc>> {
    let date = NaiveDate::parse_from_str(q.date.as_deref()?.trim(), "%Y%m%d").ok()?;
    let time = NaiveTime::parse_from_str(q.time.as_deref()?.trim(), "%H%M%S").ok()?;
    Taipei
        .from_local_datetime(&date.and_time(time))
        .single()
        .map(|dt| dt.with_timezone(&Utc))
}
