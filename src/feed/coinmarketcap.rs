use crate::config::{self, FeedConfig};
use crate::errors::{AppError, Result};
use crate::models::PriceSnapshot;
use chrono::{DateTime, Utc};
use reqwest::Client;
use serde::Deserialize;
use std::collections::HashMap;
use std::time::Duration;
use tracing::{info, warn};
use url::Url;

const API_KEY_HEADER: &str = "X-CMC_PRO_API_KEY";
const FETCH_TIMEOUT_SECS: u64 = 10;

/// Reference prices served when the endpoint has never answered.
/// Illustrative placeholders, not live data.
const FALLBACK_PRICES: &[(&str, f64)] = &[
    ("BTC", 62_000.0),
    ("ETH", 3_400.0),
    ("XRP", 0.58),
    ("NEAR", 1.78),
    ("SOL", 145.0),
    ("ADA", 0.45),
    ("DOT", 7.40),
    ("USDT", 1.0),
];

#[derive(Debug, Deserialize)]
struct QuotesResponse {
    data: Option<HashMap<String, QuoteEntry>>,
    status: Option<ApiStatus>,
}

#[derive(Debug, Deserialize)]
struct QuoteEntry {
    quote: QuoteBlock,
}

#[derive(Debug, Deserialize)]
struct QuoteBlock {
    #[serde(rename = "USD")]
    usd: Option<CurrencyQuote>,
}

#[derive(Debug, Deserialize)]
struct CurrencyQuote {
    price: Option<f64>,
}

#[derive(Debug, Deserialize)]
struct ApiStatus {
    error_message: Option<String>,
}

/// Pull per-symbol USD prices out of a quotes response, keyed back to our
/// canonical symbols. Symbols absent from `data` are omitted, not errors;
/// a body without `data` is an error response.
fn extract_prices(response: QuotesResponse, symbols: &[String]) -> Result<HashMap<String, f64>> {
    let data = match response.data {
        Some(data) => data,
        None => {
            let reason = response
                .status
                .and_then(|s| s.error_message)
                .unwrap_or_else(|| "Unknown error".to_string());
            return Err(AppError::Feed(reason));
        }
    };

    let mut prices = HashMap::new();
    for symbol in symbols {
        let price = data
            .get(config::external_symbol(symbol))
            .and_then(|entry| entry.quote.usd.as_ref())
            .and_then(|quote| quote.price);
        if let Some(price) = price {
            if price > 0.0 {
                prices.insert(symbol.clone(), price);
            }
        }
    }
    Ok(prices)
}

/// Snapshot built from the static fallback table, stamped `now` so the
/// cache interval applies to it like any fetched snapshot.
pub fn fallback_snapshot(now: DateTime<Utc>) -> PriceSnapshot {
    PriceSnapshot {
        prices: FALLBACK_PRICES
            .iter()
            .map(|(symbol, price)| (symbol.to_string(), *price))
            .collect(),
        fetched_at: Some(now),
    }
}

/// Cached reference-price client.
pub struct PriceFeed {
    client: Client,
    quotes_url: Url,
    api_key: String,
    cache_secs: i64,
    snapshot: PriceSnapshot,
}

impl PriceFeed {
    pub fn new(cfg: &FeedConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(FETCH_TIMEOUT_SECS))
            .build()?;
        Ok(Self {
            client,
            quotes_url: Url::parse(&cfg.quotes_url)?,
            api_key: cfg.api_key.clone(),
            cache_secs: cfg.cache_secs as i64,
            snapshot: PriceSnapshot::default(),
        })
    }

    pub fn api_key_configured(&self) -> bool {
        !self.api_key.is_empty()
    }

    pub fn last_update(&self) -> Option<DateTime<Utc>> {
        self.snapshot.fetched_at
    }

    /// Install a new API key and invalidate the cache timestamp so the
    /// next call fetches with it. Previously fetched prices are kept as
    /// the stale-data safety net.
    pub fn set_api_key(&mut self, key: String) {
        self.api_key = key;
        self.snapshot.fetched_at = None;
    }

    /// Current reference prices. Serves the cache while fresh, otherwise
    /// refetches; every failure degrades to the stale snapshot or, if no
    /// fetch ever succeeded, to the fallback table. Never errors.
    pub async fn get_prices(&mut self, symbols: &[String]) -> &PriceSnapshot {
        let now = Utc::now();
        if !self.snapshot.is_empty() {
            if let Some(age) = self.snapshot.age_secs(now) {
                if age < self.cache_secs {
                    return &self.snapshot;
                }
            }
        }

        if let Err(e) = self.refresh(symbols).await {
            warn!(error = %e, "[FEED] fetch failed, serving stale or fallback prices");
            if self.snapshot.is_empty() {
                self.snapshot = fallback_snapshot(now);
                info!("[FEED] seeded fallback reference prices");
            }
        }
        &self.snapshot
    }

    /// Force one fetch and replace the snapshot on success. Returns the
    /// number of symbols priced. Used by `get_prices` and by the
    /// `setup_api` verification path, which needs the error surfaced.
    pub async fn refresh(&mut self, symbols: &[String]) -> Result<usize> {
        let prices = self.fetch(symbols).await?;
        let count = prices.len();
        self.snapshot = PriceSnapshot {
            prices,
            fetched_at: Some(Utc::now()),
        };
        info!(symbols = count, "[FEED] snapshot refreshed");
        Ok(count)
    }

    async fn fetch(&self, symbols: &[String]) -> Result<HashMap<String, f64>> {
        let joined = symbols
            .iter()
            .map(|s| config::external_symbol(s))
            .collect::<Vec<_>>()
            .join(",");
        let url = Url::parse_with_params(
            self.quotes_url.as_str(),
            &[("symbol", joined.as_str()), ("convert", "USD")],
        )?;
        let response = self
            .client
            .get(url)
            .header(API_KEY_HEADER, &self.api_key)
            .send()
            .await?;
        let body: QuotesResponse = response.json().await?;
        extract_prices(body, symbols)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn symbols(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    /// Feed pointed at a closed local port: every fetch fails immediately.
    fn unreachable_feed() -> PriceFeed {
        PriceFeed::new(&FeedConfig {
            api_key: String::new(),
            quotes_url: "http://127.0.0.1:9/quotes".to_string(),
            cache_secs: 60,
        })
        .expect("feed should build")
    }

    #[test]
    fn extract_prices_maps_nested_usd_quotes() {
        let raw = r#"{
            "data": {
                "BTC": {"quote": {"USD": {"price": 62000.5}}},
                "ETH": {"quote": {"USD": {"price": 3400.25}}}
            }
        }"#;
        let response: QuotesResponse = serde_json::from_str(raw).expect("json should parse");
        let prices =
            extract_prices(response, &symbols(&["BTC", "ETH", "SOL"])).expect("data present");
        assert_eq!(prices.get("BTC"), Some(&62000.5));
        assert_eq!(prices.get("ETH"), Some(&3400.25));
        // SOL absent from the response: omitted, not an error
        assert!(!prices.contains_key("SOL"));
    }

    #[test]
    fn extract_prices_surfaces_api_error_message() {
        let raw = r#"{"status": {"error_message": "API key missing"}}"#;
        let response: QuotesResponse = serde_json::from_str(raw).expect("json should parse");
        let err = extract_prices(response, &symbols(&["BTC"])).unwrap_err();
        assert!(err.to_string().contains("API key missing"));
    }

    #[test]
    fn extract_prices_skips_non_positive_prices() {
        let raw = r#"{"data": {"BTC": {"quote": {"USD": {"price": 0.0}}}}}"#;
        let response: QuotesResponse = serde_json::from_str(raw).expect("json should parse");
        let prices = extract_prices(response, &symbols(&["BTC"])).expect("data present");
        assert!(prices.is_empty());
    }

    #[test]
    fn fallback_table_covers_the_configured_universe() {
        let pairs = crate::config::trading_pairs();
        let snapshot = fallback_snapshot(Utc::now());
        for symbol in crate::config::watched_symbols(&pairs) {
            assert!(
                snapshot.price(&symbol).is_some(),
                "fallback table missing {symbol}"
            );
        }
    }

    #[tokio::test]
    async fn first_failed_fetch_seeds_fallback_and_caches_it() {
        let mut feed = unreachable_feed();
        let watched = symbols(&["BTC", "USDT"]);

        let snapshot = feed.get_prices(&watched).await;
        assert_eq!(snapshot.price("BTC"), Some(62_000.0));
        assert!(snapshot.fetched_at.is_some());

        // Second call is served from the (fallback) cache without another
        // fetch attempt, so it must return the same timestamp.
        let stamped = feed.last_update();
        let again = feed.get_prices(&watched).await;
        assert_eq!(again.fetched_at, stamped);
    }

    #[tokio::test]
    async fn set_api_key_invalidates_cache_but_keeps_prices() {
        let mut feed = unreachable_feed();
        let watched = symbols(&["BTC"]);
        feed.get_prices(&watched).await;

        feed.set_api_key("fresh-key".to_string());
        assert!(feed.api_key_configured());
        assert!(feed.last_update().is_none());

        // Refetch fails again; the stale prices survive.
        let snapshot = feed.get_prices(&watched).await;
        assert_eq!(snapshot.price("BTC"), Some(62_000.0));
    }

    #[tokio::test]
    async fn refresh_reports_the_failure_setup_api_needs() {
        let mut feed = unreachable_feed();
        let err = feed.refresh(&symbols(&["BTC"])).await.unwrap_err();
        assert!(matches!(err, AppError::Http(_)));
    }
}
