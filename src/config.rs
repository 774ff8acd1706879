//! Configuration loader and static exchange/pair tables.

use crate::models::TradingPair;

/// Quotes endpoint queried for reference prices.
pub const DEFAULT_QUOTES_URL: &str =
    "https://pro-api.coinmarketcap.com/v1/cryptocurrency/quotes/latest";

/// How long a fetched price snapshot stays fresh (seconds).
pub const DEFAULT_CACHE_SECS: u64 = 60;

/// Capacity of the opportunity and trade ring buffers.
pub const HISTORY_CAP: usize = 500;

/// Pairs monitored for arbitrage. Fixed ordered universe, immutable at
/// runtime.
pub const TRADING_PAIRS: &[&str] = &[
    "BTC-USDT",
    "ETH-USDT",
    "XRP-USDT",
    "NEAR-USDT",
    "SOL-USDT",
    "ADA-USDT",
    "DOT-USDT",
];

/// Fee and simulated-variance profile for one exchange.
///
/// `variance_min_pct..variance_max_pct` bounds the deviation of the
/// simulated quote from the reference price, in percent.
#[derive(Debug, Clone, Copy)]
pub struct ExchangeConfig {
    pub name: &'static str,
    pub trading_fee_pct: f64,
    pub withdrawal_fee_pct: f64,
    pub variance_min_pct: f64,
    pub variance_max_pct: f64,
}

/// Simulated exchange set. Iteration order is significant: ranking ties
/// are broken by the first exchange encountered.
pub const EXCHANGES: &[ExchangeConfig] = &[
    ExchangeConfig {
        name: "binance",
        trading_fee_pct: 0.10,
        withdrawal_fee_pct: 0.05,
        variance_min_pct: -0.1,
        variance_max_pct: 0.1,
    },
    ExchangeConfig {
        name: "kucoin",
        trading_fee_pct: 0.10,
        withdrawal_fee_pct: 0.10,
        variance_min_pct: -0.2,
        variance_max_pct: 0.3,
    },
    ExchangeConfig {
        name: "kraken",
        trading_fee_pct: 0.16,
        withdrawal_fee_pct: 0.08,
        variance_min_pct: -0.3,
        variance_max_pct: 0.2,
    },
    ExchangeConfig {
        name: "okx",
        trading_fee_pct: 0.08,
        withdrawal_fee_pct: 0.07,
        variance_min_pct: 0.05,
        variance_max_pct: 0.35,
    },
];

/// Symbols whose upstream listing differs from our canonical ticker.
/// CoinMarketCap uses the same tickers for the configured universe, so the
/// table is empty; add entries here when a listing diverges.
const SYMBOL_OVERRIDES: &[(&str, &str)] = &[];

/// Canonical symbol → external quotes-endpoint symbol.
pub fn external_symbol(symbol: &str) -> &str {
    SYMBOL_OVERRIDES
        .iter()
        .find(|(canonical, _)| *canonical == symbol)
        .map(|(_, external)| *external)
        .unwrap_or(symbol)
}

/// The configured pair universe, parsed.
pub fn trading_pairs() -> Vec<TradingPair> {
    TRADING_PAIRS
        .iter()
        .filter_map(|s| TradingPair::parse(s))
        .collect()
}

/// Union of asset symbols over all pairs, first-appearance order, no
/// duplicates. This is the batch requested from the quotes endpoint.
pub fn watched_symbols(pairs: &[TradingPair]) -> Vec<String> {
    let mut symbols: Vec<String> = Vec::new();
    for pair in pairs {
        for leg in [&pair.base, &pair.quote] {
            if !symbols.iter().any(|s| s == leg) {
                symbols.push(leg.clone());
            }
        }
    }
    symbols
}

/// Mutable trading parameters, adjusted via `config` commands and read on
/// every scan/execute.
#[derive(Debug, Clone)]
pub struct TradingConfig {
    pub min_profit_pct: f64,
    pub trade_amount: f64,
    pub max_daily_trades: usize,
    pub auto_trading: bool,
}

impl Default for TradingConfig {
    fn default() -> Self {
        Self {
            min_profit_pct: 1.0,
            trade_amount: 100.0,
            max_daily_trades: 10,
            auto_trading: false,
        }
    }
}

/// Price feed settings, loaded from environment variables.
#[derive(Debug, Clone)]
pub struct FeedConfig {
    /// CoinMarketCap API key; empty means "not configured" and the feed
    /// will degrade to the fallback table on its first fetch.
    pub api_key: String,
    pub quotes_url: String,
    pub cache_secs: u64,
}

impl FeedConfig {
    /// Load from `CMC_API_KEY`, `CMC_QUOTES_URL` and `PRICE_CACHE_SECS`,
    /// defaulting where unset.
    pub fn load() -> Self {
        let api_key = std::env::var("CMC_API_KEY").unwrap_or_default();
        let quotes_url =
            std::env::var("CMC_QUOTES_URL").unwrap_or_else(|_| DEFAULT_QUOTES_URL.to_string());
        let cache_secs = std::env::var("PRICE_CACHE_SECS")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(DEFAULT_CACHE_SECS);
        Self {
            api_key,
            quotes_url,
            cache_secs,
        }
    }
}
