//! Shared data structures used throughout the application.

use chrono::{DateTime, Utc};
use std::collections::{HashMap, VecDeque};
use std::fmt;

/// Ordered trading pair, rendered as `"BASE-QUOTE"` (e.g. "BTC-USDT").
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TradingPair {
    pub base: String,
    pub quote: String,
}

impl TradingPair {
    /// Parse a `"BASE-QUOTE"` string. Returns `None` if either leg is empty.
    pub fn parse(s: &str) -> Option<Self> {
        let (base, quote) = s.split_once('-')?;
        if base.is_empty() || quote.is_empty() {
            return None;
        }
        Some(Self {
            base: base.to_ascii_uppercase(),
            quote: quote.to_ascii_uppercase(),
        })
    }
}

impl fmt::Display for TradingPair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.base, self.quote)
    }
}

/// Reference prices keyed by asset symbol, plus the fetch timestamp.
///
/// A symbol missing from `prices` means "unavailable for this pair",
/// never an error.
#[derive(Debug, Clone, Default)]
pub struct PriceSnapshot {
    pub prices: HashMap<String, f64>,
    pub fetched_at: Option<DateTime<Utc>>,
}

impl PriceSnapshot {
    pub fn is_empty(&self) -> bool {
        self.prices.is_empty()
    }

    pub fn price(&self, symbol: &str) -> Option<f64> {
        self.prices.get(symbol).copied()
    }

    /// Seconds since the last successful fetch, or `None` if never fetched.
    pub fn age_secs(&self, now: DateTime<Utc>) -> Option<i64> {
        self.fetched_at.map(|t| (now - t).num_seconds())
    }
}

/// A detected arbitrage opportunity. Immutable once created.
#[derive(Debug, Clone)]
pub struct Opportunity {
    pub pair: TradingPair,
    pub buy_exchange: &'static str,
    pub buy_price: f64,
    pub sell_exchange: &'static str,
    pub sell_price: f64,
    pub gross_diff_pct: f64,
    pub net_profit_pct: f64,
    pub timestamp: DateTime<Utc>,
}

/// Terminal state of a simulated trade. There is no pending/partial
/// settlement here; a real execution path would need a state machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TradeStatus {
    Completed,
}

impl fmt::Display for TradeStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TradeStatus::Completed => write!(f, "completed"),
        }
    }
}

/// A simulated fill derived from an accepted opportunity.
#[derive(Debug, Clone)]
pub struct Trade {
    pub pair: TradingPair,
    pub buy_exchange: &'static str,
    pub sell_exchange: &'static str,
    pub buy_price: f64,
    pub sell_price: f64,
    pub amount: f64,
    pub profit_pct: f64,
    pub profit_amount: f64,
    pub timestamp: DateTime<Utc>,
    pub status: TradeStatus,
}

/// Append-only record list bounded to a fixed capacity; the oldest entry
/// is evicted once the capacity is reached.
#[derive(Debug, Clone)]
pub struct History<T> {
    buf: VecDeque<T>,
    cap: usize,
}

impl<T> History<T> {
    pub fn new(cap: usize) -> Self {
        Self {
            buf: VecDeque::with_capacity(cap),
            cap,
        }
    }

    pub fn push(&mut self, item: T) {
        if self.buf.len() == self.cap {
            self.buf.pop_front();
        }
        self.buf.push_back(item);
    }

    pub fn len(&self) -> usize {
        self.buf.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &T> {
        self.buf.iter()
    }

    /// The most recent `n` entries, oldest first.
    pub fn last(&self, n: usize) -> impl Iterator<Item = &T> {
        self.buf.iter().skip(self.buf.len().saturating_sub(n))
    }
}
