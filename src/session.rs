//! Session context: the state one command-loop conversation operates on.
//!
//! The feed cache, histories and live trading parameters all live here and
//! are passed explicitly into the engine, so concurrent sessions stay
//! isolated and tests stay deterministic.

use crate::arbitrage::{self, ScanOutcome};
use crate::config::{self, FeedConfig, TradingConfig, EXCHANGES, HISTORY_CAP};
use crate::errors::Result;
use crate::feed::PriceFeed;
use crate::models::{History, Opportunity, PriceSnapshot, Trade, TradingPair};
use crate::sim;
use crate::trade;
use chrono::Utc;
use tracing::info;

pub struct Session {
    pub feed: PriceFeed,
    pub trading: TradingConfig,
    pub pairs: Vec<TradingPair>,
    symbols: Vec<String>,
    pub opportunities: History<Opportunity>,
    pub trades: History<Trade>,
}

impl Session {
    pub fn new(feed_cfg: &FeedConfig) -> Result<Self> {
        let pairs = config::trading_pairs();
        let symbols = config::watched_symbols(&pairs);
        Ok(Self {
            feed: PriceFeed::new(feed_cfg)?,
            trading: TradingConfig::default(),
            pairs,
            symbols,
            opportunities: History::new(HISTORY_CAP),
            trades: History::new(HISTORY_CAP),
        })
    }

    /// Asset symbols requested from the feed (union over all pairs).
    pub fn symbols(&self) -> &[String] {
        &self.symbols
    }

    pub fn find_pair(&self, name: &str) -> Option<&TradingPair> {
        self.pairs.iter().find(|p| p.to_string() == name)
    }

    /// Cached-or-refreshed reference prices, cloned out of the feed so the
    /// caller can keep borrowing the session.
    pub async fn snapshot(&mut self) -> PriceSnapshot {
        self.feed.get_prices(&self.symbols).await.clone()
    }

    /// One engine pass at the current time bucket, recording every
    /// emitted opportunity and auto-trading while the daily cap allows.
    pub async fn scan_once(&mut self) -> (ScanOutcome, Vec<Trade>) {
        let bucket = sim::current_bucket();
        self.scan_at(bucket).await
    }

    /// Engine pass at an explicit bucket. Split out so tests can pin the
    /// quote window instead of depending on wall-clock luck.
    pub async fn scan_at(&mut self, bucket: u64) -> (ScanOutcome, Vec<Trade>) {
        let snapshot = self.snapshot().await;
        let now = Utc::now();
        let outcome = arbitrage::scan(
            &self.pairs,
            EXCHANGES,
            &snapshot,
            bucket,
            self.trading.min_profit_pct,
            now,
        );

        for opp in &outcome.opportunities {
            self.opportunities.push(opp.clone());
        }

        let mut executed = Vec::new();
        if self.trading.auto_trading {
            for opp in &outcome.opportunities {
                match trade::execute(opp, &self.trading, self.trades.len(), now) {
                    Ok(filled) => {
                        info!(
                            pair = %filled.pair,
                            profit = filled.profit_amount,
                            "[TRADE] simulated fill recorded"
                        );
                        self.trades.push(filled.clone());
                        executed.push(filled);
                    }
                    // Cap reached: nothing later in this pass can execute.
                    Err(_) => break,
                }
            }
        }

        (outcome, executed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn offline_session() -> Session {
        Session::new(&FeedConfig {
            api_key: String::new(),
            quotes_url: "http://127.0.0.1:9/quotes".to_string(),
            cache_secs: 600,
        })
        .expect("session should build")
    }

    /// Sweep buckets until a pass emits at least `want` opportunities.
    async fn bucket_with_opportunities(session: &mut Session, want: usize) -> u64 {
        for bucket in 0..500 {
            let (outcome, _) = session.scan_at(bucket).await;
            if outcome.opportunities.len() >= want {
                return bucket;
            }
        }
        panic!("no bucket produced {want} opportunities");
    }

    #[tokio::test]
    async fn scan_records_history_without_auto_trading() {
        let mut session = offline_session();
        session.trading.min_profit_pct = 0.01;

        let bucket = bucket_with_opportunities(&mut session, 1).await;
        let before = session.opportunities.len();
        let (outcome, executed) = session.scan_at(bucket).await;

        assert!(!outcome.opportunities.is_empty());
        assert!(executed.is_empty(), "auto-trading defaults to off");
        assert!(session.trades.is_empty());
        assert_eq!(
            session.opportunities.len(),
            before + outcome.opportunities.len()
        );
    }

    #[tokio::test]
    async fn auto_trading_stops_at_the_daily_cap() {
        let mut session = offline_session();
        session.trading.min_profit_pct = 0.01;

        let bucket = bucket_with_opportunities(&mut session, 2).await;
        session.trading.auto_trading = true;
        session.trading.max_daily_trades = 1;

        let (outcome, executed) = session.scan_at(bucket).await;
        assert!(outcome.opportunities.len() >= 2);
        assert_eq!(executed.len(), 1);
        assert_eq!(session.trades.len(), 1);

        // A later pass cannot push past the cap either.
        let (_, more) = session.scan_at(bucket).await;
        assert!(more.is_empty());
        assert_eq!(session.trades.len(), 1);
    }

    #[tokio::test]
    async fn find_pair_matches_rendered_name() {
        let session = offline_session();
        assert!(session.find_pair("BTC-USDT").is_some());
        assert!(session.find_pair("BTC-EUR").is_none());
    }
}
