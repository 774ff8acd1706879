//! Bounded price monitoring for a single pair.
//!
//! Polls the feed on a fixed interval for a capped duration, sampling the
//! simulated quote at every exchange. The loop blocks its session (one
//! command at a time) but is cancellable through a `watch` channel instead
//! of an uninterruptible sleep.

use crate::config::EXCHANGES;
use crate::models::TradingPair;
use crate::session::Session;
use crate::sim;
use std::time::{Duration, Instant};
use tokio::sync::watch;
use tracing::info;

/// Hard cap on one monitoring run (seconds).
pub const MAX_DURATION_SECS: u64 = 300;

/// Seconds between polls, chosen to stay well under the feed cache TTL.
pub const POLL_INTERVAL_SECS: u64 = 10;

/// Per-exchange summary over the sampled quotes.
#[derive(Debug, Clone)]
pub struct ExchangeStats {
    pub exchange: &'static str,
    pub min: f64,
    pub max: f64,
    pub avg: f64,
    /// (max - min) / avg, in percent.
    pub volatility_pct: f64,
}

#[derive(Debug, Clone)]
pub struct MonitorReport {
    pub pair: TradingPair,
    pub samples: usize,
    pub stats: Vec<ExchangeStats>,
}

/// Run one monitoring pass. The duration must already be validated
/// against [`MAX_DURATION_SECS`]; cancellation (or the cancel sender
/// going away) ends the run early with whatever was sampled.
pub async fn run(
    session: &mut Session,
    pair: &TradingPair,
    duration_secs: u64,
    mut cancel: watch::Receiver<bool>,
) -> MonitorReport {
    let started = Instant::now();
    let deadline = Duration::from_secs(duration_secs);
    let mut series: Vec<(&'static str, Vec<f64>)> =
        EXCHANGES.iter().map(|e| (e.name, Vec::new())).collect();
    let mut samples = 0usize;

    info!(pair = %pair, duration_secs, "[MONITOR] started");
    loop {
        let snapshot = session.snapshot().await;
        if let Some(reference) = snapshot.price(&pair.base) {
            let bucket = sim::current_bucket();
            for (i, exchange) in EXCHANGES.iter().enumerate() {
                series[i]
                    .1
                    .push(sim::simulate_quote(exchange, &pair.base, reference, bucket));
            }
            samples += 1;
        }

        let elapsed = started.elapsed();
        if elapsed >= deadline {
            break;
        }
        let sleep_for = Duration::from_secs(POLL_INTERVAL_SECS).min(deadline - elapsed);
        tokio::select! {
            _ = tokio::time::sleep(sleep_for) => {}
            changed = cancel.changed() => {
                if changed.is_err() || *cancel.borrow() {
                    info!(pair = %pair, samples, "[MONITOR] cancelled");
                    break;
                }
            }
        }
    }

    info!(pair = %pair, samples, "[MONITOR] finished");
    MonitorReport {
        pair: pair.clone(),
        samples,
        stats: summarize(&series),
    }
}

/// Collapse sampled quote series into per-exchange statistics. Exchanges
/// with no samples are dropped.
pub fn summarize(series: &[(&'static str, Vec<f64>)]) -> Vec<ExchangeStats> {
    series
        .iter()
        .filter(|(_, quotes)| !quotes.is_empty())
        .map(|(exchange, quotes)| {
            let min = quotes.iter().copied().fold(f64::INFINITY, f64::min);
            let max = quotes.iter().copied().fold(f64::NEG_INFINITY, f64::max);
            let avg = quotes.iter().sum::<f64>() / quotes.len() as f64;
            let volatility_pct = if avg > 0.0 {
                (max - min) / avg * 100.0
            } else {
                0.0
            };
            ExchangeStats {
                exchange: *exchange,
                min,
                max,
                avg,
                volatility_pct,
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::FeedConfig;

    fn offline_session() -> Session {
        Session::new(&FeedConfig {
            api_key: String::new(),
            quotes_url: "http://127.0.0.1:9/quotes".to_string(),
            cache_secs: 600,
        })
        .expect("session should build")
    }

    #[test]
    fn summarize_computes_spread_statistics() {
        let series = vec![
            ("binance", vec![100.0, 102.0, 101.0]),
            ("kucoin", vec![]),
        ];
        let stats = summarize(&series);
        assert_eq!(stats.len(), 1, "empty series are dropped");
        let s = &stats[0];
        assert_eq!(s.exchange, "binance");
        assert_eq!(s.min, 100.0);
        assert_eq!(s.max, 102.0);
        assert!((s.avg - 101.0).abs() < 1e-9);
        assert!((s.volatility_pct - (2.0 / 101.0 * 100.0)).abs() < 1e-9);
    }

    #[tokio::test]
    async fn zero_duration_takes_a_single_sample() {
        let mut session = offline_session();
        let pair = TradingPair::parse("BTC-USDT").unwrap();
        let (_tx, rx) = watch::channel(false);

        let report = run(&mut session, &pair, 0, rx).await;
        assert_eq!(report.samples, 1);
        assert_eq!(report.stats.len(), EXCHANGES.len());
    }

    #[tokio::test]
    async fn cancellation_ends_the_run_before_the_deadline() {
        let mut session = offline_session();
        let pair = TradingPair::parse("ETH-USDT").unwrap();
        let (tx, rx) = watch::channel(false);
        tx.send(true).expect("receiver alive");

        // Deadline far away; only the cancel signal can end this quickly.
        let report = run(&mut session, &pair, MAX_DURATION_SECS, rx).await;
        assert_eq!(report.samples, 1);
    }
}
