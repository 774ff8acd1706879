use super::types::{ExchangeQuote, ScanOutcome};
use crate::config::ExchangeConfig;
use crate::models::{Opportunity, PriceSnapshot, TradingPair};
use crate::sim;
use chrono::{DateTime, Utc};
use tracing::debug;

/// Simulate the full per-exchange quote board for one base asset.
pub fn quote_board(
    exchanges: &[ExchangeConfig],
    symbol: &str,
    reference_price: f64,
    bucket: u64,
) -> Vec<ExchangeQuote> {
    exchanges
        .iter()
        .map(|exchange| {
            let price = sim::simulate_quote(exchange, symbol, reference_price, bucket);
            ExchangeQuote {
                exchange: exchange.name,
                price,
                trading_fee_pct: exchange.trading_fee_pct,
                withdrawal_fee_pct: exchange.withdrawal_fee_pct,
                cost_after_fees: price * (1.0 + exchange.trading_fee_pct / 100.0)
                    + price * (exchange.withdrawal_fee_pct / 100.0),
                effective_sell_value: price * (1.0 - exchange.trading_fee_pct / 100.0),
            }
        })
        .collect()
}

/// Net arbitrage gain as a percentage of the buy price: spread minus the
/// buy-side fee, the sell-side fee, and the withdrawal fee on the bought
/// asset.
pub fn net_profit_pct(
    buy_price: f64,
    sell_price: f64,
    buy_fee_pct: f64,
    sell_fee_pct: f64,
    withdrawal_fee_pct: f64,
) -> f64 {
    let buy_fee = buy_price * (buy_fee_pct / 100.0);
    let sell_fee = sell_price * (sell_fee_pct / 100.0);
    let withdrawal_fee = buy_price * (withdrawal_fee_pct / 100.0);
    (sell_price - buy_price - buy_fee - sell_fee - withdrawal_fee) / buy_price * 100.0
}

/// Raw-price ranking: buy at the lowest quote, sell at the highest. Ties
/// go to the first exchange in configuration order. This is the `scan`
/// selection mode.
pub fn best_raw_spread(quotes: &[ExchangeQuote]) -> Option<(usize, usize)> {
    if quotes.len() < 2 {
        return None;
    }
    let mut buy = 0;
    let mut sell = 0;
    for (i, quote) in quotes.iter().enumerate() {
        if quote.price < quotes[buy].price {
            buy = i;
        }
        if quote.price > quotes[sell].price {
            sell = i;
        }
    }
    Some((buy, sell))
}

/// Fee-adjusted ranking: buy where acquisition cost (fees included) is
/// lowest, sell where post-fee proceeds are highest. This is the
/// dashboard selection mode; it can legitimately disagree with
/// [`best_raw_spread`] when fee asymmetry reorders exchanges, so the two
/// are kept as distinct queries.
pub fn best_fee_adjusted(quotes: &[ExchangeQuote]) -> Option<(usize, usize)> {
    if quotes.len() < 2 {
        return None;
    }
    let mut buy = 0;
    let mut sell = 0;
    for (i, quote) in quotes.iter().enumerate() {
        if quote.cost_after_fees < quotes[buy].cost_after_fees {
            buy = i;
        }
        if quote.effective_sell_value > quotes[sell].effective_sell_value {
            sell = i;
        }
    }
    Some((buy, sell))
}

/// Best fee-adjusted opportunity on a quote board, or `None` when the two
/// legs land on the same exchange. The record is returned even when the
/// net is non-positive: the single-pair dashboard shows unprofitable
/// spreads too, callers filter where needed.
pub fn fee_adjusted_opportunity(
    pair: &TradingPair,
    quotes: &[ExchangeQuote],
    now: DateTime<Utc>,
) -> Option<Opportunity> {
    let (buy, sell) = best_fee_adjusted(quotes)?;
    if quotes[buy].exchange == quotes[sell].exchange {
        return None;
    }
    let buy = &quotes[buy];
    let sell = &quotes[sell];
    Some(Opportunity {
        pair: pair.clone(),
        buy_exchange: buy.exchange,
        buy_price: buy.price,
        sell_exchange: sell.exchange,
        sell_price: sell.price,
        gross_diff_pct: (sell.price - buy.price) / buy.price * 100.0,
        net_profit_pct: (sell.effective_sell_value - buy.cost_after_fees) / buy.price * 100.0,
        timestamp: now,
    })
}

/// One engine pass: per pair, simulate the quote board, rank by raw
/// price, apply the fee model, and emit every opportunity clearing the
/// minimum-profit threshold. Pairs missing a snapshot leg are skipped.
pub fn scan(
    pairs: &[TradingPair],
    exchanges: &[ExchangeConfig],
    snapshot: &PriceSnapshot,
    bucket: u64,
    min_profit_pct: f64,
    now: DateTime<Utc>,
) -> ScanOutcome {
    let mut outcome = ScanOutcome::default();

    for pair in pairs {
        let base_price = match (snapshot.price(&pair.base), snapshot.price(&pair.quote)) {
            (Some(base), Some(_)) => base,
            _ => {
                debug!(pair = %pair, "[SCAN] missing reference price, skipping pair");
                outcome.skipped.push(pair.clone());
                continue;
            }
        };

        let quotes = quote_board(exchanges, &pair.base, base_price, bucket);
        let Some((buy, sell)) = best_raw_spread(&quotes) else {
            continue;
        };
        let buy = &quotes[buy];
        let sell = &quotes[sell];

        let gross_diff_pct = (sell.price - buy.price) / buy.price * 100.0;
        let net = net_profit_pct(
            buy.price,
            sell.price,
            buy.trading_fee_pct,
            sell.trading_fee_pct,
            buy.withdrawal_fee_pct,
        );

        if net > 0.0 && net >= min_profit_pct {
            outcome.opportunities.push(Opportunity {
                pair: pair.clone(),
                buy_exchange: buy.exchange,
                buy_price: buy.price,
                sell_exchange: sell.exchange,
                sell_price: sell.price,
                gross_diff_pct,
                net_profit_pct: net,
                timestamp: now,
            });
        }
    }

    outcome
}
