//! Simulated trade execution.
//!
//! A real execution path would submit orders against both venues and track
//! a submitted → filled/failed state machine; this simulator fixes the
//! status at creation and only models the arithmetic of the fill.

use crate::config::TradingConfig;
use crate::errors::{AppError, Result};
use crate::models::{Opportunity, Trade, TradeStatus};
use chrono::{DateTime, Utc};

/// Build the simulated fill for an accepted opportunity.
///
/// Refuses without side effects when auto-trading is disabled or the
/// daily trade cap has been reached; `executed_today` is the caller's
/// current trade-history length.
pub fn execute(
    opportunity: &Opportunity,
    config: &TradingConfig,
    executed_today: usize,
    now: DateTime<Utc>,
) -> Result<Trade> {
    if !config.auto_trading {
        return Err(AppError::AutoTradingDisabled);
    }
    if executed_today >= config.max_daily_trades {
        return Err(AppError::DailyTradeLimit(config.max_daily_trades));
    }

    Ok(Trade {
        pair: opportunity.pair.clone(),
        buy_exchange: opportunity.buy_exchange,
        sell_exchange: opportunity.sell_exchange,
        buy_price: opportunity.buy_price,
        sell_price: opportunity.sell_price,
        amount: config.trade_amount,
        profit_pct: opportunity.net_profit_pct,
        profit_amount: config.trade_amount * opportunity.net_profit_pct / 100.0,
        timestamp: now,
        status: TradeStatus::Completed,
    })
}

/// Units of the base asset acquired by a fill.
pub fn units_bought(trade: &Trade) -> f64 {
    trade.amount / trade.buy_price
}
