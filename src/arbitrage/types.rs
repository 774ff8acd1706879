use crate::models::{Opportunity, TradingPair};

/// One exchange's simulated view of a pair's base asset for a single
/// time bucket, with the fee-adjusted figures both ranking modes need.
#[derive(Debug, Clone)]
pub struct ExchangeQuote {
    pub exchange: &'static str,
    pub price: f64,
    pub trading_fee_pct: f64,
    pub withdrawal_fee_pct: f64,
    /// Cost of acquiring one unit including trading and withdrawal fees.
    pub cost_after_fees: f64,
    /// Proceeds of selling one unit after the trading fee.
    pub effective_sell_value: f64,
}

/// Result of one engine pass over the pair universe.
#[derive(Debug, Clone, Default)]
pub struct ScanOutcome {
    pub opportunities: Vec<Opportunity>,
    /// Pairs with a leg missing from the price snapshot. Reported, not
    /// errors.
    pub skipped: Vec<TradingPair>,
}
