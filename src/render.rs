//! Transcript rendering for command responses.
//!
//! Pure string building only; every command handler funnels its result
//! through here so the engine modules never format user-facing text.

use crate::arbitrage::ExchangeQuote;
use crate::config::{ExchangeConfig, TradingConfig};
use crate::models::{History, Opportunity, Trade, TradingPair};
use crate::monitor::MonitorReport;
use crate::trade;
use crate::utils::format_clock;
use chrono::{DateTime, Utc};

pub fn welcome() -> String {
    let mut out = String::from(
        "Welcome to the cross-exchange arbitrage detector. It finds buy/sell \
         spreads across simulated exchange quotes and can simulate trades \
         automatically.\n\nCryptocurrency trading involves significant risk, \
         including loss of capital; nothing here is financial advice.\n\n",
    );
    out.push_str(help_text());
    out.push_str(
        "\nTo use live reference data, configure a CoinMarketCap API key with \
         the setup_api command.\n",
    );
    out
}

pub fn help_text() -> &'static str {
    "Available commands:\n\n\
     scan - Search for current arbitrage opportunities\n\
     history - View history of detected opportunities\n\
     trades - View history of executed trades\n\
     status - View current agent status\n\
     dashboard [PAIR] - Show detailed dashboard for a specific pair (e.g., dashboard BTC-USDT)\n\
     dashboard_all - Show dashboard with all pairs and opportunities\n\
     config [param] [value] - Configure trading parameters\n\
     setup_api [api_key] - Configure CoinMarketCap API key\n\
     monitor [PAIR] [SECONDS] - Watch one pair's quotes for up to 300 seconds\n\
     help - Show this help\n\n\
     Usage examples:\n\
     dashboard BTC-USDT - Shows detailed analysis for Bitcoin\n\
     config min_profit 1.5 - Sets the minimum profit to 1.5%\n\
     config auto_trading true - Enables auto-trading\n\
     setup_api YOUR_API_KEY - Configures the CoinMarketCap API key\n"
}

pub fn fallback_hint() -> &'static str {
    "That doesn't look like a trading command. Type 'help' to list the available commands."
}

/// Numbered scan results plus any pairs skipped for missing reference
/// prices.
pub fn opportunities_report(opportunities: &[Opportunity], skipped: &[TradingPair]) -> String {
    let mut out = String::new();
    if opportunities.is_empty() {
        out.push_str("No significant arbitrage opportunities found at this time.");
    } else {
        out.push_str("Arbitrage opportunities detected:\n\n");
        for (i, opp) in opportunities.iter().enumerate() {
            out.push_str(&format!("#{} - Pair: {}\n", i + 1, opp.pair));
            out.push_str(&format!(
                "   Buy on: {} at ${:.4}\n",
                opp.buy_exchange.to_uppercase(),
                opp.buy_price
            ));
            out.push_str(&format!(
                "   Sell on: {} at ${:.4}\n",
                opp.sell_exchange.to_uppercase(),
                opp.sell_price
            ));
            out.push_str(&format!(
                "   Spread: {:.2}% | Net after fees: {:.2}%\n\n",
                opp.gross_diff_pct, opp.net_profit_pct
            ));
        }
        out.push_str(
            "Note: This information does not constitute financial advice. Consider \
             trading fees, withdrawal fees and risks before executing any trade.",
        );
    }
    if !skipped.is_empty() {
        let names: Vec<String> = skipped.iter().map(|p| p.to_string()).collect();
        out.push_str(&format!(
            "\n\nSkipped (no reference price): {}",
            names.join(", ")
        ));
    }
    out
}

pub fn trade_notification(filled: &Trade) -> String {
    let units = trade::units_bought(filled);
    format!(
        "Trade executed automatically:\n\
         Buy: {:.6} {} on {} at ${:.4}\n\
         Sell: {:.6} {} on {} at ${:.4}\n\
         Estimated profit: ${:.2} ({:.2}%)",
        units,
        filled.pair.base,
        filled.buy_exchange.to_uppercase(),
        filled.buy_price,
        units,
        filled.pair.base,
        filled.sell_exchange.to_uppercase(),
        filled.sell_price,
        filled.profit_amount,
        filled.profit_pct
    )
}

/// The last ten recorded opportunities, oldest first.
pub fn history_report(history: &History<Opportunity>) -> String {
    if history.is_empty() {
        return "No arbitrage opportunity history recorded.".to_string();
    }
    let mut out = String::from("Arbitrage opportunity history (last 10):\n\n");
    for (i, opp) in history.last(10).enumerate() {
        out.push_str(&format!(
            "#{} - {} - {}: {:.2}% ({} → {})\n",
            i + 1,
            opp.timestamp.format("%Y-%m-%d %H:%M:%S"),
            opp.pair,
            opp.gross_diff_pct,
            opp.buy_exchange,
            opp.sell_exchange
        ));
    }
    out
}

pub fn trades_report(trades: &History<Trade>) -> String {
    if trades.is_empty() {
        return "No trade history available.".to_string();
    }
    let mut out = String::from("Trade History:\n\n");
    for (i, t) in trades.iter().enumerate() {
        out.push_str(&format!(
            "#{} - {} - {}\n",
            i + 1,
            t.timestamp.format("%Y-%m-%d %H:%M:%S"),
            t.pair
        ));
        out.push_str(&format!(
            "   Buy: {} at ${:.4}\n",
            t.buy_exchange.to_uppercase(),
            t.buy_price
        ));
        out.push_str(&format!(
            "   Sell: {} at ${:.4}\n",
            t.sell_exchange.to_uppercase(),
            t.sell_price
        ));
        out.push_str(&format!("   Amount: ${} USDT\n", t.amount));
        out.push_str(&format!(
            "   Profit: ${:.2} ({:.2}%)\n",
            t.profit_amount, t.profit_pct
        ));
        out.push_str(&format!("   Status: {}\n\n", t.status));
    }
    out
}

pub fn status_report(
    config: &TradingConfig,
    exchanges: &[ExchangeConfig],
    last_update: Option<DateTime<Utc>>,
    trades_today: usize,
    api_configured: bool,
) -> String {
    let mut out = String::from("Current Status of Arbitrage Agent:\n\n");
    out.push_str("Configuration:\n");
    out.push_str(&format!(
        "- Minimum profit percentage: {}%\n",
        config.min_profit_pct
    ));
    out.push_str(&format!("- Amount per trade: {} USDT\n", config.trade_amount));
    out.push_str(&format!(
        "- Maximum daily trades: {}\n",
        config.max_daily_trades
    ));
    out.push_str(&format!(
        "- Auto-trading: {}\n\n",
        if config.auto_trading {
            "ENABLED"
        } else {
            "DISABLED"
        }
    ));

    out.push_str("Configured exchanges:\n");
    for e in exchanges {
        out.push_str(&format!(
            "- {}: fee {:.2}%, withdrawal {:.2}%\n",
            e.name, e.trading_fee_pct, e.withdrawal_fee_pct
        ));
    }

    out.push_str(&format!(
        "\nLast price update: {}\n",
        format_clock(last_update)
    ));
    out.push_str(&format!(
        "Trades today: {}/{}\n",
        trades_today, config.max_daily_trades
    ));
    out.push_str(&format!(
        "\nCoinMarketCap API: {}\n",
        if api_configured {
            "configured"
        } else {
            "not configured"
        }
    ));
    out
}

/// Single-pair dashboard. `quotes` must already be sorted by price,
/// highest first; `best` is the fee-adjusted selection (if the two legs
/// landed on distinct exchanges).
pub fn dashboard(
    pair: &TradingPair,
    reference_price: f64,
    quotes: &[ExchangeQuote],
    best: Option<&Opportunity>,
    last_update: Option<DateTime<Utc>>,
    now: DateTime<Utc>,
) -> String {
    let mut out = format!(
        "DASHBOARD: {} ({})\n\n",
        pair,
        now.format("%Y-%m-%d %H:%M:%S")
    );
    out.push_str(&format!(
        "Reference price ({}): ${:.4}\n\n",
        pair.base, reference_price
    ));

    out.push_str("EXCHANGE RANKING BY PRICE (HIGH TO LOW)\n");
    out.push_str("┌─────────────┬────────────┬────────────┬────────────┬────────────┐\n");
    out.push_str("│  EXCHANGE   │   PRICE    │   FEE %    │ WITH FEES  │  EFF. SELL │\n");
    out.push_str("├─────────────┼────────────┼────────────┼────────────┼────────────┤\n");
    for q in quotes {
        out.push_str(&format!(
            "│ {:<11} │ {:<10} │ {:<10} │ {:<10} │ {:<10} │\n",
            q.exchange.to_uppercase(),
            format!("${:.4}", q.price),
            format!("{}%", q.trading_fee_pct),
            format!("${:.4}", q.cost_after_fees),
            format!("${:.4}", q.effective_sell_value)
        ));
    }
    out.push_str("└─────────────┴────────────┴────────────┴────────────┴────────────┘\n\n");

    out.push_str("BEST ARBITRAGE OPPORTUNITY\n");
    match best {
        Some(opp) => {
            out.push_str(&format!(
                "Buy on: {} at ${:.4}\n",
                opp.buy_exchange.to_uppercase(),
                opp.buy_price
            ));
            out.push_str(&format!(
                "Sell on: {} at ${:.4}\n",
                opp.sell_exchange.to_uppercase(),
                opp.sell_price
            ));
            out.push_str(&format!("Price difference: {:.2}%\n", opp.gross_diff_pct));
            if opp.net_profit_pct > 0.0 {
                out.push_str(&format!(
                    "Net profit (after fees): {:.2}%\n\n",
                    opp.net_profit_pct
                ));
            } else {
                out.push_str(&format!(
                    "Net profit (after fees): {:.2}% — not profitable\n\n",
                    opp.net_profit_pct
                ));
            }
        }
        None => {
            out.push_str("No profitable arbitrage opportunity between different exchanges.\n\n");
        }
    }

    if !quotes.is_empty() {
        let max = quotes.iter().map(|q| q.price).fold(f64::NEG_INFINITY, f64::max);
        let min = quotes.iter().map(|q| q.price).fold(f64::INFINITY, f64::min);
        let avg = quotes.iter().map(|q| q.price).sum::<f64>() / quotes.len() as f64;
        let spread = if avg > 0.0 { (max - min) / avg * 100.0 } else { 0.0 };
        out.push_str("VARIATION STATISTICS\n");
        out.push_str(&format!("Maximum price: ${:.4}\n", max));
        out.push_str(&format!("Minimum price: ${:.4}\n", min));
        out.push_str(&format!("Average price: ${:.4}\n", avg));
        out.push_str(&format!("Spread between exchanges: {:.2}%\n\n", spread));
    }

    out.push_str(&format!("Data updated: {}\n", format_clock(last_update)));
    out.push_str("To update prices, use the 'scan' command.\n");
    out.push_str("To see arbitrage opportunities, use the 'dashboard_all' command.\n");
    out
}

/// All-pairs dashboard: fee-adjusted opportunities (already sorted by net
/// profit, best first) plus the reference price list.
pub fn dashboard_all(
    opportunities: &[Opportunity],
    reference_prices: &[(String, f64)],
    last_update: Option<DateTime<Utc>>,
) -> String {
    let mut out = String::from("COMPLETE ARBITRAGE DASHBOARD\n\n");

    if opportunities.is_empty() {
        out.push_str("No positive arbitrage opportunities found at this time.\n\n");
    } else {
        out.push_str("ARBITRAGE OPPORTUNITIES\n");
        out.push_str(
            "┌─────────┬─────────────┬────────────┬─────────────┬────────────┬──────────┐\n",
        );
        out.push_str(
            "│  PAIR   │   BUY ON    │   PRICE    │   SELL ON   │   PRICE    │  PROFIT  │\n",
        );
        out.push_str(
            "├─────────┼─────────────┼────────────┼─────────────┼────────────┼──────────┤\n",
        );
        for opp in opportunities {
            out.push_str(&format!(
                "│ {:<7} │ {:<11} │ {:<10} │ {:<11} │ {:<10} │ {:<8} │\n",
                opp.pair.to_string(),
                opp.buy_exchange.to_uppercase(),
                format!("${:.4}", opp.buy_price),
                opp.sell_exchange.to_uppercase(),
                format!("${:.4}", opp.sell_price),
                format!("{:.2}%", opp.net_profit_pct)
            ));
        }
        out.push_str(
            "└─────────┴─────────────┴────────────┴─────────────┴────────────┴──────────┘\n\n",
        );
    }

    out.push_str("AVERAGE PRICES BY CRYPTOCURRENCY\n");
    for (symbol, price) in reference_prices {
        out.push_str(&format!("{}: ${:.4}\n", symbol, price));
    }

    out.push_str(&format!("\nData updated: {}\n", format_clock(last_update)));
    out.push_str("To see details for a specific pair, use the command 'dashboard [PAIR]'.\n");
    out
}

pub fn monitor_report(report: &MonitorReport) -> String {
    if report.stats.is_empty() {
        return format!("No price data collected for {}.", report.pair);
    }
    let mut out = format!(
        "Monitoring completed for {} ({} samples):\n\n",
        report.pair, report.samples
    );
    for s in &report.stats {
        out.push_str(&format!("{}:\n", s.exchange.to_uppercase()));
        out.push_str(&format!("  Minimum price: ${:.4}\n", s.min));
        out.push_str(&format!("  Maximum price: ${:.4}\n", s.max));
        out.push_str(&format!("  Average price: ${:.4}\n", s.avg));
        out.push_str(&format!("  Volatility: {:.2}%\n\n", s.volatility_pct));
    }
    out.push_str("Use 'scan' to see current arbitrage opportunities.");
    out
}

/// Unknown-pair response: the recognized universe, narrowed to fuzzy
/// matches on the base asset when any exist.
pub fn unknown_pair(input: &str, pairs: &[TradingPair]) -> String {
    let base = input.split('-').next().unwrap_or(input);
    let similar: Vec<String> = pairs
        .iter()
        .map(|p| p.to_string())
        .filter(|p| !base.is_empty() && p.contains(base))
        .collect();
    if !similar.is_empty() {
        format!(
            "Pair not recognized. Perhaps you meant one of these? {}",
            similar.join(", ")
        )
    } else {
        let all: Vec<String> = pairs.iter().map(|p| p.to_string()).collect();
        format!("Pair not recognized. Available pairs: {}", all.join(", "))
    }
}
