//! Command surface: a closed command type, its parser, and the router
//! mapping each variant to a handler.
//!
//! The verb is case-insensitive; arguments keep their case except pair
//! names, which are canonicalized to uppercase. Anything unrecognized is
//! handed back to the conversational layer (out of scope here).

use crate::arbitrage;
use crate::config::EXCHANGES;
use crate::models::Opportunity;
use crate::monitor;
use crate::render;
use crate::session::Session;
use crate::sim;
use chrono::Utc;
use tokio::sync::watch;

/// One typed `config` mutation, value already validated.
#[derive(Debug, Clone, PartialEq)]
pub enum ConfigUpdate {
    MinProfit(f64),
    TradeAmount(f64),
    MaxDailyTrades(usize),
    AutoTrading(bool),
}

#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    Scan,
    History,
    Trades,
    Status,
    Dashboard { pair: String },
    DashboardAll,
    Config(ConfigUpdate),
    SetupApi { key: String },
    Monitor { pair: String, seconds: u64 },
    Help,
}

/// Parser verdict. `Malformed` carries the descriptive message for a
/// known verb with bad arguments; `Fallback` means the input is not a
/// command at all.
#[derive(Debug, Clone, PartialEq)]
pub enum ParseOutcome {
    Command(Command),
    Malformed(String),
    Fallback,
}

use ParseOutcome::{Command as Cmd, Fallback, Malformed};

pub fn parse(input: &str) -> ParseOutcome {
    let mut parts = input.split_whitespace();
    let verb = match parts.next() {
        Some(v) => v.to_ascii_lowercase(),
        None => return Fallback,
    };
    let args: Vec<&str> = parts.collect();

    match (verb.as_str(), args.as_slice()) {
        ("scan", []) => Cmd(Command::Scan),
        ("history", []) => Cmd(Command::History),
        ("trades", []) => Cmd(Command::Trades),
        ("status", []) => Cmd(Command::Status),
        ("dashboard_all", []) => Cmd(Command::DashboardAll),
        ("help", []) => Cmd(Command::Help),
        ("dashboard", [pair]) => Cmd(Command::Dashboard {
            pair: pair.to_ascii_uppercase(),
        }),
        ("dashboard", _) => Malformed("Correct format: dashboard [PAIR]".to_string()),
        ("setup_api", [key]) => Cmd(Command::SetupApi {
            key: key.to_string(),
        }),
        ("setup_api", _) => Malformed("Correct format: setup_api [api_key]".to_string()),
        ("config", [param, value]) => parse_config(param, value),
        ("config", _) => Malformed("Correct format: config [param] [value]".to_string()),
        ("monitor", [pair, seconds]) => match seconds.parse::<u64>() {
            Ok(seconds) => Cmd(Command::Monitor {
                pair: pair.to_ascii_uppercase(),
                seconds,
            }),
            Err(_) => Malformed("Time must be a number in seconds.".to_string()),
        },
        ("monitor", _) => {
            Malformed("Correct format: monitor [PAIR] [TIME_IN_SECONDS]".to_string())
        }
        _ => Fallback,
    }
}

fn parse_config(param: &str, value: &str) -> ParseOutcome {
    match param.to_ascii_lowercase().as_str() {
        "min_profit" => match value.parse::<f64>() {
            Ok(v) => Cmd(Command::Config(ConfigUpdate::MinProfit(v))),
            Err(_) => Malformed("Value must be a number.".to_string()),
        },
        "trade_amount" => match value.parse::<f64>() {
            Ok(v) => Cmd(Command::Config(ConfigUpdate::TradeAmount(v))),
            Err(_) => Malformed("Value must be a number.".to_string()),
        },
        "max_daily_trades" => match value.parse::<usize>() {
            Ok(v) => Cmd(Command::Config(ConfigUpdate::MaxDailyTrades(v))),
            Err(_) => Malformed("Value must be an integer.".to_string()),
        },
        "auto_trading" => match value.to_ascii_lowercase().as_str() {
            "true" | "1" | "yes" | "on" => Cmd(Command::Config(ConfigUpdate::AutoTrading(true))),
            "false" | "0" | "no" | "off" => Cmd(Command::Config(ConfigUpdate::AutoTrading(false))),
            _ => Malformed("Invalid value. Use 'true' or 'false'.".to_string()),
        },
        other => Malformed(format!("Parameter '{}' not recognized.", other)),
    }
}

/// Route one parsed command to its handler and produce the transcript
/// response. Never fails: every error path resolves to a message.
pub async fn dispatch(command: Command, session: &mut Session) -> String {
    match command {
        Command::Scan => {
            let (outcome, executed) = session.scan_once().await;
            let mut out = render::opportunities_report(&outcome.opportunities, &outcome.skipped);
            for filled in &executed {
                out.push_str("\n\n");
                out.push_str(&render::trade_notification(filled));
            }
            out
        }
        Command::History => render::history_report(&session.opportunities),
        Command::Trades => render::trades_report(&session.trades),
        Command::Status => render::status_report(
            &session.trading,
            EXCHANGES,
            session.feed.last_update(),
            session.trades.len(),
            session.feed.api_key_configured(),
        ),
        Command::Dashboard { pair } => dashboard(session, &pair).await,
        Command::DashboardAll => dashboard_all(session).await,
        Command::Config(update) => apply_config(update, session),
        Command::SetupApi { key } => setup_api(session, key).await,
        Command::Monitor { pair, seconds } => monitor_pair(session, &pair, seconds).await,
        Command::Help => render::help_text().to_string(),
    }
}

fn apply_config(update: ConfigUpdate, session: &mut Session) -> String {
    match update {
        ConfigUpdate::MinProfit(v) => {
            session.trading.min_profit_pct = v;
            format!("Minimum profit percentage set to {}%", v)
        }
        ConfigUpdate::TradeAmount(v) => {
            session.trading.trade_amount = v;
            format!("Amount per trade set to {} USDT", v)
        }
        ConfigUpdate::MaxDailyTrades(v) => {
            session.trading.max_daily_trades = v;
            format!("Maximum daily trades set to {}", v)
        }
        ConfigUpdate::AutoTrading(enabled) => {
            session.trading.auto_trading = enabled;
            if enabled {
                "Auto-trading ENABLED".to_string()
            } else {
                "Auto-trading DISABLED".to_string()
            }
        }
    }
}

async fn setup_api(session: &mut Session, key: String) -> String {
    session.feed.set_api_key(key);
    let symbols = session.symbols().to_vec();
    match session.feed.refresh(&symbols).await {
        Ok(count) => format!(
            "CoinMarketCap API key configured successfully; priced {} symbols.",
            count
        ),
        Err(e) => format!(
            "API key configured, but couldn't get data ({}). Verify the key and API access.",
            e
        ),
    }
}

async fn dashboard(session: &mut Session, pair_name: &str) -> String {
    let Some(pair) = session.find_pair(pair_name).cloned() else {
        return render::unknown_pair(pair_name, &session.pairs);
    };
    let snapshot = session.snapshot().await;
    let Some(reference_price) = snapshot.price(&pair.base) else {
        return format!("Couldn't get price for {}.", pair.base);
    };

    let bucket = sim::current_bucket();
    let mut quotes = arbitrage::quote_board(EXCHANGES, &pair.base, reference_price, bucket);
    quotes.sort_by(|a, b| b.price.total_cmp(&a.price));
    let best = arbitrage::fee_adjusted_opportunity(&pair, &quotes, Utc::now());

    render::dashboard(
        &pair,
        reference_price,
        &quotes,
        best.as_ref(),
        session.feed.last_update(),
        Utc::now(),
    )
}

async fn dashboard_all(session: &mut Session) -> String {
    let snapshot = session.snapshot().await;
    let bucket = sim::current_bucket();
    let now = Utc::now();

    let mut opportunities: Vec<Opportunity> = Vec::new();
    let mut reference_prices: Vec<(String, f64)> = Vec::new();
    for pair in &session.pairs {
        let Some(reference_price) = snapshot.price(&pair.base) else {
            continue;
        };
        reference_prices.push((pair.base.clone(), reference_price));
        let quotes = arbitrage::quote_board(EXCHANGES, &pair.base, reference_price, bucket);
        if let Some(opp) = arbitrage::fee_adjusted_opportunity(pair, &quotes, now) {
            if opp.net_profit_pct > 0.0 {
                opportunities.push(opp);
            }
        }
    }
    opportunities.sort_by(|a, b| b.net_profit_pct.total_cmp(&a.net_profit_pct));

    render::dashboard_all(&opportunities, &reference_prices, session.feed.last_update())
}

async fn monitor_pair(session: &mut Session, pair_name: &str, seconds: u64) -> String {
    if seconds > monitor::MAX_DURATION_SECS {
        return format!(
            "Please use a maximum time of {} seconds (5 minutes).",
            monitor::MAX_DURATION_SECS
        );
    }
    let Some(pair) = session.find_pair(pair_name).cloned() else {
        return render::unknown_pair(pair_name, &session.pairs);
    };

    // Sender kept on the stack: dropping it early would read as a cancel.
    let (_cancel_tx, cancel_rx) = watch::channel(false);
    let report = monitor::run(session, &pair, seconds, cancel_rx).await;
    render::monitor_report(&report)
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
    fn verbs_parse_case_insensitively() {
        assert_eq!(parse("SCAN"), Cmd(Command::Scan));
        assert_eq!(parse("  Help  "), Cmd(Command::Help));
        assert_eq!(parse("Dashboard_All"), Cmd(Command::DashboardAll));
    }

    #[test]
    fn dashboard_canonicalizes_the_pair() {
        assert_eq!(
            parse("dashboard btc-usdt"),
            Cmd(Command::Dashboard {
                pair: "BTC-USDT".to_string()
            })
        );
        assert!(matches!(parse("dashboard"), Malformed(_)));
    }

    #[test]
    fn monitor_parses_pair_and_seconds() {
        assert_eq!(
            parse("monitor eth-usdt 120"),
            Cmd(Command::Monitor {
                pair: "ETH-USDT".to_string(),
                seconds: 120
            })
        );
        assert_eq!(
            parse("monitor eth-usdt soon"),
            Malformed("Time must be a number in seconds.".to_string())
        );
        assert!(matches!(parse("monitor eth-usdt"), Malformed(_)));
    }

    #[test]
    fn config_values_are_validated_at_parse_time() {
        assert_eq!(
            parse("config min_profit 1.5"),
            Cmd(Command::Config(ConfigUpdate::MinProfit(1.5)))
        );
        assert_eq!(
            parse("config min_profit high"),
            Malformed("Value must be a number.".to_string())
        );
        assert_eq!(
            parse("config max_daily_trades 2.5"),
            Malformed("Value must be an integer.".to_string())
        );
        assert_eq!(
            parse("config slippage 1"),
            Malformed("Parameter 'slippage' not recognized.".to_string())
        );
    }

    #[test]
    fn auto_trading_accepts_the_bool_token_sets() {
        for token in ["true", "1", "yes", "ON"] {
            assert_eq!(
                parse(&format!("config auto_trading {token}")),
                Cmd(Command::Config(ConfigUpdate::AutoTrading(true)))
            );
        }
        for token in ["false", "0", "no", "Off"] {
            assert_eq!(
                parse(&format!("config auto_trading {token}")),
                Cmd(Command::Config(ConfigUpdate::AutoTrading(false)))
            );
        }
        assert_eq!(
            parse("config auto_trading maybe"),
            Malformed("Invalid value. Use 'true' or 'false'.".to_string())
        );
    }

    #[test]
    fn free_text_falls_through_to_the_conversational_layer() {
        assert_eq!(parse("what is arbitrage?"), Fallback);
        assert_eq!(parse(""), Fallback);
        assert_eq!(parse("scan now please"), Fallback);
    }

    #[tokio::test]
    async fn auto_trading_round_trips_through_dispatch() {
        let mut session = offline_session();
        let on = dispatch(
            Command::Config(ConfigUpdate::AutoTrading(true)),
            &mut session,
        )
        .await;
        assert_eq!(on, "Auto-trading ENABLED");
        assert!(session.trading.auto_trading);

        let off = dispatch(
            Command::Config(ConfigUpdate::AutoTrading(false)),
            &mut session,
        )
        .await;
        assert_eq!(off, "Auto-trading DISABLED");
        assert!(!session.trading.auto_trading);
    }

    #[tokio::test]
    async fn invalid_auto_trading_token_leaves_the_flag_unchanged() {
        let mut session = offline_session();
        let before = session.trading.auto_trading;
        match parse("config auto_trading maybe") {
            Malformed(msg) => assert!(msg.contains("Invalid value")),
            other => panic!("expected Malformed, got {other:?}"),
        }
        assert_eq!(session.trading.auto_trading, before);
    }

    #[tokio::test]
    async fn monitor_over_the_cap_is_rejected_without_polling() {
        let mut session = offline_session();
        let response = dispatch(
            Command::Monitor {
                pair: "BTC-USDT".to_string(),
                seconds: 400,
            },
            &mut session,
        )
        .await;
        assert!(response.contains("maximum time of 300 seconds"));
        // Rejected before the loop: nothing was fetched.
        assert!(session.feed.last_update().is_none());
    }

    #[tokio::test]
    async fn monitor_on_an_unknown_pair_suggests_alternatives() {
        let mut session = offline_session();
        let response = dispatch(
            Command::Monitor {
                pair: "BTC-EUR".to_string(),
                seconds: 30,
            },
            &mut session,
        )
        .await;
        assert!(response.contains("Pair not recognized"));
        assert!(response.contains("BTC-USDT"));
    }

    #[tokio::test]
    async fn dashboard_handles_unknown_pairs_gracefully() {
        let mut session = offline_session();
        let response = dispatch(
            Command::Dashboard {
                pair: "DOGE-USDT".to_string(),
            },
            &mut session,
        )
        .await;
        assert!(response.contains("Pair not recognized"));
    }

    #[tokio::test]
    async fn dashboard_renders_the_full_board_offline() {
        let mut session = offline_session();
        let response = dispatch(
            Command::Dashboard {
                pair: "BTC-USDT".to_string(),
            },
            &mut session,
        )
        .await;
        assert!(response.contains("DASHBOARD: BTC-USDT"));
        assert!(response.contains("EXCHANGE RANKING BY PRICE"));
        assert!(response.contains("VARIATION STATISTICS"));
    }

    #[tokio::test]
    async fn status_reflects_trading_config() {
        let mut session = offline_session();
        session.trading.min_profit_pct = 2.5;
        let response = dispatch(Command::Status, &mut session).await;
        assert!(response.contains("Minimum profit percentage: 2.5%"));
        assert!(response.contains("Trades today: 0/10"));
        assert!(response.contains("not configured"));
    }
}
