use anyhow::Result;
use arb_scout::commands::{self, ParseOutcome};
use arb_scout::session::Session;
use arb_scout::{config, render, utils};
use tokio::io::{AsyncBufReadExt, BufReader};

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    utils::init_logging();

    // Configuration
    let feed_cfg = config::FeedConfig::load();
    tracing::info!(
        cache_secs = feed_cfg.cache_secs,
        api_key_set = !feed_cfg.api_key.is_empty(),
        pairs = config::TRADING_PAIRS.len(),
        exchanges = config::EXCHANGES.len(),
        "[INIT] arb-scout starting"
    );

    let mut session = Session::new(&feed_cfg)?;
    println!("{}", render::welcome());

    // Command loop -------------------------------------------------------
    // One command per line, fully handled before the next line is read.
    // Every turn ends with a response; EOF on stdin ends the session.
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        if line.trim().is_empty() {
            continue;
        }
        let response = match commands::parse(&line) {
            ParseOutcome::Command(command) => commands::dispatch(command, &mut session).await,
            ParseOutcome::Malformed(message) => message,
            ParseOutcome::Fallback => render::fallback_hint().to_string(),
        };
        println!("{response}\n");
    }

    tracing::info!("[EXIT] input closed, shutting down");
    Ok(())
}
