//! Miscellaneous helper utilities.

use chrono::{DateTime, Utc};
use tracing_subscriber::{EnvFilter, fmt};

/// Initialize `tracing` subscriber with env-based filter.
///
/// If `RUST_LOG` is not set, defaults to `info` level.
pub fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    fmt::Subscriber::builder()
        .with_env_filter(filter)
        .with_target(false)
        .without_time()
        .init();
}

/// Wall-clock rendering of an optional fetch timestamp, for transcript
/// footers.
pub fn format_clock(ts: Option<DateTime<Utc>>) -> String {
    match ts {
        Some(t) => t.format("%H:%M:%S").to_string(),
        None => "Not available".to_string(),
    }
}
