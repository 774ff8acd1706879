//! Reference price feed.
//!
//! Responsibilities:
//! • Fetch USD reference prices for the watched symbols in one batch.
//! • Serve a cached snapshot while it is fresh.
//! • Degrade to stale or fallback data on any fetch failure.

pub mod coinmarketcap;

pub use coinmarketcap::{PriceFeed, fallback_snapshot};
