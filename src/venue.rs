/// venue.rs — Exchange capability interface
///
/// The engine's only view of a trading venue. Adapters implement this per
/// exchange and are injected into the worker at construction; nothing in the
/// core selects a venue by name at runtime.
use anyhow::Result;
use async_trait::async_trait;

use crate::models::{Candle, OrderIntent};

#[async_trait]
pub trait Venue: Send + Sync {
    /// Fetch up to `limit` candles for `inst_id` at timeframe `bar`,
    /// oldest first. The latest close doubles as the cycle's price tick.
    async fn fetch_candles(&self, inst_id: &str, bar: &str, limit: usize) -> Result<Vec<Candle>>;

    /// Place a market order and return the venue's order id.
    async fn place_market_order(&self, intent: &OrderIntent) -> Result<String>;

    /// Set isolated-margin leverage for a symbol (once, before trading).
    async fn set_leverage(&self, inst_id: &str, leverage: u32) -> Result<()>;
}
