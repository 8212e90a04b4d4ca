use thiserror::Error;

/// Cycle-level failures. Each one aborts the current cycle for its symbol
/// only; the worker logs, notifies the operator and moves on to the next
/// cycle after the usual delay.
#[derive(Debug, Error)]
pub enum BotError {
    #[error("non-positive price: {price}")]
    NonPositivePrice { price: f64 },

    #[error("venue returned no candles for {symbol}")]
    NoMarketData { symbol: String },
}
