use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Order direction sent to the venue.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Side {
    Buy,
    Sell,
}

impl Side {
    pub fn as_str(self) -> &'static str {
        match self {
            Side::Buy => "buy",
            Side::Sell => "sell",
        }
    }
}

/// Directional signal produced by the evaluator each cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Signal {
    Long,
    Short,
    None,
}

/// Side of an open position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PosSide {
    Long,
    Short,
}

impl PosSide {
    /// Order side that opens a position on this side.
    pub fn entry_side(self) -> Side {
        match self {
            PosSide::Long => Side::Buy,
            PosSide::Short => Side::Sell,
        }
    }

    /// Order side that closes a position on this side.
    pub fn exit_side(self) -> Side {
        match self {
            PosSide::Long => Side::Sell,
            PosSide::Short => Side::Buy,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            PosSide::Long => "LONG",
            PosSide::Short => "SHORT",
        }
    }
}

/// A single OHLCV bar, timestamp in epoch milliseconds.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Candle {
    pub ts: i64,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: f64,
}

/// Per-cycle bundle of computed indicator values from both timeframes.
///
/// A field whose indicator has not passed its warm-up window is `f64::NAN`;
/// the evaluator treats any non-finite field as "no signal".
#[derive(Debug, Clone, Copy)]
pub struct IndicatorSnapshot {
    pub ema9: f64,
    pub ema20: f64,
    pub rsi: f64,
    pub last_volume: f64,
    pub volume_ma: f64,
    pub long_ema50: f64,
    pub long_close: f64,
}

impl IndicatorSnapshot {
    /// True when every field is a usable finite number.
    pub fn is_complete(&self) -> bool {
        [
            self.ema9,
            self.ema20,
            self.rsi,
            self.last_volume,
            self.volume_ma,
            self.long_ema50,
            self.long_close,
        ]
        .iter()
        .all(|v| v.is_finite())
    }
}

/// An open position. Entry price and time exist exactly as long as the
/// position does; closing drops the whole value.
#[derive(Debug, Clone, Copy)]
pub struct OpenPosition {
    pub side: PosSide,
    pub entry_price: f64,
    pub entry_time: DateTime<Utc>,
}

impl OpenPosition {
    /// Unrealized profit in percent of the entry price.
    pub fn profit_pct(&self, current_price: f64) -> f64 {
        match self.side {
            PosSide::Long => (current_price - self.entry_price) / self.entry_price * 100.0,
            PosSide::Short => (self.entry_price - current_price) / self.entry_price * 100.0,
        }
    }
}

/// Request for a market order, executed by the venue adapter.
#[derive(Debug, Clone, PartialEq)]
pub struct OrderIntent {
    pub symbol: String,
    pub side: Side,
    pub quantity: f64,
    pub reference_price: f64,
}

/// One row of the CSV trade ledger.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TradeRecord {
    pub timestamp: DateTime<Utc>,
    pub side: Side,
    pub amount: f64,
    pub price: f64,
    pub order_id: String,
    pub note: String,
}

/// Placeholder order id used until a live fill reports the real one, and
/// kept as-is in paper-trading mode.
pub const SIMULATED_ORDER_ID: &str = "SIMULATED";

/// Action the engine asks its collaborators to perform, in execution order.
#[derive(Debug, Clone)]
pub enum Intent {
    PlaceOrder(OrderIntent),
    Notify(String),
    LogTrade(TradeRecord),
}
