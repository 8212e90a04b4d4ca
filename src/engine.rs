/// engine.rs — Position lifecycle engine
///
/// One engine per symbol worker, owning that symbol's position exclusively.
/// `step` is the per-cycle transition function: it consumes the evaluated
/// signal and the latest price, decides enter/hold/exit, and returns the
/// intents (orders, notifications, ledger rows) for the worker to execute.
///
/// Transitions commit before any intent is executed. A rejected order does
/// not roll the state back: at-most-once, never retried, so a transient
/// venue error can never produce a duplicate order.
use chrono::{DateTime, Utc};
use std::sync::Arc;

use crate::config::AppConfig;
use crate::error::BotError;
use crate::models::{
    Intent, OpenPosition, OrderIntent, PosSide, Signal, TradeRecord, SIMULATED_ORDER_ID,
};
use crate::risk::position_size;

const TIME_FMT: &str = "%Y-%m-%d %H:%M:%S";

pub struct PositionEngine {
    symbol: String,
    cfg: Arc<AppConfig>,
    /// The single open position, if any. Entry price and time live inside
    /// the payload, so they are set and cleared atomically with the side.
    pub position: Option<OpenPosition>,
}

impl PositionEngine {
    pub fn new(symbol: impl Into<String>, cfg: Arc<AppConfig>) -> Self {
        Self {
            symbol: symbol.into(),
            cfg,
            position: None,
        }
    }

    /// Run one cycle. The exit check strictly precedes signal-driven entry:
    /// a cycle that closes a position never opens a new one, which keeps the
    /// profit accounting of the closed trade unambiguous.
    pub fn step(
        &mut self,
        signal: Signal,
        current_price: f64,
        now: DateTime<Utc>,
    ) -> Result<Vec<Intent>, BotError> {
        if !current_price.is_finite() || current_price <= 0.0 {
            return Err(BotError::NonPositivePrice { price: current_price });
        }

        if let Some(pos) = self.position {
            let profit_pct = pos.profit_pct(current_price);
            let hit_take_profit = profit_pct >= self.cfg.take_profit_pct;
            let hit_stop_loss = profit_pct <= self.cfg.stop_loss_pct;
            if hit_take_profit || hit_stop_loss {
                let intents = self.exit_intents(pos, current_price, now, profit_pct, hit_take_profit)?;
                self.position = None;
                return Ok(intents);
            }
            // inside thresholds: hold, no intents; the worker surfaces a
            // status line from `self.position` on its own
            return Ok(Vec::new());
        }

        let side = match signal {
            Signal::Long => PosSide::Long,
            Signal::Short => PosSide::Short,
            Signal::None => return Ok(Vec::new()),
        };
        let intents = self.entry_intents(side, current_price, now)?;
        self.position = Some(OpenPosition {
            side,
            entry_price: current_price,
            entry_time: now,
        });
        Ok(intents)
    }

    fn entry_intents(
        &self,
        side: PosSide,
        price: f64,
        now: DateTime<Utc>,
    ) -> Result<Vec<Intent>, BotError> {
        let quantity = position_size(&self.cfg, &self.symbol, price)?;
        let order_side = side.entry_side();
        Ok(vec![
            Intent::Notify(format!(
                "Signal received for {}: {} at price {:.4}",
                self.symbol,
                side.as_str(),
                price
            )),
            Intent::Notify(format!(
                "[ORDER] {} {:.6} {} at price {:.4}",
                order_side.as_str().to_uppercase(),
                quantity,
                self.symbol,
                price
            )),
            Intent::PlaceOrder(OrderIntent {
                symbol: self.symbol.clone(),
                side: order_side,
                quantity,
                reference_price: price,
            }),
            Intent::LogTrade(TradeRecord {
                timestamp: now,
                side: order_side,
                amount: quantity,
                price,
                order_id: SIMULATED_ORDER_ID.to_owned(),
                note: format!("{} entry", side.as_str()),
            }),
            Intent::Notify(format!(
                "Entered {} position for {}:\nTime: {}\nPrice: {:.4}\nPosition size: {:.6}",
                side.as_str(),
                self.symbol,
                now.format(TIME_FMT),
                price,
                quantity
            )),
        ])
    }

    fn exit_intents(
        &self,
        pos: OpenPosition,
        price: f64,
        now: DateTime<Utc>,
        profit_pct: f64,
        hit_take_profit: bool,
    ) -> Result<Vec<Intent>, BotError> {
        let quantity = position_size(&self.cfg, &self.symbol, price)?;
        let order_side = pos.side.exit_side();
        let (reason, threshold) = if hit_take_profit {
            ("Take Profit", self.cfg.take_profit_pct)
        } else {
            ("Stop Loss", self.cfg.stop_loss_pct)
        };
        Ok(vec![
            Intent::Notify(format!(
                "{} reached ({}%) for {}. Exiting position.",
                reason, threshold, self.symbol
            )),
            Intent::Notify(format!(
                "[ORDER] {} {:.6} {} at price {:.4}",
                order_side.as_str().to_uppercase(),
                quantity,
                self.symbol,
                price
            )),
            Intent::PlaceOrder(OrderIntent {
                symbol: self.symbol.clone(),
                side: order_side,
                quantity,
                reference_price: price,
            }),
            Intent::LogTrade(TradeRecord {
                timestamp: now,
                side: order_side,
                amount: quantity,
                price,
                order_id: SIMULATED_ORDER_ID.to_owned(),
                note: format!("{} exit ({:+.2}%)", reason.to_lowercase(), profit_pct),
            }),
            Intent::Notify(format!(
                "Exited position for {}:\nEntry: {} at {:.4}\nExit: {} at {:.4}\nProfit: {:.2}%",
                self.symbol,
                pos.entry_time.format(TIME_FMT),
                pos.entry_price,
                now.format(TIME_FMT),
                price,
                profit_pct
            )),
        ])
    }
}
