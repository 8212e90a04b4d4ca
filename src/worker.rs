/// worker.rs — Per-symbol cycle driver
///
/// One worker per traded symbol, each an independent sequential loop:
/// fetch candles on both timeframes, build the indicator snapshot, evaluate
/// the signal, run the lifecycle engine, execute its intents, sleep.
/// Workers share nothing mutable; a failed cycle for one symbol is logged,
/// notified and retried next cycle without touching the others.
use anyhow::Result;
use chrono::Utc;
use std::sync::Arc;
use tokio::time::sleep;
use tracing::{debug, error, info, warn};

use crate::config::AppConfig;
use crate::engine::PositionEngine;
use crate::error::BotError;
use crate::indicators::build_snapshot;
use crate::models::{Intent, SIMULATED_ORDER_ID};
use crate::notify::Notifier;
use crate::strategy;
use crate::trade_log::TradeLogger;
use crate::venue::Venue;

pub struct SymbolWorker {
    symbol: String,
    cfg: Arc<AppConfig>,
    venue: Arc<dyn Venue>,
    notifier: Arc<dyn Notifier>,
    engine: PositionEngine,
    ledger: TradeLogger,
}

impl SymbolWorker {
    pub fn new(
        symbol: String,
        cfg: Arc<AppConfig>,
        venue: Arc<dyn Venue>,
        notifier: Arc<dyn Notifier>,
    ) -> Result<Self> {
        let ledger = TradeLogger::new(&cfg.trade_log_path)?;
        let engine = PositionEngine::new(symbol.clone(), cfg.clone());
        Ok(Self {
            symbol,
            cfg,
            venue,
            notifier,
            engine,
            ledger,
        })
    }

    /// Run forever. Only whole-process shutdown stops a worker.
    pub async fn run(mut self) {
        self.notifier
            .alert(&format!(
                "Bot started at {} for {}.",
                Utc::now().format("%Y-%m-%d %H:%M:%S"),
                self.symbol
            ))
            .await;

        loop {
            if let Err(e) = self.cycle().await {
                error!(symbol = %self.symbol, "cycle failed: {e:#}");
                self.notifier
                    .alert(&format!("Error in bot cycle for {}: {e:#}", self.symbol))
                    .await;
            }
            sleep(self.cfg.loop_delay).await;
        }
    }

    async fn cycle(&mut self) -> Result<()> {
        let short = self
            .venue
            .fetch_candles(&self.symbol, &self.cfg.tf_short, self.cfg.candle_limit)
            .await?;
        let long = self
            .venue
            .fetch_candles(&self.symbol, &self.cfg.tf_long, self.cfg.candle_limit)
            .await?;

        let latest_price = short
            .last()
            .map(|c| c.close)
            .ok_or_else(|| BotError::NoMarketData {
                symbol: self.symbol.clone(),
            })?;

        let snapshot = build_snapshot(&short, &long);
        let signal = strategy::evaluate(&snapshot);
        debug!(
            symbol = %self.symbol,
            ema9 = snapshot.ema9,
            ema20 = snapshot.ema20,
            rsi = snapshot.rsi,
            last_volume = snapshot.last_volume,
            volume_ma = snapshot.volume_ma,
            long_ema50 = snapshot.long_ema50,
            long_close = snapshot.long_close,
            "indicator values"
        );

        let intents = self.engine.step(signal, latest_price, Utc::now())?;
        if intents.is_empty() {
            // observability only: no decision this cycle
            if let Some(pos) = &self.engine.position {
                info!(
                    symbol = %self.symbol,
                    side = pos.side.as_str(),
                    entry_price = pos.entry_price,
                    current_price = latest_price,
                    profit_pct = pos.profit_pct(latest_price),
                    "holding position"
                );
            } else {
                info!(symbol = %self.symbol, ?signal, price = latest_price, "no action");
            }
            return Ok(());
        }

        self.execute(intents).await;
        Ok(())
    }

    /// Execute intents in order. The engine has already committed its state
    /// transition; a rejected order is surfaced to the operator and never
    /// retried, and a trade that never reached the venue gets no ledger row.
    async fn execute(&mut self, intents: Vec<Intent>) {
        let mut order_id: Option<String> = None;
        let mut order_failed = false;

        for intent in intents {
            match intent {
                Intent::Notify(message) => {
                    info!(symbol = %self.symbol, "{message}");
                    self.notifier.alert(&message).await;
                }
                Intent::PlaceOrder(order) => {
                    if self.cfg.paper_trading {
                        info!(symbol = %self.symbol, "paper trading — order simulated");
                        order_id = Some(SIMULATED_ORDER_ID.to_owned());
                        continue;
                    }
                    match self.venue.place_market_order(&order).await {
                        Ok(id) => order_id = Some(id),
                        Err(e) => {
                            order_failed = true;
                            error!(symbol = %self.symbol, "order placement failed: {e:#}");
                            self.notifier
                                .alert(&format!("[ERROR PLACING ORDER] {e:#}"))
                                .await;
                        }
                    }
                }
                Intent::LogTrade(mut record) => {
                    if order_failed {
                        warn!(symbol = %self.symbol, "skipping ledger row for unplaced order");
                        continue;
                    }
                    if let Some(id) = &order_id {
                        record.order_id = id.clone();
                    }
                    if let Err(e) = self.ledger.append(&record) {
                        error!(symbol = %self.symbol, "trade log append failed: {e:#}");
                    }
                }
            }
        }
    }
}
