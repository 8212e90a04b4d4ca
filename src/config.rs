/// config.rs — Centralised configuration loaded from .env
///
/// All parameters consumed by the bot are defined here. Loading happens once
/// at startup; every module borrows &AppConfig. A broken configuration is the
/// only error that may terminate the process.
use anyhow::{bail, Context, Result};
use std::collections::HashMap;
use std::env;
use std::time::Duration;

/// OKX minimum contract size for BTC-USDT-SWAP; override per deployment.
pub const DEFAULT_MIN_ORDER_AMOUNT: f64 = 0.01;

#[derive(Debug, Clone)]
pub struct AppConfig {
    // ── OKX credentials ──────────────────────────────────────────────
    pub api_key: String,
    pub api_secret: String,
    pub api_passphrase: String,

    // ── REST endpoint ────────────────────────────────────────────────
    pub rest_url: String,

    // ── Trading universe ─────────────────────────────────────────────
    pub symbols: Vec<String>,

    // ── Timeframes and data depth ────────────────────────────────────
    /// Short timeframe for entry signals (e.g. "15m")
    pub tf_short: String,
    /// Long timeframe for the trend filter (e.g. "4h")
    pub tf_long: String,
    /// Candles fetched per timeframe per cycle
    pub candle_limit: usize,

    // ── Execution ────────────────────────────────────────────────────
    /// Delay between cycles of one symbol worker
    pub loop_delay: Duration,
    /// When true, orders are simulated and logged instead of placed
    pub paper_trading: bool,

    // ── Sizing and risk ──────────────────────────────────────────────
    /// Margin committed per trade, in quote currency (USDT)
    pub fixed_margin_amount: f64,
    /// Exchange minimum order size; computed quantities clamp up to this
    pub min_order_amount: f64,
    pub leverage_table: HashMap<String, u32>,
    pub default_leverage: u32,

    // ── Exit thresholds ──────────────────────────────────────────────
    /// Unrealized profit (percent) that forces a close. Positive.
    pub take_profit_pct: f64,
    /// Unrealized loss (percent) that forces a close. Negative.
    pub stop_loss_pct: f64,

    // ── Telegram ─────────────────────────────────────────────────────
    pub telegram_token: String,
    pub telegram_chat_ids: Vec<i64>,

    // ── Trade ledger ─────────────────────────────────────────────────
    pub trade_log_path: String,
}

impl AppConfig {
    /// Load configuration from environment variables (after dotenv).
    pub fn from_env() -> Result<Self> {
        dotenv::dotenv().ok(); // ignore missing .env

        let api_key = env::var("OKX_API_KEY").unwrap_or_default();
        let api_secret = env::var("OKX_API_SECRET").unwrap_or_default();
        let api_passphrase = env::var("OKX_API_PASSPHRASE").unwrap_or_default();

        let rest_url =
            env::var("OKX_REST_URL").unwrap_or_else(|_| "https://www.okx.com".into());

        let symbols: Vec<String> = env::var("SYMBOLS")
            .unwrap_or_else(|_| "BTC-USDT-SWAP".into())
            .split(',')
            .map(|s| s.trim().to_owned())
            .filter(|s| !s.is_empty())
            .collect();

        let leverage_table = parse_leverage_table(
            &env::var("LEVERAGE_TABLE").unwrap_or_else(|_| "BTC-USDT-SWAP:40,ETH-USDT-SWAP:25".into()),
        )?;

        let telegram_chat_ids = parse_chat_ids(
            &env::var("TELEGRAM_CHAT_IDS").unwrap_or_default(),
        )?;

        let cfg = Self {
            api_key,
            api_secret,
            api_passphrase,
            rest_url,
            symbols,

            tf_short: env::var("TF_SHORT").unwrap_or_else(|_| "15m".into()),
            tf_long: env::var("TF_LONG").unwrap_or_else(|_| "4h".into()),
            candle_limit: parse_env("CANDLE_LIMIT", 400usize)?,

            loop_delay: Duration::from_secs(parse_env("LOOP_DELAY_SECS", 10u64)?),
            paper_trading: env::var("PAPER_TRADING")
                .unwrap_or_else(|_| "true".into())
                .to_lowercase()
                == "true",

            fixed_margin_amount: parse_env("FIXED_MARGIN_AMOUNT", 100.0)?,
            min_order_amount: parse_env("MIN_ORDER_AMOUNT", DEFAULT_MIN_ORDER_AMOUNT)?,
            leverage_table,
            default_leverage: parse_env::<u32>("DEFAULT_LEVERAGE", 40)?,

            take_profit_pct: parse_env("TAKE_PROFIT_PCT", 15.0)?,
            stop_loss_pct: parse_env("STOP_LOSS_PCT", -30.0)?,

            telegram_token: env::var("TELEGRAM_TOKEN").unwrap_or_default(),
            telegram_chat_ids,

            trade_log_path: env::var("TRADE_LOG_PATH").unwrap_or_else(|_| "trades.csv".into()),
        };
        cfg.validate()?;
        Ok(cfg)
    }

    /// Leverage for a symbol, falling back to the default when unlisted.
    pub fn leverage(&self, symbol: &str) -> u32 {
        self.leverage_table
            .get(symbol)
            .copied()
            .unwrap_or(self.default_leverage)
    }

    /// Reject configurations the engine cannot run on. Called once at
    /// startup; failures here are fatal.
    pub fn validate(&self) -> Result<()> {
        if self.symbols.is_empty() {
            bail!("SYMBOLS is empty — nothing to trade");
        }
        if self.fixed_margin_amount <= 0.0 {
            bail!("FIXED_MARGIN_AMOUNT must be positive, got {}", self.fixed_margin_amount);
        }
        if self.min_order_amount <= 0.0 {
            bail!("MIN_ORDER_AMOUNT must be positive, got {}", self.min_order_amount);
        }
        if self.default_leverage == 0 {
            bail!("DEFAULT_LEVERAGE must be at least 1");
        }
        if let Some((sym, lev)) = self.leverage_table.iter().find(|(_, lev)| **lev == 0) {
            bail!("leverage for {} must be at least 1, got {}", sym, lev);
        }
        if self.take_profit_pct <= 0.0 {
            bail!("TAKE_PROFIT_PCT must be positive, got {}", self.take_profit_pct);
        }
        if self.stop_loss_pct >= 0.0 {
            bail!("STOP_LOSS_PCT must be negative, got {}", self.stop_loss_pct);
        }
        if self.candle_limit < 60 {
            // long-timeframe EMA(50) needs headroom past its warm-up
            bail!("CANDLE_LIMIT must be at least 60, got {}", self.candle_limit);
        }
        Ok(())
    }
}

/// Parse "SYM:lev,SYM:lev" into a leverage table.
fn parse_leverage_table(raw: &str) -> Result<HashMap<String, u32>> {
    let mut table = HashMap::new();
    for entry in raw.split(',').map(str::trim).filter(|e| !e.is_empty()) {
        let (sym, lev) = entry
            .split_once(':')
            .with_context(|| format!("LEVERAGE_TABLE entry '{entry}' is not SYMBOL:LEVERAGE"))?;
        let lev: u32 = lev
            .trim()
            .parse()
            .with_context(|| format!("LEVERAGE_TABLE leverage in '{entry}'"))?;
        table.insert(sym.trim().to_owned(), lev);
    }
    Ok(table)
}

fn parse_chat_ids(raw: &str) -> Result<Vec<i64>> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|s| {
            s.parse::<i64>()
                .with_context(|| format!("TELEGRAM_CHAT_IDS entry '{s}'"))
        })
        .collect()
}

fn parse_env<T>(key: &str, default: T) -> Result<T>
where
    T: std::str::FromStr + Copy,
    T::Err: std::fmt::Display,
{
    match env::var(key) {
        Ok(v) => v
            .parse::<T>()
            .map_err(|e| anyhow::anyhow!("Config key {key}: {e}")),
        Err(_) => Ok(default),
    }
}

/// Baseline configuration for unit tests across the crate.
#[cfg(test)]
pub(crate) fn test_config() -> AppConfig {
    AppConfig {
        api_key: String::new(),
        api_secret: String::new(),
        api_passphrase: String::new(),
        rest_url: "https://www.okx.com".into(),
        symbols: vec!["BTC-USDT-SWAP".into()],
        tf_short: "15m".into(),
        tf_long: "4h".into(),
        candle_limit: 400,
        loop_delay: Duration::from_secs(10),
        paper_trading: true,
        fixed_margin_amount: 100.0,
        min_order_amount: 0.01,
        leverage_table: HashMap::from([
            ("BTC-USDT-SWAP".into(), 40),
            ("ETH-USDT-SWAP".into(), 25),
        ]),
        default_leverage: 40,
        take_profit_pct: 15.0,
        stop_loss_pct: -30.0,
        telegram_token: String::new(),
        telegram_chat_ids: vec![],
        trade_log_path: "trades.csv".into(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base_config() -> AppConfig {
        test_config()
    }

    #[test]
    fn leverage_lookup_falls_back_to_default() {
        let cfg = base_config();
        assert_eq!(cfg.leverage("ETH-USDT-SWAP"), 25);
        assert_eq!(cfg.leverage("SOL-USDT-SWAP"), 40);
    }

    #[test]
    fn parses_leverage_table() {
        let table = parse_leverage_table("BTC-USDT-SWAP:40, ETH-USDT-SWAP:25").unwrap();
        assert_eq!(table["BTC-USDT-SWAP"], 40);
        assert_eq!(table["ETH-USDT-SWAP"], 25);
        assert!(parse_leverage_table("BTC-USDT-SWAP=40").is_err());
    }

    #[test]
    fn rejects_non_negative_stop_loss() {
        let mut cfg = base_config();
        cfg.stop_loss_pct = 5.0;
        assert!(cfg.validate().is_err());
        cfg.stop_loss_pct = 0.0;
        assert!(cfg.validate().is_err());
        cfg.stop_loss_pct = -30.0;
        assert!(cfg.validate().is_ok());
    }

    #[test]
    fn rejects_empty_symbol_list() {
        let mut cfg = base_config();
        cfg.symbols.clear();
        assert!(cfg.validate().is_err());
    }
}
