/// main.rs — Live trading entry point
///
/// FLOW:
///   1. Load config from .env (OKX credentials, symbols, thresholds)
///   2. Build the venue and notifier adapters once, shared via Arc
///   3. Set isolated-margin leverage per symbol (live mode only)
///   4. Spawn one worker task per symbol; each polls, evaluates and trades
///      independently until the process is stopped
///
/// Only configuration and startup failures terminate the process; everything
/// after that is handled cycle-by-cycle inside the workers.
use anyhow::Result;
use std::sync::Arc;
use tokio::task::JoinSet;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use mtf_bot::config::AppConfig;
use mtf_bot::notify::{Notifier, TelegramNotifier};
use mtf_bot::okx::OkxClient;
use mtf_bot::venue::Venue;
use mtf_bot::worker::SymbolWorker;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cfg = Arc::new(AppConfig::from_env()?);

    info!("mtf_bot starting — {} symbol(s), TP {}% / SL {}%",
        cfg.symbols.len(), cfg.take_profit_pct, cfg.stop_loss_pct);
    if cfg.paper_trading {
        info!("paper trading active — orders are simulated");
    } else {
        warn!("LIVE MODE — real orders will be placed, check all parameters!");
    }

    let venue: Arc<dyn Venue> = Arc::new(OkxClient::new(&cfg));
    let notifier: Arc<dyn Notifier> = Arc::new(TelegramNotifier::new(&cfg));

    let mut workers = JoinSet::new();
    for symbol in &cfg.symbols {
        if !cfg.paper_trading {
            // leverage must be in place before the first order; failure
            // here is a startup error, not a cycle error
            venue.set_leverage(symbol, cfg.leverage(symbol)).await?;
        }
        let worker = SymbolWorker::new(
            symbol.clone(),
            cfg.clone(),
            venue.clone(),
            notifier.clone(),
        )?;
        info!(symbol = %symbol, "spawning worker");
        workers.spawn(worker.run());
    }

    // workers run forever; surface a panic if one ever dies
    while let Some(res) = workers.join_next().await {
        res?;
    }
    Ok(())
}
