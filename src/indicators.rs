/// indicators.rs — Indicator snapshot builder
///
/// Feeds candle history through streaming `ta` indicators and extracts the
/// latest value of each. An indicator that has not seen enough bars to pass
/// its warm-up window reports `f64::NAN`; the evaluator turns any non-finite
/// field into "no signal" instead of comparing against garbage.
use ta::indicators::{ExponentialMovingAverage, RelativeStrengthIndex, SimpleMovingAverage};
use ta::Next;

use crate::models::{Candle, IndicatorSnapshot};

pub const EMA_FAST_PERIOD: usize = 9;
pub const EMA_SLOW_PERIOD: usize = 20;
pub const RSI_PERIOD: usize = 14;
pub const VOLUME_MA_PERIOD: usize = 20;
pub const TREND_EMA_PERIOD: usize = 50;

/// Latest EMA over `values`, NAN until `period` inputs have been seen.
fn last_ema(values: &[f64], period: usize) -> f64 {
    if values.len() < period {
        return f64::NAN;
    }
    let mut ema = ExponentialMovingAverage::new(period).expect("EMA period is non-zero");
    values.iter().fold(f64::NAN, |_, &v| ema.next(v))
}

/// Latest RSI over `values`. RSI needs period+1 inputs before its first
/// meaningful output.
fn last_rsi(values: &[f64], period: usize) -> f64 {
    if values.len() < period + 1 {
        return f64::NAN;
    }
    let mut rsi = RelativeStrengthIndex::new(period).expect("RSI period is non-zero");
    values.iter().fold(f64::NAN, |_, &v| rsi.next(v))
}

/// Latest simple moving average over `values`, NAN until the window fills.
fn last_sma(values: &[f64], period: usize) -> f64 {
    if values.len() < period {
        return f64::NAN;
    }
    let mut sma = SimpleMovingAverage::new(period).expect("SMA period is non-zero");
    values.iter().fold(f64::NAN, |_, &v| sma.next(v))
}

/// Build the per-cycle snapshot from short- and long-timeframe candle
/// history (both chronological, oldest first).
pub fn build_snapshot(short: &[Candle], long: &[Candle]) -> IndicatorSnapshot {
    let short_closes: Vec<f64> = short.iter().map(|c| c.close).collect();
    let short_volumes: Vec<f64> = short.iter().map(|c| c.volume).collect();
    let long_closes: Vec<f64> = long.iter().map(|c| c.close).collect();

    IndicatorSnapshot {
        ema9: last_ema(&short_closes, EMA_FAST_PERIOD),
        ema20: last_ema(&short_closes, EMA_SLOW_PERIOD),
        rsi: last_rsi(&short_closes, RSI_PERIOD),
        last_volume: short_volumes.last().copied().unwrap_or(f64::NAN),
        volume_ma: last_sma(&short_volumes, VOLUME_MA_PERIOD),
        long_ema50: last_ema(&long_closes, TREND_EMA_PERIOD),
        long_close: long_closes.last().copied().unwrap_or(f64::NAN),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn candles(closes: &[f64]) -> Vec<Candle> {
        closes
            .iter()
            .enumerate()
            .map(|(i, &close)| Candle {
                ts: i as i64 * 60_000,
                open: close,
                high: close,
                low: close,
                close,
                volume: 1000.0 + i as f64,
            })
            .collect()
    }

    #[test]
    fn snapshot_is_nan_before_warmup() {
        let short = candles(&[100.0, 101.0, 102.0]);
        let long = candles(&[100.0, 101.0]);
        let snap = build_snapshot(&short, &long);
        assert!(snap.ema9.is_nan());
        assert!(snap.rsi.is_nan());
        assert!(snap.volume_ma.is_nan());
        assert!(snap.long_ema50.is_nan());
        assert!(!snap.is_complete());
    }

    #[test]
    fn snapshot_is_complete_with_enough_history() {
        let closes: Vec<f64> = (0..80).map(|i| 100.0 + (i as f64) * 0.1).collect();
        let short = candles(&closes);
        let long = candles(&closes);
        let snap = build_snapshot(&short, &long);
        assert!(snap.is_complete(), "snapshot: {snap:?}");
        // steadily rising closes: fast EMA above slow EMA, price above trend EMA
        assert!(snap.ema9 > snap.ema20);
        assert!(snap.long_close > snap.long_ema50);
        assert_eq!(snap.last_volume, 1079.0);
    }

    #[test]
    fn empty_history_yields_incomplete_snapshot() {
        let snap = build_snapshot(&[], &[]);
        assert!(!snap.is_complete());
        assert!(snap.last_volume.is_nan());
        assert!(snap.long_close.is_nan());
    }
}
