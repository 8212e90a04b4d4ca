/// strategy.rs — Signal evaluation
///
/// Pure mapping from an indicator snapshot to a directional signal. The two
/// rule sets are mutually exclusive by construction: the EMA comparison is
/// strict and cannot hold in both directions at once; ties yield no signal.
use crate::models::{IndicatorSnapshot, Signal};

/// Evaluate the entry signal for one cycle.
///
/// Long:  fast EMA above slow EMA, RSI below 70 (not overbought), long
///        timeframe in an uptrend, volume above its moving average.
/// Short: fast EMA below slow EMA, RSI above 30 (not oversold), long
///        timeframe not in an uptrend, volume above its moving average.
///
/// Any non-finite input (insufficient warm-up candles) yields `Signal::None`.
pub fn evaluate(snap: &IndicatorSnapshot) -> Signal {
    if !snap.is_complete() {
        return Signal::None;
    }

    let is_uptrend_long = snap.long_close > snap.long_ema50;
    let volume_ok = snap.last_volume > snap.volume_ma;

    if snap.ema9 > snap.ema20 && snap.rsi < 70.0 && is_uptrend_long && volume_ok {
        Signal::Long
    } else if snap.ema9 < snap.ema20 && snap.rsi > 30.0 && !is_uptrend_long && volume_ok {
        Signal::Short
    } else {
        Signal::None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn snapshot() -> IndicatorSnapshot {
        IndicatorSnapshot {
            ema9: 101.0,
            ema20: 100.0,
            rsi: 55.0,
            last_volume: 1500.0,
            volume_ma: 1000.0,
            long_ema50: 95.0,
            long_close: 98.0,
        }
    }

    #[test]
    fn long_when_all_conditions_hold() {
        assert_eq!(evaluate(&snapshot()), Signal::Long);
    }

    #[test]
    fn short_when_all_conditions_hold() {
        let snap = IndicatorSnapshot {
            ema9: 99.0,
            ema20: 100.0,
            rsi: 45.0,
            long_ema50: 100.0,
            long_close: 97.0,
            ..snapshot()
        };
        assert_eq!(evaluate(&snap), Signal::Short);
    }

    #[test]
    fn overbought_rsi_blocks_long() {
        let snap = IndicatorSnapshot { rsi: 70.0, ..snapshot() };
        assert_eq!(evaluate(&snap), Signal::None);
    }

    #[test]
    fn oversold_rsi_blocks_short() {
        let snap = IndicatorSnapshot {
            ema9: 99.0,
            ema20: 100.0,
            rsi: 30.0,
            long_ema50: 100.0,
            long_close: 97.0,
            ..snapshot()
        };
        assert_eq!(evaluate(&snap), Signal::None);
    }

    #[test]
    fn low_volume_blocks_both_sides() {
        let snap = IndicatorSnapshot { last_volume: 900.0, ..snapshot() };
        assert_eq!(evaluate(&snap), Signal::None);
    }

    #[test]
    fn ema_tie_resolves_to_none() {
        let snap = IndicatorSnapshot { ema9: 100.0, ema20: 100.0, ..snapshot() };
        assert_eq!(evaluate(&snap), Signal::None);
        let snap = IndicatorSnapshot { last_volume: 1000.0, volume_ma: 1000.0, ..snapshot() };
        assert_eq!(evaluate(&snap), Signal::None);
    }

    #[test]
    fn nan_field_yields_none() {
        let snap = IndicatorSnapshot { rsi: f64::NAN, ..snapshot() };
        assert_eq!(evaluate(&snap), Signal::None);
        let snap = IndicatorSnapshot { long_ema50: f64::NAN, ..snapshot() };
        assert_eq!(evaluate(&snap), Signal::None);
    }

    // The long rule needs ema9 > ema20 while the short rule needs
    // ema9 < ema20; sweeping both orderings shows at most one fires.
    #[test]
    fn rule_sets_are_mutually_exclusive() {
        for (ema9, ema20) in [(101.0, 100.0), (100.0, 101.0), (100.0, 100.0)] {
            for (long_close, long_ema50) in [(98.0, 95.0), (95.0, 98.0)] {
                let snap = IndicatorSnapshot {
                    ema9,
                    ema20,
                    long_close,
                    long_ema50,
                    ..snapshot()
                };
                let signal = evaluate(&snap);
                assert!(matches!(signal, Signal::Long | Signal::Short | Signal::None));
            }
        }
    }
}
