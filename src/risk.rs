/// risk.rs — Position sizing
///
/// Fixed-margin sizing: a constant margin amount times the symbol's leverage,
/// divided by the current price. Quantities below the exchange minimum clamp
/// up to it, which means the effective margin can exceed the nominal fixed
/// amount on very high-priced instruments.
use tracing::warn;

use crate::config::AppConfig;
use crate::error::BotError;

/// Order quantity in base asset for one trade of `symbol` at `price`.
///
/// A non-positive or non-finite price is a caller contract violation and
/// fails the cycle; it is never retried.
pub fn position_size(cfg: &AppConfig, symbol: &str, price: f64) -> Result<f64, BotError> {
    if !price.is_finite() || price <= 0.0 {
        return Err(BotError::NonPositivePrice { price });
    }

    let leverage = cfg.leverage(symbol);
    let quantity = cfg.fixed_margin_amount * f64::from(leverage) / price;

    if quantity < cfg.min_order_amount {
        warn!(
            symbol,
            quantity,
            min = cfg.min_order_amount,
            "calculated order size below exchange minimum, clamping up"
        );
        return Ok(cfg.min_order_amount);
    }
    Ok(quantity)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::test_config as base_config;

    #[test]
    fn fixed_margin_times_leverage_over_price() {
        // margin 100, leverage 40, price 50000 -> 0.08, above the 0.01 minimum
        let cfg = base_config();
        let qty = position_size(&cfg, "BTC-USDT-SWAP", 50_000.0).unwrap();
        assert!((qty - 0.08).abs() < 1e-12);
    }

    #[test]
    fn clamps_up_to_minimum_order_amount() {
        // margin 100, leverage 1, price 500000 -> 0.0002, clamped to 0.01
        let mut cfg = base_config();
        cfg.leverage_table.clear();
        cfg.default_leverage = 1;
        let qty = position_size(&cfg, "BTC-USDT-SWAP", 500_000.0).unwrap();
        assert_eq!(qty, cfg.min_order_amount);
    }

    #[test]
    fn sized_quantity_never_below_minimum() {
        let cfg = base_config();
        for price in [0.5, 100.0, 50_000.0, 10_000_000.0] {
            let qty = position_size(&cfg, "BTC-USDT-SWAP", price).unwrap();
            assert!(qty >= cfg.min_order_amount, "price {price} gave {qty}");
        }
    }

    #[test]
    fn unlisted_symbol_uses_default_leverage() {
        let cfg = base_config();
        let qty = position_size(&cfg, "SOL-USDT-SWAP", 50_000.0).unwrap();
        assert!((qty - 0.08).abs() < 1e-12); // default leverage 40
        let qty = position_size(&cfg, "ETH-USDT-SWAP", 50_000.0).unwrap();
        assert!((qty - 0.05).abs() < 1e-12); // listed at 25
    }

    #[test]
    fn non_positive_price_fails_fast() {
        let cfg = base_config();
        assert!(matches!(
            position_size(&cfg, "BTC-USDT-SWAP", 0.0),
            Err(BotError::NonPositivePrice { .. })
        ));
        assert!(position_size(&cfg, "BTC-USDT-SWAP", -1.0).is_err());
        assert!(position_size(&cfg, "BTC-USDT-SWAP", f64::NAN).is_err());
    }
}
