/// okx.rs — OKX v5 REST venue adapter (USDT-margined perpetual swaps)
///
/// OKX SIGNED REQUEST FLOW:
///   1. Build the JSON body (or empty string for GET)
///   2. Concatenate timestamp + method + request path + body
///   3. Sign with HMAC-SHA256 using the API secret, base64-encode
///   4. Send with OK-ACCESS-KEY / SIGN / TIMESTAMP / PASSPHRASE headers
///
/// Market-data endpoints are public and unsigned. OKX returns candle rows
/// newest first; this adapter reverses them so callers always see
/// chronological order.
///
/// ORDER TYPES USED:
///   market, tdMode=isolated. posSide is `long` for buys and `short` for
///   sells, matching one-way entry/exit bookkeeping upstream.
use anyhow::{bail, Context, Result};
use async_trait::async_trait;
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;
use chrono::Utc;
use hmac::{Hmac, Mac};
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use sha2::Sha256;
use tracing::{error, info};

use crate::config::AppConfig;
use crate::models::{Candle, OrderIntent, Side};
use crate::venue::Venue;

type HmacSha256 = Hmac<Sha256>;

// ── Response types ────────────────────────────────────────────────────────

#[derive(Deserialize, Debug)]
struct OkxEnvelope<T> {
    code: String,
    msg: String,
    #[serde(default = "Vec::new")]
    data: Vec<T>,
}

#[derive(Deserialize, Debug)]
struct OkxOrderAck {
    #[serde(rename = "ordId")]
    ord_id: String,
    #[serde(rename = "sCode")]
    s_code: String,
    #[serde(rename = "sMsg", default)]
    s_msg: String,
}

// ── Client ────────────────────────────────────────────────────────────────

pub struct OkxClient {
    client: Client,
    api_key: String,
    api_secret: String,
    api_passphrase: String,
    base_url: String,
}

impl OkxClient {
    pub fn new(cfg: &AppConfig) -> Self {
        let client = Client::builder()
            .timeout(std::time::Duration::from_secs(10))
            .build()
            .expect("HTTP client build failed");
        Self {
            client,
            api_key: cfg.api_key.clone(),
            api_secret: cfg.api_secret.clone(),
            api_passphrase: cfg.api_passphrase.clone(),
            base_url: cfg.rest_url.clone(),
        }
    }

    /// Sign `timestamp + method + path + body` with HMAC-SHA256, base64.
    fn sign(&self, timestamp: &str, method: &str, path: &str, body: &str) -> String {
        let mut mac =
            HmacSha256::new_from_slice(self.api_secret.as_bytes()).expect("HMAC key error");
        mac.update(timestamp.as_bytes());
        mac.update(method.as_bytes());
        mac.update(path.as_bytes());
        mac.update(body.as_bytes());
        BASE64.encode(mac.finalize().into_bytes())
    }

    /// ISO-8601 timestamp with millisecond precision, as OKX requires.
    fn timestamp() -> String {
        Utc::now().format("%Y-%m-%dT%H:%M:%S%.3fZ").to_string()
    }

    async fn signed_post<T: for<'de> Deserialize<'de>>(
        &self,
        path: &str,
        body: serde_json::Value,
    ) -> Result<OkxEnvelope<T>> {
        let body_str = body.to_string();
        let ts = Self::timestamp();
        let signature = self.sign(&ts, "POST", path, &body_str);

        let url = format!("{}{}", self.base_url, path);
        let resp = self
            .client
            .post(&url)
            .header("OK-ACCESS-KEY", &self.api_key)
            .header("OK-ACCESS-SIGN", signature)
            .header("OK-ACCESS-TIMESTAMP", ts)
            .header("OK-ACCESS-PASSPHRASE", &self.api_passphrase)
            .header("Content-Type", "application/json")
            .body(body_str)
            .send()
            .await
            .with_context(|| format!("HTTP POST to {path} failed"))?;

        let status = resp.status();
        let text = resp.text().await.context("Failed to read response body")?;
        if status != StatusCode::OK {
            error!("HTTP {} from {} — body: {}", status, path, text);
            bail!("OKX request failed: HTTP {}", status);
        }

        let envelope: OkxEnvelope<T> =
            serde_json::from_str(&text).with_context(|| format!("Failed to parse {path} response"))?;
        if envelope.code != "0" {
            error!("OKX API error {}: {}", envelope.code, envelope.msg);
            bail!("OKX error {}: {}", envelope.code, envelope.msg);
        }
        Ok(envelope)
    }
}

#[async_trait]
impl Venue for OkxClient {
    async fn fetch_candles(&self, inst_id: &str, bar: &str, limit: usize) -> Result<Vec<Candle>> {
        let url = format!(
            "{}/api/v5/market/candles?instId={}&bar={}&limit={}",
            self.base_url,
            inst_id,
            okx_bar(bar),
            limit
        );
        let resp = self
            .client
            .get(&url)
            .send()
            .await
            .context("Candle request failed")?;
        let status = resp.status();
        let text = resp.text().await.context("Failed to read candle body")?;
        if status != StatusCode::OK {
            bail!("Candle request failed: HTTP {} — {}", status, text);
        }

        let envelope: OkxEnvelope<Vec<String>> =
            serde_json::from_str(&text).context("Failed to parse candle response")?;
        if envelope.code != "0" {
            bail!("OKX error {}: {}", envelope.code, envelope.msg);
        }

        let mut candles = envelope
            .data
            .iter()
            .map(|row| parse_candle(row))
            .collect::<Result<Vec<_>>>()?;
        // OKX serves newest first
        candles.reverse();
        Ok(candles)
    }

    async fn place_market_order(&self, intent: &OrderIntent) -> Result<String> {
        let pos_side = match intent.side {
            Side::Buy => "long",
            Side::Sell => "short",
        };
        let body = serde_json::json!({
            "instId": intent.symbol,
            "tdMode": "isolated",
            "side": intent.side.as_str(),
            "posSide": pos_side,
            "ordType": "market",
            "sz": format!("{:.6}", intent.quantity),
        });

        info!(
            "Placing {} {:.6} {} @ MARKET (ref price {:.4})",
            intent.side.as_str(),
            intent.quantity,
            intent.symbol,
            intent.reference_price
        );

        let envelope: OkxEnvelope<OkxOrderAck> =
            self.signed_post("/api/v5/trade/order", body).await?;
        let ack = envelope
            .data
            .into_iter()
            .next()
            .context("Order response carried no data")?;
        if ack.s_code != "0" {
            error!("OKX order rejected {}: {}", ack.s_code, ack.s_msg);
            bail!("Order rejected {}: {}", ack.s_code, ack.s_msg);
        }

        info!("Order accepted: id={}", ack.ord_id);
        Ok(ack.ord_id)
    }

    async fn set_leverage(&self, inst_id: &str, leverage: u32) -> Result<()> {
        let body = serde_json::json!({
            "instId": inst_id,
            "lever": leverage.to_string(),
            "mgnMode": "isolated",
        });
        let _: OkxEnvelope<serde_json::Value> =
            self.signed_post("/api/v5/account/set-leverage", body).await?;
        info!("Set leverage {}x for {}", leverage, inst_id);
        Ok(())
    }
}

/// OKX bar strings are case-sensitive: minutes lowercase, hours/days upper.
fn okx_bar(tf: &str) -> String {
    match tf {
        "1h" => "1H".into(),
        "2h" => "2H".into(),
        "4h" => "4H".into(),
        "6h" => "6H".into(),
        "12h" => "12H".into(),
        "1d" => "1D".into(),
        other => other.to_owned(),
    }
}

/// One OKX candle row: [ts, open, high, low, close, volume, ...].
fn parse_candle(row: &[String]) -> Result<Candle> {
    if row.len() < 6 {
        bail!("Candle row has {} fields, expected at least 6", row.len());
    }
    let num = |i: usize, name: &str| -> Result<f64> {
        row[i]
            .parse::<f64>()
            .with_context(|| format!("Candle {name} '{}' is not a number", row[i]))
    };
    Ok(Candle {
        ts: row[0]
            .parse::<i64>()
            .with_context(|| format!("Candle timestamp '{}' is not a number", row[0]))?,
        open: num(1, "open")?,
        high: num(2, "high")?,
        low: num(3, "low")?,
        close: num(4, "close")?,
        volume: num(5, "volume")?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bar_mapping_uppercases_hours_only() {
        assert_eq!(okx_bar("15m"), "15m");
        assert_eq!(okx_bar("4h"), "4H");
        assert_eq!(okx_bar("1d"), "1D");
    }

    #[test]
    fn parses_candle_row() {
        let row: Vec<String> = ["1700000000000", "35000.1", "35100", "34900", "35050.5", "123.4"]
            .iter()
            .map(|s| s.to_string())
            .collect();
        let c = parse_candle(&row).unwrap();
        assert_eq!(c.ts, 1_700_000_000_000);
        assert_eq!(c.close, 35050.5);
        assert_eq!(c.volume, 123.4);
    }

    #[test]
    fn rejects_short_or_garbage_rows() {
        let short: Vec<String> = vec!["1".into(), "2".into()];
        assert!(parse_candle(&short).is_err());
        let garbage: Vec<String> = ["1700000000000", "x", "1", "1", "1", "1"]
            .iter()
            .map(|s| s.to_string())
            .collect();
        assert!(parse_candle(&garbage).is_err());
    }
}
