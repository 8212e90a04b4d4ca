/// notify.rs — Operator notifications
///
/// Delivery failures are logged and swallowed: a dead Telegram chat must
/// never stall or fail a trading cycle, so `alert` is infallible by contract.
use async_trait::async_trait;
use reqwest::Client;
use tracing::{debug, warn};

use crate::config::AppConfig;

#[async_trait]
pub trait Notifier: Send + Sync {
    async fn alert(&self, message: &str);
}

/// Fans every message out to all configured Telegram chats.
pub struct TelegramNotifier {
    client: Client,
    token: String,
    chat_ids: Vec<i64>,
}

impl TelegramNotifier {
    pub fn new(cfg: &AppConfig) -> Self {
        Self {
            client: Client::new(),
            token: cfg.telegram_token.clone(),
            chat_ids: cfg.telegram_chat_ids.clone(),
        }
    }
}

#[async_trait]
impl Notifier for TelegramNotifier {
    async fn alert(&self, message: &str) {
        if self.token.is_empty() || self.chat_ids.is_empty() {
            debug!("telegram not configured, dropping notification");
            return;
        }
        let url = format!("https://api.telegram.org/bot{}/sendMessage", self.token);
        for chat_id in &self.chat_ids {
            let result = self
                .client
                .post(&url)
                .json(&serde_json::json!({
                    "chat_id": chat_id,
                    "text": message,
                }))
                .send()
                .await;
            match result {
                Ok(resp) if !resp.status().is_success() => {
                    warn!("Telegram error for chat {}: HTTP {}", chat_id, resp.status());
                }
                Err(e) => warn!("Telegram send failed for chat {}: {}", chat_id, e),
                Ok(_) => {}
            }
        }
    }
}
