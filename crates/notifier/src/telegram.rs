// In crates/notifier/src/telegram.rs

use crate::{Error, Notifier, Result};
use app_config::types::TelegramSettings;
use async_trait::async_trait;
use reqwest::Client;
use serde::Serialize;
use std::time::Duration;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Body of the Bot API `sendMessage` call.
#[derive(Debug, Serialize)]
struct SendMessage<'a> {
    chat_id: &'a str,
    text: &'a str,
}

/// Delivers messages to one Telegram chat through the Bot API.
#[derive(Debug, Clone)]
pub struct TelegramNotifier {
    http_client: Client,
    /// `{api_base_url}/bot{token}/sendMessage`
    send_url: String,
    chat_id: String,
}

impl TelegramNotifier {
    pub fn new(settings: &TelegramSettings) -> Result<Self> {
        let http_client = Client::builder().timeout(REQUEST_TIMEOUT).build()?;
        Ok(Self {
            http_client,
            send_url: send_message_url(&settings.api_base_url, &settings.bot_token),
            chat_id: settings.chat_id.clone(),
        })
    }
}

fn send_message_url(api_base_url: &str, bot_token: &str) -> String {
    format!(
        "{}/bot{}/sendMessage",
        api_base_url.trim_end_matches('/'),
        bot_token
    )
}

#[async_trait]
impl Notifier for TelegramNotifier {
    fn name(&self) -> &'static str {
        "Telegram"
    }

    async fn send(&self, message: &str) -> Result<()> {
        let payload = SendMessage {
            chat_id: &self.chat_id,
            text: message,
        };

        let response = self
            .http_client
            .post(&self.send_url)
            .json(&payload)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            // The body carries Telegram's `description` of the failure.
            let body = response.text().await.unwrap_or_default();
            return Err(Error::Rejected {
                status: status.as_u16(),
                body,
            });
        }

        tracing::debug!(chat_id = %self.chat_id, "Telegram message delivered.");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_send_message_url() {
        assert_eq!(
            send_message_url("https://api.telegram.org", "123:abc"),
            "https://api.telegram.org/bot123:abc/sendMessage"
        );
        assert_eq!(
            send_message_url("http://localhost:8081/", "t"),
            "http://localhost:8081/bott/sendMessage"
        );
    }

    #[test]
    fn test_payload_shape() {
        let payload = SendMessage {
            chat_id: "-100200",
            text: "💥 SHORT signal",
        };
        let value = serde_json::to_value(&payload).unwrap();
        assert_eq!(
            value,
            serde_json::json!({"chat_id": "-100200", "text": "💥 SHORT signal"})
        );
    }

    #[test]
    fn test_new_uses_settings() {
        let notifier = TelegramNotifier::new(&TelegramSettings {
            bot_token: "123:abc".into(),
            chat_id: "42".into(),
            api_base_url: "https://api.telegram.org".into(),
        })
        .unwrap();
        assert_eq!(notifier.chat_id, "42");
        assert_eq!(
            notifier.send_url,
            "https://api.telegram.org/bot123:abc/sendMessage"
        );
        assert_eq!(notifier.name(), "Telegram");
    }
}
