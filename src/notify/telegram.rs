// =============================================================================
// Telegram Bot Notifier
// =============================================================================
//
// POST https://api.telegram.org/bot{token}/sendMessage
//   body: {"chat_id": "...", "text": "..."}
//
// Credentials come from TELEGRAM_TOKEN / TELEGRAM_CHAT_ID. A missing value or
// the `PUT_...` placeholder leaves the notifier disabled: every message is
// logged with a warning and dropped, and the engine keeps running.
// =============================================================================

use std::time::Duration;

use anyhow::{Context, Result};
use serde::Serialize;
use tracing::{debug, instrument, warn};

use super::Notifier;
use crate::error::SignalError;

const DEFAULT_BASE_URL: &str = "https://api.telegram.org";
const SEND_TIMEOUT: Duration = Duration::from_secs(20);

#[derive(Clone)]
struct Credentials {
    token: String,
    chat_id: String,
}

#[derive(Serialize)]
struct SendMessage<'a> {
    chat_id: &'a str,
    text: &'a str,
}

#[derive(Clone)]
pub struct TelegramNotifier {
    base_url: String,
    credentials: Option<Credentials>,
    client: reqwest::Client,
}

fn is_placeholder(value: &str) -> bool {
    let value = value.trim();
    value.is_empty() || value.contains("PUT_")
}

impl TelegramNotifier {
    /// Build from explicit credentials. Placeholders disable sending.
    pub fn new(token: Option<String>, chat_id: Option<String>) -> Result<Self> {
        let credentials = match (token, chat_id) {
            (Some(token), Some(chat_id))
                if !is_placeholder(&token) && !is_placeholder(&chat_id) =>
            {
                Some(Credentials { token, chat_id })
            }
            _ => {
                warn!("TELEGRAM_TOKEN / TELEGRAM_CHAT_ID not set, notifications disabled");
                None
            }
        };

        let client = reqwest::Client::builder()
            .timeout(SEND_TIMEOUT)
            .build()
            .context("failed to build reqwest client")?;

        Ok(Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            credentials,
            client,
        })
    }

    pub fn from_env() -> Result<Self> {
        Self::new(
            std::env::var("TELEGRAM_TOKEN").ok(),
            std::env::var("TELEGRAM_CHAT_ID").ok(),
        )
    }

    #[cfg(test)]
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn is_enabled(&self) -> bool {
        self.credentials.is_some()
    }

    async fn send(&self, creds: &Credentials, text: &str) -> Result<(), SignalError> {
        // The token is part of the path; keep it out of error messages.
        let url = format!("{}/bot{}/sendMessage", self.base_url, creds.token);
        let body = SendMessage {
            chat_id: &creds.chat_id,
            text,
        };

        let resp = self
            .client
            .post(&url)
            .json(&body)
            .send()
            .await
            .map_err(|e| SignalError::NotifyFailure(format!("transport: {}", e.without_url())))?;

        let status = resp.status();
        if !status.is_success() {
            let detail = resp.text().await.unwrap_or_default();
            return Err(SignalError::NotifyFailure(format!(
                "telegram returned {status}: {detail}"
            )));
        }

        Ok(())
    }
}

impl Notifier for TelegramNotifier {
    #[instrument(skip_all, name = "telegram::notify")]
    async fn notify(&self, message: &str) -> Result<(), SignalError> {
        let Some(creds) = &self.credentials else {
            warn!(text = message, "notifications disabled, message not sent");
            return Ok(());
        };

        self.send(creds, message).await?;
        debug!(chars = message.chars().count(), "telegram message sent");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn placeholder_credentials_disable_sending() {
        let n = TelegramNotifier::new(
            Some("PUT_YOUR_TOKEN_HERE".into()),
            Some("PUT_YOUR_CHAT_ID_HERE".into()),
        )
        .unwrap();
        assert!(!n.is_enabled());

        let n = TelegramNotifier::new(Some("123:abc".into()), None).unwrap();
        assert!(!n.is_enabled());

        let n = TelegramNotifier::new(Some("  ".into()), Some("42".into())).unwrap();
        assert!(!n.is_enabled());
    }

    #[test]
    fn real_credentials_enable_sending() {
        let n = TelegramNotifier::new(Some("123:abc".into()), Some("1820224574".into())).unwrap();
        assert!(n.is_enabled());
    }

    #[tokio::test]
    async fn disabled_notifier_succeeds_without_network() {
        let n = TelegramNotifier::new(None, None)
            .unwrap()
            .with_base_url("http://127.0.0.1:9");
        assert_eq!(n.notify("hello").await, Ok(()));
    }

    #[tokio::test]
    async fn unreachable_endpoint_is_notify_failure() {
        // Port 9 (discard) is closed on test hosts, so the connect fails fast.
        let n = TelegramNotifier::new(Some("123:abc".into()), Some("42".into()))
            .unwrap()
            .with_base_url("http://127.0.0.1:9");
        match n.notify("hello").await {
            Err(SignalError::NotifyFailure(msg)) => assert!(!msg.contains("123:abc")),
            other => panic!("expected NotifyFailure, got {other:?}"),
        }
    }

    #[test]
    fn payload_shape() {
        let body = SendMessage {
            chat_id: "42",
            text: "hi",
        };
        assert_eq!(
            serde_json::to_value(&body).unwrap(),
            serde_json::json!({"chat_id": "42", "text": "hi"})
        );
    }
}
