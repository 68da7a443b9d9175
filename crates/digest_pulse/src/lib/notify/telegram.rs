use std::time::Duration;

use reqwest::Client;
use serde::Serialize;

use crate::{
    error::Error,
    notify::{DeliverySink, OutgoingMessage},
};

/// Telegram Bot API `sendMessage` sink for a single chat.
#[derive(Debug, Clone)]
pub struct TelegramBot {
    client: Client,
    token: String,
    chat_id: String,
    base_url: String,
}

#[derive(Debug, Serialize)]
struct SendMessageRequest<'a> {
    chat_id: &'a str,
    text: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    parse_mode: Option<&'static str>,
}

impl TelegramBot {
    const TIMEOUT: Duration = Duration::from_secs(30);

    pub fn new(token: impl Into<String>, chat_id: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            token: token.into(),
            chat_id: chat_id.into(),
            base_url: "https://api.telegram.org".into(),
        }
    }

    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }
}

impl DeliverySink for TelegramBot {
    type Error = Error;

    async fn send(&self, message: &OutgoingMessage) -> Result<(), Self::Error> {
        let payload = SendMessageRequest {
            chat_id: &self.chat_id,
            text: &message.text,
            parse_mode: message.parse_mode.map(|m| m.as_str()),
        };

        let resp = self
            .client
            .post(format!("{}/bot{}/sendMessage", self.base_url, self.token))
            .json(&payload)
            .timeout(Self::TIMEOUT)
            .send()
            .await
            // the bot token is part of the URL
            .map_err(|e| Error::Request(e.without_url()))?;

        if !resp.status().is_success() {
            return Err(Error::from_response(resp).await);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::notify::ParseMode;

    #[test]
    fn payload_omits_missing_parse_mode() {
        let plain = SendMessageRequest {
            chat_id: "42",
            text: "hi",
            parse_mode: None,
        };
        assert_eq!(
            serde_json::to_value(&plain).unwrap(),
            serde_json::json!({"chat_id": "42", "text": "hi"})
        );

        let html = SendMessageRequest {
            chat_id: "42",
            text: "<b>hi</b>",
            parse_mode: Some(ParseMode::Html.as_str()),
        };
        assert_eq!(serde_json::to_value(&html).unwrap()["parse_mode"], "HTML");
    }
}
