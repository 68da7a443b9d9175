pub mod telegram;

use std::{
    fmt::{Debug, Display},
    future::Future,
};

use crate::render::html::escape_text;

/// Telegram's per-message limit, counted in characters.
pub const MAX_MESSAGE_LENGTH: usize = 4096;

const TRUNCATION_MARKER: &str = "...";
const TRUNCATE_TO: usize = MAX_MESSAGE_LENGTH - 4;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParseMode {
    Html,
}

impl ParseMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            ParseMode::Html => "HTML",
        }
    }
}

/// One message as handed to the sink.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutgoingMessage {
    pub text: String,
    pub parse_mode: Option<ParseMode>,
}

impl OutgoingMessage {
    /// Builds a message. Text over [`MAX_MESSAGE_LENGTH`] is cut short and
    /// marked with `...`.
    pub fn new(text: impl Into<String>, parse_mode: Option<ParseMode>) -> Self {
        let mut text = text.into();
        if text.chars().count() > MAX_MESSAGE_LENGTH {
            let cut = text
                .char_indices()
                .nth(TRUNCATE_TO)
                .map_or(text.len(), |(idx, _)| idx);
            text.truncate(cut);
            text.push_str(TRUNCATION_MARKER);
        }
        OutgoingMessage { text, parse_mode }
    }

    pub fn html(text: impl Into<String>) -> Self {
        Self::new(text, Some(ParseMode::Html))
    }

    pub fn plain(text: impl Into<String>) -> Self {
        Self::new(text, None)
    }
}

/// Transmits a single message to the end user.
pub trait DeliverySink {
    type Error: Debug + Display;

    fn send(
        &self,
        message: &OutgoingMessage,
    ) -> impl Future<Output = Result<(), Self::Error>> + Send;
}

/// Splits a video summary into the messages to send, in order.
///
/// If the whole thing fits it goes out as a single HTML message. Otherwise the
/// first message carries only the title and link, and the raw summary follows
/// in plain-text chunks of at most [`MAX_MESSAGE_LENGTH`] characters.
/// Whitespace-only chunks are dropped since Telegram rejects them.
pub fn compose_messages(title: &str, url: &str, summary: &str) -> Vec<OutgoingMessage> {
    let header = format!("<b>{}</b>\n{url}\n\n", escape_text(title));
    let body = format!("{header}{}", escape_text(summary));

    if body.chars().count() <= MAX_MESSAGE_LENGTH {
        return vec![OutgoingMessage::html(body)];
    }

    let chars = summary.chars().collect::<Vec<_>>();
    let mut messages = vec![OutgoingMessage::html(header)];
    messages.extend(
        chars
            .chunks(MAX_MESSAGE_LENGTH)
            .map(|chunk| chunk.iter().collect::<String>())
            .filter(|chunk| !chunk.trim().is_empty())
            .map(OutgoingMessage::plain),
    );
    messages
}

/// Delivers a summary through `sink`. Returns `false` as soon as any message
/// fails; the remaining ones are not sent.
#[tracing::instrument(skip(sink, summary), fields(chars = summary.len()))]
pub async fn deliver<K: DeliverySink>(sink: &K, title: &str, url: &str, summary: &str) -> bool {
    let messages = compose_messages(title, url, summary);
    let total = messages.len();

    for (idx, message) in messages.iter().enumerate() {
        if let Err(e) = sink.send(message).await {
            tracing::warn!(error = %e, part = idx + 1, total, "Failed to deliver message");
            return false;
        }
    }

    tracing::debug!(total, "Delivered all messages");
    true
}
