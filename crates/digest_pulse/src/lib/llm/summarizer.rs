use std::{
    fmt::{Debug, Display},
    future::Future,
};

use serde::Deserialize;

use crate::{
    error::Error,
    llm::{gemini::GeminiClient, openai::OpenAIClient},
};

pub const SUMMARY_PROMPT: &str = include_str!("./prompts/summary_0.txt");

pub trait Summarizer {
    /// Transcripts longer than this many characters are cut before submission.
    const CONTEXT_WINDOW_LIMIT: usize = 150_000;

    type Error: Debug + Display;

    fn summarize(
        &self,
        content: &str,
    ) -> impl Future<Output = Result<SummaryResponse, Self::Error>> + Send;
}

#[derive(Debug, Clone, Deserialize)]
pub struct SummaryResponse {
    pub summary: String,
}

/// First `max_chars` characters of `s`, cut on a char boundary.
pub fn truncate_chars(s: &str, max_chars: usize) -> &str {
    match s.char_indices().nth(max_chars) {
        Some((idx, _)) => &s[..idx],
        None => s,
    }
}

/// The summarization backend chosen at startup.
pub enum SummaryBackend {
    Gemini(GeminiClient),
    OpenAI(OpenAIClient),
}

impl Summarizer for SummaryBackend {
    type Error = Error;

    async fn summarize(&self, content: &str) -> Result<SummaryResponse, Self::Error> {
        match self {
            SummaryBackend::Gemini(client) => client.summarize(content).await,
            SummaryBackend::OpenAI(client) => client.summarize(content).await,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn truncate_on_char_boundary() {
        assert_eq!(truncate_chars("hello", 10), "hello");
        assert_eq!(truncate_chars("hello", 2), "he");
        assert_eq!(truncate_chars("重點提取", 2), "重點");
        assert_eq!(truncate_chars("", 0), "");
    }

    #[test]
    fn prompt_asks_for_tables() {
        assert!(SUMMARY_PROMPT.contains("| Item | Detail |"));
    }
}
