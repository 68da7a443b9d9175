use std::time::Duration;

use reqwest::Client;
use serde::Deserialize;

use crate::{
    error::Error,
    llm::summarizer::{SummaryResponse, Summarizer, SUMMARY_PROMPT},
};

/// Google Gemini `generateContent` client.
#[derive(Debug, Clone)]
pub struct GeminiClient {
    client: Client,
    api_key: String,
    model: String,
    base_url: String,
}

#[derive(Debug, Deserialize)]
pub struct GenerateResponse {
    #[serde(default)]
    pub candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
pub struct Candidate {
    pub content: Option<CandidateContent>,
}

#[derive(Debug, Deserialize)]
pub struct CandidateContent {
    #[serde(default)]
    pub parts: Vec<Part>,
}

#[derive(Debug, Deserialize)]
pub struct Part {
    pub text: Option<String>,
}

impl GenerateResponse {
    /// Concatenated text parts of the first candidate.
    pub fn text(&self) -> Option<String> {
        let text = self
            .candidates
            .first()?
            .content
            .as_ref()?
            .parts
            .iter()
            .filter_map(|p| p.text.as_deref())
            .collect::<String>();
        Some(text)
    }
}

impl GeminiClient {
    pub const DEFAULT_MODEL: &str = "gemini-1.5-flash";
    const TIMEOUT: Duration = Duration::from_secs(120);

    pub fn new(api_key: impl Into<String>, model: Option<String>) -> Self {
        Self {
            client: Client::new(),
            api_key: api_key.into(),
            model: model
                .filter(|m| !m.trim().is_empty())
                .unwrap_or_else(|| Self::DEFAULT_MODEL.into()),
            base_url: "https://generativelanguage.googleapis.com/v1beta".into(),
        }
    }

    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    pub async fn send_generate_request(&self, contents: &str) -> Result<GenerateResponse, Error> {
        let body = serde_json::json!({
            "contents": [
                { "parts": [ { "text": contents } ] }
            ]
        });

        let resp = self
            .client
            .post(format!(
                "{}/models/{}:generateContent",
                self.base_url, self.model
            ))
            .header("x-goog-api-key", &self.api_key)
            .json(&body)
            .timeout(Self::TIMEOUT)
            .send()
            .await
            .inspect_err(|e| tracing::error!(error = %e, "Failed to make http request"))?;

        if !resp.status().is_success() {
            return Err(Error::from_response(resp).await);
        }

        Ok(resp.json::<GenerateResponse>().await?)
    }
}

impl Summarizer for GeminiClient {
    type Error = Error;

    #[tracing::instrument(skip_all, fields(model = %self.model, chars = content.len()))]
    async fn summarize(&self, content: &str) -> Result<SummaryResponse, Self::Error> {
        let response = self
            .send_generate_request(&format!("{SUMMARY_PROMPT}\n\n---\n\n{content}"))
            .await
            .inspect_err(|e| tracing::error!(error = %e, "Failed to summarize content"))?;

        let summary = response
            .text()
            .ok_or(Error::ParseError("No candidate content in Gemini response"))?;

        Ok(SummaryResponse {
            summary: summary.trim().to_string(),
        })
    }
}
