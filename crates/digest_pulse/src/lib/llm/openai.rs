use std::{path::Path, time::Duration};

use reqwest::Client;
use serde::Deserialize;

use crate::{
    error::Error,
    llm::{
        summarizer::{SummaryResponse, Summarizer, SUMMARY_PROMPT},
        transcriber::{TranscribeResponse, Transcriber},
    },
};

/// OpenAI-compatible client: chat completions for summaries, the
/// transcriptions endpoint for videos without captions.
#[derive(Debug, Clone)]
pub struct OpenAIClient {
    client: Client,
    api_key: String,
    model: String,
    base_url: String,
}

impl OpenAIClient {
    pub const DEFAULT_MODEL: &str = "gpt-4o-mini";
    const TIMEOUT: Duration = Duration::from_secs(120);
    const TRANSCRIBE_TIMEOUT: Duration = Duration::from_secs(600);

    pub fn new(api_key: impl Into<String>, model: Option<String>) -> Self {
        Self {
            client: Client::new(),
            api_key: api_key.into(),
            model: model
                .filter(|m| !m.trim().is_empty())
                .unwrap_or_else(|| Self::DEFAULT_MODEL.into()),
            base_url: "https://api.openai.com/v1".into(),
        }
    }

    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    pub async fn send_transcribe_request(
        &self,
        audio_path: &Path,
        model_name: impl Into<String>,
    ) -> Result<TranscribeResponse, Error> {
        let bytes = tokio::fs::read(audio_path).await?;
        let file_name = audio_path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "audio.mp3".into());
        let part = reqwest::multipart::Part::bytes(bytes)
            .file_name(file_name)
            .mime_str("audio/mpeg")?;

        let form = reqwest::multipart::Form::new()
            .text("model", model_name.into())
            .text("response_format", "verbose_json")
            .part("file", part);

        let resp = self
            .client
            .post(format!("{}/audio/transcriptions", self.base_url))
            .bearer_auth(&self.api_key)
            .multipart(form)
            .timeout(Self::TRANSCRIBE_TIMEOUT)
            .send()
            .await
            .inspect_err(|e| tracing::error!(error = %e, "Failed to make http request"))?;

        if !resp.status().is_success() {
            return Err(Error::from_response(resp).await);
        }

        Ok(resp.json::<TranscribeResponse>().await?)
    }

    pub async fn send_completion_request(
        &self,
        user_content: impl Into<String>,
    ) -> Result<CompletionResponse, Error> {
        let body = serde_json::json!({
            "model": self.model,
            "messages": [
                {
                    "role": "system",
                    "content": SUMMARY_PROMPT
                },
                {
                    "role": "user",
                    "content": user_content.into()
                }
            ]
        });

        let resp = self
            .client
            .post(format!("{}/chat/completions", self.base_url))
            .bearer_auth(&self.api_key)
            .json(&body)
            .timeout(Self::TIMEOUT)
            .send()
            .await
            .inspect_err(|e| tracing::error!(error = %e, "Failed to make http request"))?;

        if !resp.status().is_success() {
            return Err(Error::from_response(resp).await);
        }

        Ok(resp.json::<CompletionResponse>().await?)
    }
}

#[derive(Debug, Deserialize)]
pub struct CompletionResponse {
    pub id: String,
    pub choices: Vec<CompletionChoice>,
}

#[derive(Debug, Deserialize)]
pub struct CompletionChoice {
    pub index: u32,
    pub message: CompletionMessage,
    pub finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct CompletionMessage {
    pub role: String,
    pub content: Option<String>,
}

impl Summarizer for OpenAIClient {
    type Error = Error;

    #[tracing::instrument(skip_all, fields(model = %self.model, chars = content.len()))]
    async fn summarize(&self, content: &str) -> Result<SummaryResponse, Self::Error> {
        let response = self
            .send_completion_request(content)
            .await
            .inspect_err(|e| tracing::error!(error = %e, "Failed to summarize content"))?;

        let summary = response
            .choices
            .first()
            .and_then(|c| c.message.content.clone())
            .ok_or(Error::ParseError("No content in completion response"))?;

        Ok(SummaryResponse {
            summary: summary.trim().to_string(),
        })
    }
}

impl Transcriber for OpenAIClient {
    const TRANSCRIPTION_MODEL: &'static str = "whisper-1";

    type Error = Error;

    #[tracing::instrument(skip(self))]
    async fn transcribe(&self, audio_path: &Path) -> Result<TranscribeResponse, Self::Error> {
        let response = self
            .send_transcribe_request(audio_path, Self::TRANSCRIPTION_MODEL)
            .await
            .inspect_err(|e| tracing::error!(error = %e, "Failed to transcribe audio"))?;

        tracing::debug!(duration = ?response.duration, chars = response.text.len(), "Transcribed audio");
        Ok(response)
    }
}
