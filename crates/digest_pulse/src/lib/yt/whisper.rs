use std::fmt::Display;

use crate::{
    llm::transcriber::Transcriber,
    yt::{AudioHandler, TranscriptSource},
};

/// Captions first; when a video has none, downloads its audio and runs it
/// through speech-to-text. The audio lives in a temporary directory that is
/// removed once the attempt finishes.
///
/// Fallback failures are logged and reported as "no transcript". A caption
/// error is only returned when the fallback could not produce text either.
#[derive(Debug, Clone)]
pub struct WhisperFallback<C, A, W> {
    captions: C,
    audio: A,
    transcriber: W,
}

impl<C, A, W> WhisperFallback<C, A, W> {
    pub fn new(captions: C, audio: A, transcriber: W) -> Self {
        Self {
            captions,
            audio,
            transcriber,
        }
    }
}

impl<C, A, W> WhisperFallback<C, A, W>
where
    A: AudioHandler + Sync,
    W: Transcriber + Sync,
{
    async fn transcribe_audio(&self, video_id: &str) -> Option<String> {
        let audio_dir = tempfile::Builder::new()
            .prefix("yt_transcript_")
            .tempdir()
            .inspect_err(|e| tracing::warn!(error = %e, "Failed to create audio directory"))
            .ok()?;

        let audio_path = self
            .audio
            .download(video_id, audio_dir.path())
            .await
            .inspect_err(|e| tracing::warn!(error = ?e, "Audio download failed"))
            .ok()?;

        let response = self
            .transcriber
            .transcribe(&audio_path)
            .await
            .inspect_err(|e| tracing::warn!(error = %e, "Speech-to-text failed"))
            .ok()?;

        match response.text.trim() {
            "" => None,
            text => Some(text.to_string()),
        }
    }
}

impl<C, A, W> TranscriptSource for WhisperFallback<C, A, W>
where
    C: TranscriptSource + Sync,
    C::Error: Send + Display,
    A: AudioHandler + Sync,
    W: Transcriber + Sync,
{
    type Error = C::Error;

    #[tracing::instrument(skip(self))]
    async fn fetch(&self, video_id: &str) -> Result<Option<String>, Self::Error> {
        let caption_error = match self.captions.fetch(video_id).await {
            Ok(Some(text)) if !text.trim().is_empty() => return Ok(Some(text)),
            Ok(_) => None,
            Err(e) => {
                tracing::warn!(error = %e, "Caption fetch failed");
                Some(e)
            }
        };

        tracing::info!("No captions, trying speech-to-text");
        match (self.transcribe_audio(video_id).await, caption_error) {
            (Some(text), _) => Ok(Some(text)),
            (None, Some(e)) => Err(e),
            (None, None) => Ok(None),
        }
    }
}
