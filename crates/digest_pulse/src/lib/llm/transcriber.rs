use std::{fmt::Debug, future::Future, path::Path};

use serde::Deserialize;

/// Speech-to-text over a downloaded audio file, used when a video has no captions.
pub trait Transcriber {
    const TRANSCRIPTION_MODEL: &'static str;

    type Error: Debug + std::fmt::Display;

    fn transcribe(
        &self,
        audio_path: &Path,
    ) -> impl Future<Output = Result<TranscribeResponse, Self::Error>> + Send;
}

#[derive(Debug, Deserialize)]
pub struct TranscribeResponse {
    #[serde(default)]
    pub text: String,
    pub duration: Option<f64>,
}
