use std::{ops::Deref, time::Duration};

use crate::{
    error::Error,
    parser::{caption_tracks, parse_timedtext, pick_caption_track, YtHtmlDocument},
    types::YOUTUBE_WATCH_URL,
    yt::TranscriptSource,
};

/// Transcript source that reads the captions YouTube already publishes for a
/// video, by scraping the watch page for its caption tracks.
#[derive(Debug, Clone, Default)]
pub struct CaptionScraper(pub reqwest::Client);

impl Deref for CaptionScraper {
    type Target = reqwest::Client;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl CaptionScraper {
    const TIMEOUT: Duration = Duration::from_secs(30);

    async fn get_text(&self, request: reqwest::RequestBuilder) -> Result<String, Error> {
        let resp = request
            .header("Accept-Language", "en-US,en;q=0.9")
            .timeout(Self::TIMEOUT)
            .send()
            .await?;

        if !resp.status().is_success() {
            return Err(Error::from_response(resp).await);
        }
        Ok(resp.text().await?)
    }
}

impl TranscriptSource for CaptionScraper {
    type Error = Error;

    #[tracing::instrument(skip(self))]
    async fn fetch(&self, video_id: &str) -> Result<Option<String>, Self::Error> {
        let page = self
            .get_text(self.get(YOUTUBE_WATCH_URL).query(&[("v", video_id)]))
            .await
            .map(YtHtmlDocument::from)?;
        let player = page.player_response::<serde_json::Value>()?;

        let tracks = caption_tracks(&player);
        let Some(track) = pick_caption_track(&tracks) else {
            tracing::debug!("Video has no caption tracks");
            return Ok(None);
        };
        tracing::debug!(
            language = %track.language_code,
            generated = track.is_generated(),
            "Fetching caption track"
        );

        let xml = self.get_text(self.get(&track.base_url)).await?;
        Ok(parse_timedtext(&xml))
    }
}
