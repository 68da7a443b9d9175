pub mod audio_handler;
pub mod brave;
pub mod data_api;
pub mod scraper;
pub mod whisper;

use std::{
    fmt::{Debug, Display},
    future::Future,
    path::{Path, PathBuf},
};

use chrono::{DateTime, Duration, Utc};

use crate::{error::Error, openai::OpenAIClient, types::DiscoveredItem};

use self::{
    audio_handler::YtDlp, brave::BraveVideoSearch, data_api::YouTubeDataApi,
    scraper::CaptionScraper, whisper::WhisperFallback,
};

/// Produces candidate videos for a channel.
///
/// Implementations return items in upload order (newest first is fine) and
/// never repeat an ID within one call. An empty list is a normal outcome.
pub trait DiscoverySource {
    type Error: Debug + Display;

    fn find_recent(
        &self,
        channel: &str,
        window: &DiscoveryWindow,
    ) -> impl Future<Output = Result<Vec<DiscoveredItem>, Self::Error>> + Send;
}

/// Fetches the transcript of a video.
///
/// `Ok(None)` means the video has no usable captions; `Err` is reserved for
/// transport failures. The processor skips the item either way but logs the
/// two differently.
pub trait TranscriptSource {
    type Error: Debug + Display;

    fn fetch(
        &self,
        video_id: &str,
    ) -> impl Future<Output = Result<Option<String>, Self::Error>> + Send;
}

/// Fetches a video's audio track into a directory, returning the file path.
pub trait AudioHandler {
    fn download(
        &self,
        video_id: &str,
        audio_dl_path: &Path,
    ) -> impl Future<Output = anyhow::Result<PathBuf>> + Send;
}

/// Rolling lookback window used by every discovery backend: videos published
/// within the last `hours` hours before the window was opened.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DiscoveryWindow {
    since: DateTime<Utc>,
    hours: u32,
}

impl DiscoveryWindow {
    pub const DEFAULT_LOOKBACK_HOURS: u32 = 24;

    pub fn lookback_hours(hours: u32) -> Self {
        Self::ending_at(Utc::now(), hours)
    }

    /// A window so long it reaches before the earliest representable time
    /// starts there instead.
    pub fn ending_at(now: DateTime<Utc>, hours: u32) -> Self {
        DiscoveryWindow {
            since: now
                .checked_sub_signed(Duration::hours(i64::from(hours)))
                .unwrap_or(DateTime::<Utc>::MIN_UTC),
            hours,
        }
    }

    pub fn since(&self) -> DateTime<Utc> {
        self.since
    }

    pub fn hours(&self) -> u32 {
        self.hours
    }

    /// RFC 3339 with a bare `Z`, the only form the YouTube Data API accepts.
    pub fn published_after(&self) -> String {
        self.since.format("%Y-%m-%dT%H:%M:%SZ").to_string()
    }

    /// Closest Brave `freshness` bucket that still covers the whole window.
    pub fn brave_freshness(&self) -> &'static str {
        match self.hours {
            0..=24 => "pd",
            25..=168 => "pw",
            169..=744 => "pm",
            _ => "py",
        }
    }
}

impl Default for DiscoveryWindow {
    fn default() -> Self {
        Self::lookback_hours(Self::DEFAULT_LOOKBACK_HOURS)
    }
}

/// The discovery backend chosen at startup: the YouTube Data API when a key is
/// configured (it only returns the channel's own uploads), Brave search otherwise.
pub enum ChannelDiscovery {
    YouTube(YouTubeDataApi),
    Brave(BraveVideoSearch),
}

impl DiscoverySource for ChannelDiscovery {
    type Error = Error;

    async fn find_recent(
        &self,
        channel: &str,
        window: &DiscoveryWindow,
    ) -> Result<Vec<DiscoveredItem>, Self::Error> {
        match self {
            ChannelDiscovery::YouTube(api) => api.find_recent(channel, window).await,
            ChannelDiscovery::Brave(search) => search.find_recent(channel, window).await,
        }
    }
}

/// The transcript source chosen at startup: captions only, or captions with
/// speech-to-text for videos that have none.
pub enum TranscriptBackend {
    Captions(CaptionScraper),
    Whisper(WhisperFallback<CaptionScraper, YtDlp, OpenAIClient>),
}

impl TranscriptSource for TranscriptBackend {
    type Error = Error;

    async fn fetch(&self, video_id: &str) -> Result<Option<String>, Self::Error> {
        match self {
            TranscriptBackend::Captions(scraper) => scraper.fetch(video_id).await,
            TranscriptBackend::Whisper(fallback) => fallback.fetch(video_id).await,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn window_formats_published_after() {
        let now = Utc.with_ymd_and_hms(2026, 2, 3, 8, 31, 0).unwrap();
        let window = DiscoveryWindow::ending_at(now, 24);
        assert_eq!(window.published_after(), "2026-02-02T08:31:00Z");
        assert_eq!(window.hours(), 24);
    }

    #[test]
    fn huge_lookback_clamps_instead_of_overflowing() {
        let now = Utc.with_ymd_and_hms(2026, 2, 3, 8, 31, 0).unwrap();
        let window = DiscoveryWindow::ending_at(now, u32::MAX);
        assert_eq!(window.since(), DateTime::<Utc>::MIN_UTC);
        assert_eq!(window.hours(), u32::MAX);
        assert_eq!(window.brave_freshness(), "py");

        let window = DiscoveryWindow::lookback_hours(u32::MAX);
        assert!(window.since() < Utc::now());
    }

    #[test]
    fn brave_freshness_covers_window() {
        let now = Utc::now();
        assert_eq!(DiscoveryWindow::ending_at(now, 6).brave_freshness(), "pd");
        assert_eq!(DiscoveryWindow::ending_at(now, 24).brave_freshness(), "pd");
        assert_eq!(DiscoveryWindow::ending_at(now, 48).brave_freshness(), "pw");
        assert_eq!(DiscoveryWindow::ending_at(now, 24 * 30).brave_freshness(), "pm");
        assert_eq!(DiscoveryWindow::ending_at(now, 24 * 90).brave_freshness(), "py");
    }
}
