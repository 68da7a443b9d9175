use chrono::{DateTime, Utc};
use serde::Deserialize;

pub const YOUTUBE_WATCH_URL: &str = "https://www.youtube.com/watch";

/// A video found by a discovery source, ready to go through the pipeline.
///
/// Every discovery backend produces this same shape. `title` is never empty
/// and `url` is always the canonical watch URL for `id`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiscoveredItem {
    id: String,
    url: String,
    title: String,
    published_at: Option<DateTime<Utc>>,
    channel: Option<String>,
}

impl DiscoveredItem {
    pub const UNTITLED: &'static str = "Untitled";

    pub fn new(id: impl Into<String>, title: impl AsRef<str>) -> Self {
        let id = id.into();
        let title = match title.as_ref().trim() {
            "" => Self::UNTITLED.to_string(),
            t => t.to_string(),
        };
        DiscoveredItem {
            url: canonical_watch_url(&id),
            id,
            title,
            published_at: None,
            channel: None,
        }
    }

    pub fn with_published_at(mut self, published_at: Option<DateTime<Utc>>) -> Self {
        self.published_at = published_at;
        self
    }

    /// Channel handle or name the video belongs to, used for artifact file names.
    pub fn with_channel(mut self, channel: Option<String>) -> Self {
        self.channel = channel.filter(|c| !c.trim().is_empty());
        self
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn published_at(&self) -> Option<DateTime<Utc>> {
        self.published_at
    }

    pub fn channel(&self) -> Option<&str> {
        self.channel.as_deref()
    }

    /// Fills in what a per-video lookup found. The looked-up channel replaces
    /// the one discovery guessed; title and upload time are only filled when
    /// missing.
    pub fn enriched(mut self, meta: VideoMetadata) -> Self {
        if self.title == Self::UNTITLED {
            if let Some(title) = meta.title.filter(|t| !t.trim().is_empty()) {
                self.title = title.trim().to_string();
            }
        }
        self.published_at = self.published_at.or(meta.published_at);
        if let Some(channel) = meta.channel.filter(|c| !c.trim().is_empty()) {
            self.channel = Some(channel);
        }
        self
    }
}

/// What a single-video lookup could find out. Every field is optional.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VideoMetadata {
    pub title: Option<String>,
    pub published_at: Option<DateTime<Utc>>,
    pub channel: Option<String>,
}

pub fn canonical_watch_url(video_id: &str) -> String {
    format!("{YOUTUBE_WATCH_URL}?v={video_id}")
}

// YouTube Data API v3 response shapes (only the fields we read)

#[derive(Debug, Default, Deserialize)]
pub struct ListResponse<T> {
    #[serde(default = "Vec::new")]
    pub items: Vec<T>,
}

#[derive(Debug, Deserialize)]
pub struct ChannelItem {
    pub id: String,
}

#[derive(Debug, Deserialize)]
pub struct SearchItem {
    pub id: SearchItemId,
    #[serde(default)]
    pub snippet: Snippet,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchItemId {
    pub video_id: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct VideoItem {
    #[serde(default)]
    pub snippet: Snippet,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Snippet {
    #[serde(default)]
    pub title: String,
    pub published_at: Option<DateTime<Utc>>,
    pub channel_title: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct OEmbedResponse {
    #[serde(default)]
    pub title: String,
    pub author_url: Option<String>,
}

// Brave video search response shape

#[derive(Debug, Default, Deserialize)]
pub struct BraveVideoResponse {
    #[serde(default)]
    pub results: Vec<BraveVideoResult>,
}

#[derive(Debug, Deserialize)]
pub struct BraveVideoResult {
    #[serde(default)]
    pub url: String,
    #[serde(default)]
    pub title: String,
}
