use std::time::Duration;

use itertools::Itertools;
use reqwest::Client;
use serde::de::DeserializeOwned;

use crate::{
    error::Error,
    parser::handle_from_channel_url,
    types::{
        canonical_watch_url, ChannelItem, DiscoveredItem, ListResponse, OEmbedResponse,
        SearchItem, VideoItem, VideoMetadata,
    },
    yt::{DiscoveryWindow, DiscoverySource},
};

const TIMEOUT: Duration = Duration::from_secs(15);

/// GETs `url` and decodes the JSON body. The API key travels in the
/// `X-Goog-Api-Key` header, and request URLs are stripped from errors so
/// nothing secret reaches the logs.
async fn get_json<T: DeserializeOwned>(
    client: &Client,
    url: &str,
    query: &[(&str, &str)],
    api_key: Option<&str>,
) -> Result<T, Error> {
    let mut request = client.get(url).query(query).timeout(TIMEOUT);
    if let Some(key) = api_key {
        request = request.header("X-Goog-Api-Key", key);
    }

    let resp = request
        .send()
        .await
        .map_err(reqwest::Error::without_url)
        .inspect_err(|e| tracing::error!(error = %e, "Failed to make http request"))?;

    if !resp.status().is_success() {
        return Err(Error::from_response(resp).await);
    }
    Ok(resp.json::<T>().await.map_err(reqwest::Error::without_url)?)
}

/// Discovery through the YouTube Data API v3: resolves a channel handle to its
/// ID, then lists the channel's uploads inside the discovery window.
#[derive(Debug, Clone)]
pub struct YouTubeDataApi {
    client: Client,
    api_key: String,
    max_results: u8,
}

impl YouTubeDataApi {
    const CHANNELS_URL: &str = "https://www.googleapis.com/youtube/v3/channels";
    const SEARCH_URL: &str = "https://www.googleapis.com/youtube/v3/search";

    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            api_key: api_key.into(),
            max_results: 20,
        }
    }

    /// Caps the page size; the API refuses anything above 50.
    pub fn with_max_results(mut self, max_results: u8) -> Self {
        self.max_results = max_results.min(50);
        self
    }

    /// Resolves `@handle`, a bare handle or a `youtube.com/@handle` URL to a
    /// channel ID.
    #[tracing::instrument(skip(self))]
    async fn channel_id_for_handle(&self, channel: &str) -> Result<Option<String>, Error> {
        let handle = handle_from_channel_url(channel).unwrap_or_else(|| channel.to_string());
        let handle = handle.trim().trim_start_matches('@');
        if handle.is_empty() {
            return Ok(None);
        }

        let resp: ListResponse<ChannelItem> = get_json(
            &self.client,
            Self::CHANNELS_URL,
            &[("part", "id"), ("forHandle", handle)],
            Some(self.api_key.as_str()),
        )
        .await?;

        Ok(resp.items.into_iter().next().map(|c| c.id))
    }
}

impl DiscoverySource for YouTubeDataApi {
    type Error = Error;

    #[tracing::instrument(skip(self, window), fields(since = %window.published_after()))]
    async fn find_recent(
        &self,
        channel: &str,
        window: &DiscoveryWindow,
    ) -> Result<Vec<DiscoveredItem>, Self::Error> {
        let Some(channel_id) = self.channel_id_for_handle(channel).await? else {
            tracing::warn!("Could not resolve channel handle");
            return Ok(Vec::new());
        };

        let max_results = self.max_results.to_string();
        let published_after = window.published_after();
        let resp: ListResponse<SearchItem> = get_json(
            &self.client,
            Self::SEARCH_URL,
            &[
                ("part", "snippet"),
                ("channelId", channel_id.as_str()),
                ("type", "video"),
                ("order", "date"),
                ("maxResults", max_results.as_str()),
                ("publishedAfter", published_after.as_str()),
            ],
            Some(self.api_key.as_str()),
        )
        .await?;

        let items = resp
            .items
            .into_iter()
            .filter_map(|item| {
                let video_id = item.id.video_id?;
                Some(
                    DiscoveredItem::new(video_id, &item.snippet.title)
                        .with_published_at(item.snippet.published_at)
                        .with_channel(Some(channel.to_string())),
                )
            })
            .unique_by(|item| item.id().to_string())
            .collect::<Vec<_>>();

        tracing::info!(count = items.len(), "Discovered videos");
        Ok(items)
    }
}

/// Best-effort metadata lookup for a single video ID, used when videos are
/// passed on the command line instead of discovered.
///
/// oEmbed needs no key and gives the title and channel handle; with a Data API
/// key the upload time and channel title are filled in too. Every lookup
/// failure degrades to a placeholder rather than an error.
#[derive(Debug, Clone)]
pub struct VideoLookup {
    client: Client,
    api_key: Option<String>,
}

impl VideoLookup {
    const OEMBED_URL: &str = "https://www.youtube.com/oembed";
    const VIDEOS_URL: &str = "https://www.googleapis.com/youtube/v3/videos";

    pub fn new(api_key: Option<String>) -> Self {
        Self {
            client: Client::new(),
            api_key: api_key.filter(|k| !k.is_empty()),
        }
    }

    /// Title, channel and upload time for `video_id`, as far as they can be found.
    #[tracing::instrument(skip(self))]
    pub async fn metadata(&self, video_id: &str) -> VideoMetadata {
        let watch_url = canonical_watch_url(video_id);

        let oembed = get_json::<OEmbedResponse>(
            &self.client,
            Self::OEMBED_URL,
            &[("url", watch_url.as_str()), ("format", "json")],
            None,
        )
        .await
        .inspect_err(|e| tracing::info!(error = %e, "oEmbed lookup failed"))
        .ok();

        let mut meta = VideoMetadata {
            title: oembed.as_ref().map(|o| o.title.clone()),
            published_at: None,
            channel: oembed
                .as_ref()
                .and_then(|o| o.author_url.as_deref())
                .and_then(handle_from_channel_url),
        };

        if let Some(key) = &self.api_key {
            match get_json::<ListResponse<VideoItem>>(
                &self.client,
                Self::VIDEOS_URL,
                &[("part", "snippet"), ("id", video_id)],
                Some(key.as_str()),
            )
            .await
            {
                Ok(resp) => {
                    if let Some(snippet) = resp.items.into_iter().next().map(|v| v.snippet) {
                        if !snippet.title.trim().is_empty() {
                            meta.title = Some(snippet.title);
                        }
                        meta.published_at = snippet.published_at;
                        meta.channel = meta.channel.or(snippet.channel_title);
                    }
                }
                Err(e) => tracing::info!(error = %e, "videos.list lookup failed"),
            }
        }

        meta
    }

    /// Builds the pipeline item for a video given on the command line.
    pub async fn lookup(&self, video_id: &str) -> DiscoveredItem {
        let meta = self.metadata(video_id).await;
        let title = meta
            .title
            .clone()
            .filter(|t| !t.trim().is_empty())
            .unwrap_or_else(|| format!("Video {video_id}"));
        DiscoveredItem::new(video_id, title).enriched(meta)
    }
}
