use std::time::Duration;

use itertools::Itertools;
use reqwest::Client;

use crate::{
    error::Error,
    parser::video_id_from_watch_url,
    types::{BraveVideoResponse, DiscoveredItem},
    yt::{data_api::VideoLookup, DiscoveryWindow, DiscoverySource},
};

/// Discovery through Brave video search, for setups without a YouTube Data API
/// key. Results are matched on the channel name, so they can include videos
/// from other channels that mention it. Each hit is looked up on its own to
/// get the uploader's handle and upload time, which search results lack.
#[derive(Debug, Clone)]
pub struct BraveVideoSearch {
    client: Client,
    api_key: String,
    count: u8,
    lookup: VideoLookup,
}

impl BraveVideoSearch {
    const SEARCH_URL: &str = "https://api.search.brave.com/res/v1/videos/search";
    const TIMEOUT: Duration = Duration::from_secs(30);

    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            api_key: api_key.into(),
            count: 20,
            lookup: VideoLookup::new(None),
        }
    }

    pub fn with_count(mut self, count: u8) -> Self {
        self.count = count;
        self
    }
}

/// Keeps YouTube watch results only, first occurrence of each video wins.
pub fn items_from_results(resp: BraveVideoResponse, channel: &str) -> Vec<DiscoveredItem> {
    resp.results
        .into_iter()
        .filter_map(|r| {
            let video_id = video_id_from_watch_url(r.url.trim())?;
            Some(DiscoveredItem::new(video_id, &r.title).with_channel(Some(channel.to_string())))
        })
        .unique_by(|item| item.id().to_string())
        .collect()
}

impl DiscoverySource for BraveVideoSearch {
    type Error = Error;

    #[tracing::instrument(skip(self, window), fields(freshness = window.brave_freshness()))]
    async fn find_recent(
        &self,
        channel: &str,
        window: &DiscoveryWindow,
    ) -> Result<Vec<DiscoveredItem>, Self::Error> {
        let query = format!("site:youtube.com {channel}");
        let count = self.count.to_string();

        let resp = self
            .client
            .get(Self::SEARCH_URL)
            .header("X-Subscription-Token", &self.api_key)
            .query(&[
                ("q", query.trim()),
                ("freshness", window.brave_freshness()),
                ("count", count.as_str()),
            ])
            .timeout(Self::TIMEOUT)
            .send()
            .await
            .inspect_err(|e| tracing::error!(error = %e, "Failed to make http request"))?;

        if !resp.status().is_success() {
            return Err(Error::from_response(resp).await);
        }

        let found = items_from_results(resp.json::<BraveVideoResponse>().await?, channel);
        let mut items = Vec::with_capacity(found.len());
        for item in found {
            let meta = self.lookup.metadata(item.id()).await;
            items.push(item.enriched(meta));
        }
        tracing::info!(count = items.len(), "Discovered videos");
        Ok(items)
    }
}
