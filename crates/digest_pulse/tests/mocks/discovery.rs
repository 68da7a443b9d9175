use std::{
    collections::HashMap,
    sync::{Arc, Mutex},
};
use digest_pulse::{
    types::DiscoveredItem,
    yt::{DiscoverySource, DiscoveryWindow},
};

/// Per-channel canned discovery results. Channels listed in `failing_channels`
/// error out; channels with no entry have no new videos.
#[derive(Clone, Default)]
pub struct MockDiscovery {
    pub items: HashMap<String, Vec<DiscoveredItem>>,
    pub failing_channels: Vec<String>,
    pub calls: Arc<Mutex<Vec<(String, u32)>>>,
}

impl MockDiscovery {
    pub fn with_channel(mut self, channel: &str, items: Vec<DiscoveredItem>) -> Self {
        self.items.insert(channel.to_string(), items);
        self
    }

    pub fn failing_for(mut self, channel: &str) -> Self {
        self.failing_channels.push(channel.to_string());
        self
    }
}

impl DiscoverySource for MockDiscovery {
    type Error = anyhow::Error;

    async fn find_recent(
        &self,
        channel: &str,
        window: &DiscoveryWindow,
    ) -> Result<Vec<DiscoveredItem>, Self::Error> {
        self.calls
            .lock()
            .unwrap()
            .push((channel.to_string(), window.hours()));
        if self.failing_channels.iter().any(|c| c == channel) {
            return Err(anyhow::anyhow!("Discovery unavailable for {channel}"));
        }
        Ok(self.items.get(channel).cloned().unwrap_or_default())
    }
}
