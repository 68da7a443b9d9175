use std::{
    collections::HashMap,
    sync::{Arc, Mutex},
};
use digest_pulse::yt::TranscriptSource;

/// Serves a fixed transcript per video ID; unknown IDs have no captions.
#[derive(Clone, Default)]
pub struct MockTranscripts {
    pub transcripts: HashMap<String, String>,
    pub calls: Arc<Mutex<Vec<String>>>,
    pub fail_with: Option<String>,
}

impl MockTranscripts {
    pub fn new<'a>(entries: impl IntoIterator<Item = (&'a str, &'a str)>) -> Self {
        Self {
            transcripts: entries
                .into_iter()
                .map(|(id, text)| (id.to_string(), text.to_string()))
                .collect(),
            ..Default::default()
        }
    }

    pub fn failing(msg: &str) -> Self {
        Self {
            fail_with: Some(msg.to_string()),
            ..Default::default()
        }
    }
}

impl TranscriptSource for MockTranscripts {
    type Error = anyhow::Error;

    async fn fetch(&self, video_id: &str) -> Result<Option<String>, Self::Error> {
        self.calls.lock().unwrap().push(video_id.to_string());
        if let Some(ref msg) = self.fail_with {
            return Err(anyhow::anyhow!("{}", msg));
        }
        Ok(self.transcripts.get(video_id).cloned())
    }
}
