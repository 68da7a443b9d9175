//! # Yt Parser
//!
//! This module provides functionality to pull caption data out of YouTube
//! watch pages: the embedded `ytInitialPlayerResponse` JSON, the caption
//! tracks it lists, and the timed-text XML those tracks point to.

use std::{ops::Deref, sync::LazyLock};

use regex::Regex;
use serde::{de::DeserializeOwned, Deserialize};

use crate::error::Error;

static YT_PLAYER_RESPONSE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?s)var\s+ytInitialPlayerResponse\s*=\s*(\{.*?\});\s*(?:var\s|</script>)")
        .unwrap()
});

static TIMEDTEXT_SEGMENT_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)<text\b[^>]*>(.*?)</text>").unwrap());

static NUMERIC_ENTITY_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"&#(x[0-9a-fA-F]+|[0-9]+);").unwrap());

static VIDEO_ID_FROM_URL_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?:youtube\.com/watch\?v=|youtu\.be/)([a-zA-Z0-9_-]{11})").unwrap()
});

static RAW_VIDEO_ID_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[a-zA-Z0-9_-]{11}$").unwrap());

static WATCH_URL_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"https?://(?:www\.)?youtube\.com/watch\?v=([a-zA-Z0-9_-]{11})").unwrap()
});

static HANDLE_FROM_URL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"/@([A-Za-z0-9._-]+)").unwrap());

/// A caption track advertised by the player response.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CaptionTrack {
    pub base_url: String,
    #[serde(default)]
    pub language_code: String,
    /// `Some("asr")` for auto-generated tracks.
    pub kind: Option<String>,
}

impl CaptionTrack {
    pub fn is_generated(&self) -> bool {
        self.kind.as_deref() == Some("asr")
    }
}

/// Lists the caption tracks in a parsed player response.
///
/// An empty list means captions are disabled or missing for the video, which
/// is not an error.
pub fn caption_tracks(player_response: &serde_json::Value) -> Vec<CaptionTrack> {
    player_response["captions"]["playerCaptionsTracklistRenderer"]["captionTracks"]
        .as_array()
        .map(|tracks| {
            tracks
                .iter()
                .filter_map(|t| serde_json::from_value::<CaptionTrack>(t.clone()).ok())
                .collect()
        })
        .unwrap_or_default()
}

/// Prefers a manually authored track over an auto-generated one; otherwise
/// keeps YouTube's ordering.
pub fn pick_caption_track(tracks: &[CaptionTrack]) -> Option<&CaptionTrack> {
    tracks
        .iter()
        .find(|t| !t.is_generated())
        .or_else(|| tracks.first())
}

/// Joins the text segments of a timed-text XML document into one string.
/// Returns `None` when there is no non-whitespace text.
pub fn parse_timedtext(xml: &str) -> Option<String> {
    let text = TIMEDTEXT_SEGMENT_RE
        .captures_iter(xml)
        .filter_map(|cap| cap.get(1))
        .map(|m| unescape_xml(m.as_str()))
        .flat_map(|segment| {
            segment
                .split_whitespace()
                .map(str::to_owned)
                .collect::<Vec<_>>()
        })
        .collect::<Vec<_>>()
        .join(" ");

    (!text.is_empty()).then_some(text)
}

/// Resolves XML entities. YouTube double-escapes segment text
/// (`&amp;#39;`), so `&amp;` is resolved both before and after the rest.
fn unescape_xml(s: &str) -> String {
    let s = s.replace("&amp;", "&");
    let s = NUMERIC_ENTITY_RE.replace_all(&s, |caps: &regex::Captures| {
        let code = &caps[1];
        let value = match code.strip_prefix('x') {
            Some(hex) => u32::from_str_radix(hex, 16).ok(),
            None => code.parse::<u32>().ok(),
        };
        value
            .and_then(char::from_u32)
            .map(String::from)
            .unwrap_or_else(|| caps[0].to_string())
    });
    s.replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&apos;", "'")
        .replace("&amp;", "&")
}

/// Extracts an 11-character video ID from a watch URL, a `youtu.be` link, or
/// a bare ID.
pub fn video_id_from_input(input: &str) -> Option<String> {
    let input = input.trim();
    if input.is_empty() {
        return None;
    }
    if let Some(m) = VIDEO_ID_FROM_URL_RE.captures(input).and_then(|c| c.get(1)) {
        return Some(m.as_str().to_string());
    }
    RAW_VIDEO_ID_RE
        .is_match(input)
        .then(|| input.to_string())
}

/// Video IDs from command-line arguments, each of which may list several
/// videos separated by commas. Blank entries are ignored; the first entry that
/// is not a video is returned as the error.
pub fn video_ids_from_args<S: AsRef<str>>(args: &[S]) -> Result<Vec<String>, String> {
    args.iter()
        .flat_map(|arg| arg.as_ref().split(','))
        .map(str::trim)
        .filter(|input| !input.is_empty())
        .map(|input| video_id_from_input(input).ok_or_else(|| input.to_string()))
        .collect()
}

/// Video ID of a `youtube.com/watch?v=` URL, rejecting shorts, channels and
/// other hosts.
pub fn video_id_from_watch_url(url: &str) -> Option<&str> {
    WATCH_URL_RE
        .captures(url)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str())
}

/// `@handle` from a channel URL such as `https://www.youtube.com/@Name`.
pub fn handle_from_channel_url(url: &str) -> Option<String> {
    HANDLE_FROM_URL_RE
        .captures(url)
        .and_then(|c| c.get(1))
        .map(|m| format!("@{}", m.as_str()))
}

pub struct YtHtmlDocument(String);

impl Deref for YtHtmlDocument {
    type Target = String;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl YtHtmlDocument {
    pub fn new(doc: String) -> Self {
        YtHtmlDocument(doc)
    }

    /// Deserializes the `ytInitialPlayerResponse` object embedded in a watch page.
    pub fn player_response<T>(&self) -> Result<T, Error>
    where
        T: DeserializeOwned,
    {
        YT_PLAYER_RESPONSE_RE
            .captures(self)
            .and_then(|cap| cap.get(1))
            .and_then(|m| serde_json::from_str(m.as_str()).ok())
            .ok_or(Error::ParseError(
                "Failed to extract ytInitialPlayerResponse from the page's script tag",
            ))
    }
}

impl From<String> for YtHtmlDocument {
    fn from(value: String) -> Self {
        YtHtmlDocument(value)
    }
}
