/// Failures of the HTTP collaborators (discovery, captions, LLM, Telegram).
///
/// The processor never propagates these past the item or channel they
/// belong to; they exist so each call site can log what actually went wrong.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("HTTP error: {0}")]
    Request(#[from] reqwest::Error),
    #[error("API error: {status} - {message}")]
    Api { status: u16, message: String },
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Parse error: {0}")]
    ParseError(&'static str),
}

impl Error {
    /// Turns a non-success response into [`Error::Api`], keeping the body for the logs.
    pub(crate) async fn from_response(resp: reqwest::Response) -> Self {
        let status = resp.status().as_u16();
        let message = resp.text().await.unwrap_or_default();
        Error::Api { status, message }
    }
}
