pub mod artifacts;
mod error;
mod llm;
pub mod markdown;
pub mod notify;
pub mod parser;
mod processor;
pub mod render;
pub mod tracing;
pub mod types;
pub mod yt;

pub use error::Error;
pub use llm::{gemini, openai};
pub use llm::summarizer::{Summarizer, SummaryBackend, SummaryResponse, SUMMARY_PROMPT};
pub use llm::transcriber::{TranscribeResponse, Transcriber};
pub use processor::{
    builder::DigestProcessorBuilder, until_shutdown, DigestProcessor, ItemOutcome, RunReport,
    SkipReason,
};
