pub mod discovery;
pub mod ledger;
pub mod sink;
pub mod summarizer;
pub mod transcripts;
