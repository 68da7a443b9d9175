//! # Ledger Module
//!
//! This module keeps track of which video IDs have already made it all the way
//! through the digest pipeline, so that a later run does not deliver the same
//! summary twice.
//!
//! The ledger is loaded once when a run starts and persisted once when it ends.
//! A missing or corrupt ledger file is never fatal: it is treated as empty.

mod ledger;

pub use ledger::json_file::JsonFileLedger;
pub use ledger::{LedgerStore, ProcessedLedger};
