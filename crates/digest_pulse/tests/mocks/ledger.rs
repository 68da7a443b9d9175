use std::sync::{Arc, Mutex};
use digest_store::{LedgerStore, ProcessedLedger};

/// In-memory ledger store that records every save.
#[derive(Clone, Default)]
pub struct MockLedgerStore {
    pub initial: Vec<String>,
    pub saves: Arc<Mutex<Vec<ProcessedLedger>>>,
    pub fail_with: Option<String>,
}

impl MockLedgerStore {
    pub fn with_processed(ids: &[&str]) -> Self {
        Self {
            initial: ids.iter().map(|id| id.to_string()).collect(),
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

impl LedgerStore for MockLedgerStore {
    fn load(&self) -> ProcessedLedger {
        self.initial.iter().cloned().collect()
    }

    fn save(&self, ledger: &ProcessedLedger) -> anyhow::Result<()> {
        if let Some(ref msg) = self.fail_with {
            return Err(anyhow::anyhow!("{}", msg));
        }
        self.saves.lock().unwrap().push(ledger.clone());
        Ok(())
    }
}
