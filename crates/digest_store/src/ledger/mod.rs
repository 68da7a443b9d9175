use std::collections::BTreeSet;

pub mod json_file;

/// Durable source of the processed-ID set.
///
/// `load` never fails: implementations recover from missing or malformed
/// state by returning an empty ledger. `save` reports failures, but callers
/// are expected to log them and carry on.
pub trait LedgerStore {
    fn load(&self) -> ProcessedLedger;

    fn save(&self, ledger: &ProcessedLedger) -> anyhow::Result<()>;
}

impl<T: LedgerStore> LedgerStore for &T {
    fn load(&self) -> ProcessedLedger {
        (**self).load()
    }

    fn save(&self, ledger: &ProcessedLedger) -> anyhow::Result<()> {
        (**self).save(ledger)
    }
}

/// Set of video IDs that completed the pipeline (summary delivered).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProcessedLedger {
    ids: BTreeSet<String>,
}

impl ProcessedLedger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contains(&self, id: &str) -> bool {
        self.ids.contains(id)
    }

    /// Records `id` as delivered. Returns `false` if it was already present.
    pub fn record(&mut self, id: impl Into<String>) -> bool {
        self.ids.insert(id.into())
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.ids.iter().map(String::as_str)
    }
}

impl<S: Into<String>> FromIterator<S> for ProcessedLedger {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        ProcessedLedger {
            ids: iter.into_iter().map(Into::into).collect(),
        }
    }
}
