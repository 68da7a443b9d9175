use std::path::PathBuf;

use digest_store::LedgerStore;

use crate::{
    artifacts::ArtifactStore,
    notify::DeliverySink,
    yt::{DiscoverySource, DiscoveryWindow, TranscriptSource},
    DigestProcessor, Summarizer,
};

pub struct DigestProcessorBuilder<L = (), D = (), T = (), S = (), K = ()> {
    workdir: PathBuf,
    ledger_store: L,
    discovery: D,
    transcripts: T,
    summarizer: S,
    sink: K,
    channels: Vec<String>,
    window: DiscoveryWindow,
}

impl DigestProcessorBuilder {
    /// `workdir` is the root that `transcripts/` and `summaries/` are written under.
    pub fn new(workdir: impl Into<PathBuf>) -> Self {
        Self {
            workdir: workdir.into(),
            ledger_store: (),
            discovery: (),
            transcripts: (),
            summarizer: (),
            sink: (),
            channels: Vec::new(),
            window: DiscoveryWindow::default(),
        }
    }
}

impl<L, D, T, S, K> DigestProcessorBuilder<L, D, T, S, K> {
    pub fn ledger_store<L2: LedgerStore>(self, ledger_store: L2) -> DigestProcessorBuilder<L2, D, T, S, K> {
        DigestProcessorBuilder {
            workdir: self.workdir,
            ledger_store,
            discovery: self.discovery,
            transcripts: self.transcripts,
            summarizer: self.summarizer,
            sink: self.sink,
            channels: self.channels,
            window: self.window,
        }
    }

    pub fn discovery<D2: DiscoverySource + Send + Sync + 'static>(
        self,
        discovery: D2,
    ) -> DigestProcessorBuilder<L, D2, T, S, K> {
        DigestProcessorBuilder {
            workdir: self.workdir,
            ledger_store: self.ledger_store,
            discovery,
            transcripts: self.transcripts,
            summarizer: self.summarizer,
            sink: self.sink,
            channels: self.channels,
            window: self.window,
        }
    }

    pub fn transcripts<T2: TranscriptSource + Send + Sync + 'static>(
        self,
        transcripts: T2,
    ) -> DigestProcessorBuilder<L, D, T2, S, K> {
        DigestProcessorBuilder {
            workdir: self.workdir,
            ledger_store: self.ledger_store,
            discovery: self.discovery,
            transcripts,
            summarizer: self.summarizer,
            sink: self.sink,
            channels: self.channels,
            window: self.window,
        }
    }

    pub fn summarizer<S2: Summarizer + Send + Sync + 'static>(
        self,
        summarizer: S2,
    ) -> DigestProcessorBuilder<L, D, T, S2, K> {
        DigestProcessorBuilder {
            workdir: self.workdir,
            ledger_store: self.ledger_store,
            discovery: self.discovery,
            transcripts: self.transcripts,
            summarizer,
            sink: self.sink,
            channels: self.channels,
            window: self.window,
        }
    }

    pub fn sink<K2: DeliverySink + Send + Sync + 'static>(
        self,
        sink: K2,
    ) -> DigestProcessorBuilder<L, D, T, S, K2> {
        DigestProcessorBuilder {
            workdir: self.workdir,
            ledger_store: self.ledger_store,
            discovery: self.discovery,
            transcripts: self.transcripts,
            summarizer: self.summarizer,
            sink,
            channels: self.channels,
            window: self.window,
        }
    }

    /// Channel handles (`@name`) or URLs to scan, in processing order.
    pub fn channels<I, C>(mut self, channels: I) -> Self
    where
        I: IntoIterator<Item = C>,
        C: Into<String>,
    {
        self.channels = channels.into_iter().map(Into::into).collect();
        self
    }

    pub fn window(mut self, window: DiscoveryWindow) -> Self {
        self.window = window;
        self
    }
}

// Discovery is left unconstrained so single-video runs can skip it.
impl<L, D, T, S, K> DigestProcessorBuilder<L, D, T, S, K>
where
    L: LedgerStore,
    T: TranscriptSource + Send + Sync + 'static,
    S: Summarizer + Send + Sync + 'static,
    K: DeliverySink + Send + Sync + 'static,
{
    /// Loads the ledger and assembles the processor.
    pub fn build(self) -> DigestProcessor<L, D, T, S, K> {
        let ledger = self.ledger_store.load();
        tracing::debug!(count = ledger.len(), "Loaded processed ledger");

        DigestProcessor {
            ledger_store: self.ledger_store,
            ledger,
            discovery: self.discovery,
            transcripts: self.transcripts,
            summarizer: self.summarizer,
            sink: self.sink,
            artifacts: ArtifactStore::new(&self.workdir),
            channels: self.channels,
            window: self.window,
        }
    }
}
