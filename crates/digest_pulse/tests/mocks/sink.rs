use std::sync::{
    atomic::{AtomicUsize, Ordering},
    Arc, Mutex,
};
use digest_pulse::notify::{DeliverySink, OutgoingMessage};

#[derive(Clone, Default)]
pub struct MockSink {
    pub sent: Arc<Mutex<Vec<OutgoingMessage>>>,
    pub fail_with: Option<String>,
    /// 1-based send call that panics instead of sending.
    pub panic_on_call: Option<usize>,
    /// 1-based send call that never completes.
    pub hang_on_call: Option<usize>,
    calls: Arc<AtomicUsize>,
}

impl MockSink {
    pub fn failing(msg: &str) -> Self {
        Self {
            fail_with: Some(msg.to_string()),
            ..Default::default()
        }
    }

    pub fn panicking_on(call: usize) -> Self {
        Self {
            panic_on_call: Some(call),
            ..Default::default()
        }
    }

    pub fn hanging_on(call: usize) -> Self {
        Self {
            hang_on_call: Some(call),
            ..Default::default()
        }
    }
}

impl DeliverySink for MockSink {
    type Error = anyhow::Error;

    async fn send(&self, message: &OutgoingMessage) -> Result<(), Self::Error> {
        let call = self.calls.fetch_add(1, Ordering::SeqCst) + 1;
        if self.panic_on_call == Some(call) {
            panic!("sink blew up on call {call}");
        }
        if self.hang_on_call == Some(call) {
            std::future::pending::<()>().await;
        }
        if let Some(ref msg) = self.fail_with {
            return Err(anyhow::anyhow!("{}", msg));
        }
        self.sent.lock().unwrap().push(message.clone());
        Ok(())
    }
}
