use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;

use crate::pipeline::{Payload, Sink};

/// Tallies items that reach the end of a pipeline. Shares its counter with
/// the caller so the count survives after the sink itself is dropped.
#[derive(Clone, Default)]
pub struct CountingSink {
    count: Arc<AtomicUsize>,
}

impl CountingSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn count(&self) -> usize {
        self.count.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Sink for CountingSink {
    async fn consume(&mut self, _payload: &dyn Payload) -> Result<(), anyhow::Error> {
        self.count.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}
