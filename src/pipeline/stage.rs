use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::{mpsc, Mutex as AsyncMutex};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use super::error::Error;
use super::payload::Payload;

/// Outcome of processing one payload: either a (possibly different) payload
/// to forward to the next stage, or a signal to drop the input — the
/// runtime calls `mark_processed` on the dropped payload, mirroring the Go
/// processor's nil-output convention.
pub enum Outcome {
    Forward(Box<dyn Payload>),
    Drop(Box<dyn Payload>),
}

/// User-supplied transformation applied to one payload.
#[async_trait]
pub trait Processor: Send + Sync {
    async fn process(&self, payload: Box<dyn Payload>) -> Result<Outcome, anyhow::Error>;
}

/// Shared wiring handed to every worker task of a stage.
pub(crate) struct StageIo {
    pub stage: usize,
    pub input: Arc<AsyncMutex<mpsc::Receiver<Box<dyn Payload>>>>,
    pub output: mpsc::Sender<Box<dyn Payload>>,
    pub errors: mpsc::Sender<Error>,
    pub token: CancellationToken,
}

impl Clone for StageIo {
    fn clone(&self) -> Self {
        Self {
            stage: self.stage,
            input: self.input.clone(),
            output: self.output.clone(),
            errors: self.errors.clone(),
            token: self.token.clone(),
        }
    }
}

/// A stage operator mode: how many FIFO workers share the stage's input.
pub trait StageRunner: Send + Sync {
    fn worker_count(&self) -> usize;
    fn processor(&self) -> Arc<dyn Processor>;
}

/// One logical worker, strictly order-preserving within the stage.
pub struct Fifo {
    processor: Arc<dyn Processor>,
}

impl Fifo {
    pub fn new(processor: Arc<dyn Processor>) -> Self {
        Self { processor }
    }
}

impl StageRunner for Fifo {
    fn worker_count(&self) -> usize {
        1
    }
    fn processor(&self) -> Arc<dyn Processor> {
        self.processor.clone()
    }
}

/// `k` FIFO workers sharing the stage's input channel and feeding the same
/// output channel. Ordering is not preserved across workers.
pub struct FixedWorkerPool {
    processor: Arc<dyn Processor>,
    workers: usize,
}

impl FixedWorkerPool {
    pub fn new(processor: Arc<dyn Processor>, workers: usize) -> Self {
        assert!(workers > 0, "pipeline: FixedWorkerPool workers must be > 0");
        Self { processor, workers }
    }
}

impl StageRunner for FixedWorkerPool {
    fn worker_count(&self) -> usize {
        self.workers
    }
    fn processor(&self) -> Arc<dyn Processor> {
        self.processor.clone()
    }
}

/// Runs a single FIFO worker loop until the input channel closes or
/// cancellation is observed. Every blocking point races its channel
/// operation against `token.cancelled()`.
pub(crate) async fn run_fifo_worker(io: StageIo, processor: Arc<dyn Processor>) {
    loop {
        let payload = {
            let mut input = io.input.lock().await;
            tokio::select! {
                biased;
                _ = io.token.cancelled() => return,
                item = input.recv() => item,
            }
        };
        let Some(payload) = payload else {
            return;
        };

        let outcome = tokio::select! {
            biased;
            _ = io.token.cancelled() => return,
            result = processor.process(payload) => result,
        };

        match outcome {
            Ok(Outcome::Forward(output)) => {
                tokio::select! {
                    biased;
                    _ = io.token.cancelled() => return,
                    send_result = io.output.send(output) => {
                        if send_result.is_err() {
                            return;
                        }
                    }
                }
            }
            Ok(Outcome::Drop(dropped)) => {
                dropped.mark_processed();
            }
            Err(err) => {
                let _ = io.errors.try_send(Error::Stage {
                    stage: io.stage,
                    source: err,
                });
                return;
            }
        }
    }
}
