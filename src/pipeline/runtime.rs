use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::{mpsc, Mutex as AsyncMutex};
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use super::error::Error;
use super::payload::Payload;
use super::stage::{run_fifo_worker, StageIo, StageRunner};

/// Feeds payloads into stage 0 of a pipeline.
#[async_trait]
pub trait Source: Send {
    /// Advances to the next payload. Returns `false` on exhaustion.
    async fn next(&mut self) -> bool;

    /// Returns the payload staged by the most recent `true` from `next`.
    fn payload(&mut self) -> Box<dyn Payload>;

    /// A source-level error observed after exhaustion, if any.
    fn error(&self) -> Option<anyhow::Error> {
        None
    }
}

/// Consumes payloads draining the last stage.
#[async_trait]
pub trait Sink: Send {
    async fn consume(&mut self, payload: &dyn Payload) -> Result<(), anyhow::Error>;
}

/// A fixed ordered sequence of stages. Allocates `stages.len() + 1`
/// hand-off channels and runs the source, every stage, and the sink as peer
/// tasks. The channel buffer of 1 is the smallest tokio's mpsc allows and
/// still provides backpressure: a stage cannot outrun its downstream
/// consumer by more than one in-flight item.
const HANDOFF_BUFFER: usize = 1;

pub struct Pipeline {
    stages: Vec<Box<dyn StageRunner>>,
}

impl Pipeline {
    pub fn new(stages: Vec<Box<dyn StageRunner>>) -> Self {
        Self { stages }
    }

    /// Runs the pipeline to completion. Returns the first error observed
    /// from any peer (source, stage, or sink), or `Ok(())` on a clean drain.
    /// Cancelling `token` externally causes this to return promptly.
    pub async fn process(
        &self,
        mut source: Box<dyn Source>,
        mut sink: Box<dyn Sink>,
        token: CancellationToken,
    ) -> Result<(), Error> {
        let n = self.stages.len();
        let mut senders = Vec::with_capacity(n + 1);
        let mut next_inputs: Vec<Arc<AsyncMutex<mpsc::Receiver<Box<dyn Payload>>>>> =
            Vec::with_capacity(n + 1);
        for _ in 0..=n {
            let (tx, rx) = mpsc::channel(HANDOFF_BUFFER);
            senders.push(tx);
            next_inputs.push(Arc::new(AsyncMutex::new(rx)));
        }

        let (error_tx, mut error_rx) = mpsc::channel::<Error>(n + 2);

        let mut handles = Vec::new();

        // Source worker: stage i reads next_inputs[i] and writes
        // senders[i+1]; the source writes senders[0] and the sink reads
        // next_inputs[n].
        {
            let out = senders[0].clone();
            let errors = error_tx.clone();
            let token = token.clone();
            handles.push(tokio::spawn(async move {
                run_source(&mut *source, out, errors, token).await;
            }));
        }

        // Stage workers.
        for (i, stage) in self.stages.iter().enumerate() {
            let processor = stage.processor();
            let worker_count = stage.worker_count();
            let input = next_inputs[i].clone();
            let output = senders[i + 1].clone();
            let errors = error_tx.clone();
            let stage_token = token.clone();

            for _ in 0..worker_count {
                let io = StageIo {
                    stage: i,
                    input: input.clone(),
                    output: output.clone(),
                    errors: errors.clone(),
                    token: stage_token.clone(),
                };
                let processor = processor.clone();
                handles.push(tokio::spawn(async move {
                    run_fifo_worker(io, processor).await;
                }));
            }
        }

        // Sink worker: owns the last receiver.
        let sink_input = next_inputs[n].clone();
        {
            let errors = error_tx.clone();
            let token = token.clone();
            handles.push(tokio::spawn(async move {
                run_sink(&mut *sink, sink_input, errors, token).await;
            }));
        }

        // Every channel's sender was handed to the task(s) that own it as a
        // clone; dropping the pipeline's own copies here is what lets each
        // channel actually close once its producing task(s) finish.
        drop(senders);
        drop(next_inputs);
        drop(error_tx);

        let watcher_token = token.clone();
        let error_watcher = tokio::spawn(async move {
            let mut first: Option<Error> = None;
            while let Some(err) = error_rx.recv().await {
                warn!(%err, "pipeline: peer reported an error");
                if first.is_none() {
                    first = Some(err);
                    watcher_token.cancel();
                }
            }
            first
        });

        for handle in handles {
            let _ = handle.await;
        }

        match error_watcher.await {
            Ok(Some(err)) => Err(err),
            Ok(None) => {
                debug!("pipeline: drained cleanly");
                Ok(())
            }
            Err(_) => Ok(()),
        }
    }
}

async fn run_source(
    source: &mut dyn Source,
    out: mpsc::Sender<Box<dyn Payload>>,
    errors: mpsc::Sender<Error>,
    token: CancellationToken,
) {
    while source.next().await {
        let payload = source.payload();
        tokio::select! {
            biased;
            _ = token.cancelled() => return,
            send_result = out.send(payload) => {
                if send_result.is_err() {
                    return;
                }
            }
        }
    }
    if let Some(err) = source.error() {
        let _ = errors.try_send(Error::Source(err));
    }
}

async fn run_sink(
    sink: &mut dyn Sink,
    input: Arc<AsyncMutex<mpsc::Receiver<Box<dyn Payload>>>>,
    errors: mpsc::Sender<Error>,
    token: CancellationToken,
) {
    let mut input = input.lock().await;
    loop {
        let payload = tokio::select! {
            biased;
            _ = token.cancelled() => return,
            item = input.recv() => item,
        };
        let Some(payload) = payload else {
            return;
        };
        match sink.consume(payload.as_ref()).await {
            Ok(()) => payload.mark_processed(),
            Err(err) => {
                let _ = errors.try_send(Error::Sink(err));
                return;
            }
        }
    }
}
