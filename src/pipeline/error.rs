use thiserror::Error;

/// Errors surfaced by the pipeline runtime. Every variant wraps the cause
/// that actually produced it rather than collapsing to a generic message.
#[derive(Error, Debug)]
pub enum Error {
    #[error("pipeline: source failed: {0}")]
    Source(#[source] anyhow::Error),

    #[error("pipeline: stage {stage} failed: {source}")]
    Stage {
        stage: usize,
        #[source]
        source: anyhow::Error,
    },

    #[error("pipeline: sink failed: {0}")]
    Sink(#[source] anyhow::Error),
}
