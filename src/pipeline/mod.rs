//! Generic multi-stage bounded pipeline.
//!
//! A pipeline is a fixed ordered sequence of stages, fronted by a source and
//! tailed by a sink, wired together with unbuffered hand-off channels so
//! that a slow stage throttles its producers (cooperative backpressure).
//! Cancellation is carried by a `tokio_util::sync::CancellationToken`; every
//! suspension point races its channel operation against the token.

mod error;
mod payload;
mod runtime;
mod stage;

pub use error::Error;
pub use payload::Payload;
pub use runtime::{Pipeline, Sink, Source};
pub use stage::{Fifo, FixedWorkerPool, Outcome, Processor, StageRunner};
