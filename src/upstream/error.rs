use thiserror::Error;

/// Errors surfaced by the upstream client.
#[derive(Error, Debug)]
pub enum Error {
    /// The upstream signalled its deliberate error-injection mode via the
    /// `X-Error-Modes-Active` header. Transient; retryable.
    #[error("upstream: error-modes-active signalled by upstream")]
    ModeActive,

    /// The upstream returned a zero-length body. Transient; retryable.
    #[error("upstream: empty response body")]
    EmptyBody,

    /// A non-2xx HTTP response that is not one of the two transient kinds
    /// above. Not retried.
    #[error("upstream: http status {status} with body {body}")]
    Status { status: u16, body: String },

    /// Transport-level failure (connection refused, DNS, timeout, ...).
    #[error("upstream: transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// The response body did not decode as the expected shape.
    #[error("upstream: decode error: {0}")]
    Decode(#[source] anyhow::Error),

    /// All `n` hedged attempts failed; carries every observed error rather
    /// than only the last one.
    #[error("upstream: all {attempted} hedged attempts failed: {}", join_causes(.causes))]
    AllAttemptsFailed {
        attempted: usize,
        causes: Vec<Error>,
    },

    /// The calling context was cancelled before the request completed.
    #[error("upstream: request cancelled")]
    Cancelled,
}

impl Error {
    /// Whether this error represents one of the two upstream-documented
    /// transient signals, eligible for hedged retry / round-level swallow.
    pub fn is_transient(&self) -> bool {
        matches!(self, Error::ModeActive | Error::EmptyBody)
    }
}

fn join_causes(causes: &[Error]) -> String {
    causes
        .iter()
        .map(|e| e.to_string())
        .collect::<Vec<_>>()
        .join("; ")
}
