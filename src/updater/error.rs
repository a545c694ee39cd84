use thiserror::Error;

/// Errors that can abort an update round.
#[derive(Error, Debug)]
pub enum Error {
    /// Every configured category failed to fetch; a round otherwise
    /// tolerates individual category failures.
    #[error("updater: all {attempted} categories failed to fetch: {}", join(.causes))]
    AllCategoriesFailed {
        attempted: usize,
        causes: Vec<(String, crate::upstream::Error)>,
    },

    /// A manufacturer's availability fetch failed with something other than
    /// the two swallowed transient signals.
    #[error("updater: availability fetch for {manufacturer} failed: {source}")]
    AvailabilityFetch {
        manufacturer: String,
        #[source]
        source: crate::upstream::Error,
    },

    #[error(transparent)]
    Pipeline(#[from] crate::pipeline::Error),
}

fn join(causes: &[(String, crate::upstream::Error)]) -> String {
    causes
        .iter()
        .map(|(category, err)| format!("{category}: {err}"))
        .collect::<Vec<_>>()
        .join("; ")
}
