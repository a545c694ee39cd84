use thiserror::Error;

/// Aggregate error from a `Group::run`, carrying the name and cause of every
/// member that failed, not just the last one.
#[derive(Error, Debug)]
#[error("service group: {} member(s) failed: {}", .failures.len(), join(.failures))]
pub struct Error {
    pub failures: Vec<(String, anyhow::Error)>,
}

fn join(failures: &[(String, anyhow::Error)]) -> String {
    failures
        .iter()
        .map(|(name, err)| format!("{name}: {err}"))
        .collect::<Vec<_>>()
        .join("; ")
}
