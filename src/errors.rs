//! Top-level error type gluing the per-layer errors together for `main`.

use thiserror::Error;

use crate::{inventory, pipeline, service, upstream};

#[derive(Error, Debug)]
pub enum AppError {
    #[error("config: {0}")]
    Config(#[from] config::ConfigError),

    #[error("config: {0}")]
    Validation(#[from] validator::ValidationErrors),

    #[error(transparent)]
    Upstream(#[from] upstream::Error),

    #[error(transparent)]
    Inventory(#[from] inventory::Error),

    #[error(transparent)]
    Pipeline(#[from] pipeline::Error),

    #[error(transparent)]
    Service(#[from] service::Error),

    #[error("io: {0}")]
    Io(#[from] std::io::Error),
}
