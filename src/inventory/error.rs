use thiserror::Error;
use uuid::Uuid;

/// Errors surfaced by the inventory store.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    #[error("store: unknown product id {0}")]
    UnknownProductId(Uuid),

    #[error("store: no data for category `{0}`")]
    NoDataForCategory(String),

    #[error("store: availability for unknown product (api_id `{0}`)")]
    AvailabilityForUnknownProduct(String),

    #[error("store: unknown availability id {0}")]
    UnknownAvailabilityId(Uuid),
}
