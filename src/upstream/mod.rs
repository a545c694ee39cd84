//! Upstream HTTP client: fetches product catalogs and
//! manufacturer availability from a flaky upstream, coping with its
//! deliberate error-injection and empty-body behaviour.

mod client;
mod error;
mod model;
mod payload;

pub use client::Client;
pub use error::Error;
pub use model::{AvailabilityItem, Product};
pub use payload::decode_status;

#[cfg(test)]
mod tests;
