//! Service group: runs a fixed set of long-lived services concurrently,
//! cancelling all of them on the first failure.

mod error;
mod group;

pub use error::Error;
pub use group::Group;

use async_trait::async_trait;
use tokio_util::sync::CancellationToken;

/// A long-lived service member of a `Group`.
#[async_trait]
pub trait Service: Send + Sync {
    fn name(&self) -> &str;

    /// Runs until `token` is cancelled or the service fails on its own.
    /// Returning `Ok(())` after external cancellation is expected; any other
    /// return is treated as a failure that cancels the rest of the group.
    async fn run(&self, token: CancellationToken) -> Result<(), anyhow::Error>;
}
