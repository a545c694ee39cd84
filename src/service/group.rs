use std::sync::Arc;

use tokio_util::sync::CancellationToken;
use tracing::{error, info};

use super::{Error, Service};

/// A fixed list of services run as peers. `run` derives a child
/// cancellation token, starts every member concurrently, and on the first
/// member failure cancels the child token and waits for the rest to return.
/// On external cancellation of `parent` it does the same and returns `Ok`.
pub struct Group {
    members: Vec<Arc<dyn Service>>,
}

impl Group {
    pub fn new(members: Vec<Arc<dyn Service>>) -> Self {
        Self { members }
    }

    pub async fn run(&self, parent: CancellationToken) -> Result<(), Error> {
        let child = parent.child_token();
        let mut handles = Vec::with_capacity(self.members.len());

        for member in &self.members {
            let member = member.clone();
            let token = child.clone();
            handles.push(tokio::spawn(async move {
                let name = member.name().to_string();
                let result = member.run(token).await;
                (name, result)
            }));
        }

        let mut failures = Vec::new();
        for handle in handles {
            match handle.await {
                Ok((name, Ok(()))) => {
                    info!(service = %name, "service stopped cleanly");
                }
                Ok((name, Err(err))) => {
                    error!(service = %name, %err, "service failed, cancelling group");
                    child.cancel();
                    failures.push((name, err));
                }
                Err(join_err) => {
                    child.cancel();
                    failures.push(("<unknown>".to_string(), anyhow::anyhow!(join_err)));
                }
            }
        }

        if failures.is_empty() {
            Ok(())
        } else {
            Err(Error { failures })
        }
    }
}
