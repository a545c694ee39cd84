use std::time::Duration;

use tokio_util::sync::CancellationToken;
use tracing::warn;

use super::error::Error;
use super::model::{AvailabilityEnvelope, AvailabilityItem, Product};

const ERROR_MODES_HEADER: &str = "X-Error-Modes-Active";

/// HTTP client for the upstream product/availability API.
///
/// `list_products` is a single attempt (the products endpoint is observed
/// stable). `get_availability` is a bounded concurrent hedged retry: the
/// first success wins and cancels the remaining in-flight attempts.
#[derive(Clone)]
pub struct Client {
    http: reqwest::Client,
    base_url: String,
    hedge_width: usize,
}

impl Client {
    pub fn new(base_url: impl Into<String>, timeout: Duration, hedge_width: usize) -> Self {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .expect("upstream: failed to build reqwest client");
        let mut base_url = base_url.into();
        if !base_url.ends_with('/') {
            base_url.push('/');
        }
        Self {
            http,
            base_url,
            hedge_width: hedge_width.max(1),
        }
    }

    /// `GET {base_url}/products/{category}`. Single attempt, selectable
    /// against `token`.
    pub async fn list_products(
        &self,
        category: &str,
        token: &CancellationToken,
    ) -> Result<Vec<Product>, Error> {
        let url = format!("{}products/{}", self.base_url, category.to_lowercase());
        let response = tokio::select! {
            biased;
            _ = token.cancelled() => return Err(Error::Cancelled),
            result = self.http.get(&url).send() => result?,
        };
        let products: Vec<Product> = decode_json(response).await?;
        Ok(products)
    }

    /// `GET {base_url}/availability/{manufacturer}`, hedged across up to
    /// `hedge_width` concurrent attempts. Returns every item's raw payload
    /// paired with its `api_id`; if all attempts fail, aggregates every
    /// observed error rather than reporting only the last one. Every
    /// attempt is also selectable against `token`.
    pub async fn get_availability(
        &self,
        manufacturer: &str,
        token: &CancellationToken,
    ) -> Result<Vec<AvailabilityItem>, Error> {
        let url = format!(
            "{}availability/{}",
            self.base_url,
            manufacturer.to_lowercase()
        );

        let winner = CancellationToken::new();
        let mut attempts = tokio::task::JoinSet::new();
        for _ in 0..self.hedge_width {
            let http = self.http.clone();
            let url = url.clone();
            let winner = winner.clone();
            let token = token.clone();
            attempts.spawn(async move {
                tokio::select! {
                    biased;
                    _ = winner.cancelled() => Err(Error::Decode(anyhow::anyhow!("hedge attempt cancelled"))),
                    _ = token.cancelled() => Err(Error::Cancelled),
                    result = fetch_availability(&http, &url) => result,
                }
            });
        }

        let mut causes = Vec::with_capacity(self.hedge_width);
        let mut success = None;
        while let Some(joined) = attempts.join_next().await {
            match joined {
                Ok(Ok(envelope)) => {
                    success = Some(envelope);
                    winner.cancel();
                    break;
                }
                Ok(Err(err)) => {
                    if !err.is_transient() {
                        warn!(%manufacturer, %err, "upstream: non-transient failure on hedged attempt");
                    }
                    causes.push(err);
                }
                Err(join_err) => {
                    causes.push(Error::Decode(anyhow::anyhow!(join_err)));
                }
            }
        }
        winner.cancel();
        attempts.shutdown().await;

        match success {
            Some(envelope) => Ok(envelope.response),
            None => Err(Error::AllAttemptsFailed {
                attempted: self.hedge_width,
                causes,
            }),
        }
    }
}

async fn fetch_availability(
    http: &reqwest::Client,
    url: &str,
) -> Result<AvailabilityEnvelope, Error> {
    let response = http.get(url).send().await?;
    decode_json(response).await
}

async fn decode_json<T: serde::de::DeserializeOwned>(
    response: reqwest::Response,
) -> Result<T, Error> {
    if response
        .headers()
        .get(ERROR_MODES_HEADER)
        .is_some_and(|v| !v.as_bytes().is_empty())
    {
        return Err(Error::ModeActive);
    }

    let status = response.status();
    let body = response.bytes().await?;

    if body.is_empty() {
        return Err(Error::EmptyBody);
    }

    if !status.is_success() {
        return Err(Error::Status {
            status: status.as_u16(),
            body: String::from_utf8_lossy(&body).into_owned(),
        });
    }

    serde_json::from_slice(&body).map_err(|e| Error::Decode(anyhow::anyhow!(e)))
}
