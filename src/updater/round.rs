use std::sync::Arc;
use std::time::Instant;

use async_trait::async_trait;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};

use crate::inventory::Store;
use crate::pipeline::{FixedWorkerPool, Pipeline};
use crate::service;
use crate::upstream;

use super::error::Error;
use super::sink::CountingSink;
use super::source::{AvailabilitiesSource, ProductsSource};
use super::stages::{AvailabilityUpdater, DataPayloadDecoder, ProductUpdater};

/// The update orchestrator: runs one ingestion round immediately, then
/// one every `interval` until cancelled.
pub struct Updater {
    client: upstream::Client,
    store: Store,
    categories: Vec<String>,
    manufacturers: Vec<String>,
    workers: usize,
    interval: std::time::Duration,
}

impl Updater {
    pub fn new(
        client: upstream::Client,
        store: Store,
        categories: Vec<String>,
        manufacturers: Vec<String>,
        workers: usize,
        interval: std::time::Duration,
    ) -> Self {
        Self {
            client,
            store,
            categories,
            manufacturers,
            workers,
            interval,
        }
    }

    /// Runs one ingestion round: fetch every configured category and
    /// manufacturer, then drive both pipelines to completion. Exposed
    /// publicly so an embedder can trigger an out-of-band round.
    pub async fn run_round(&self, token: &CancellationToken) -> Result<(), Error> {
        let start = Instant::now();

        let products = self.fetch_products(token).await?;
        let fetch_products_elapsed = start.elapsed();

        let tick = Instant::now();
        let product_count = self.drive_product_pipeline(products, token).await?;
        let product_pipeline_elapsed = tick.elapsed();

        let tick = Instant::now();
        let availabilities = self.fetch_availabilities(token).await?;
        let fetch_availabilities_elapsed = tick.elapsed();

        let tick = Instant::now();
        let availability_count = self
            .drive_availability_pipeline(availabilities, token)
            .await?;
        let availability_pipeline_elapsed = tick.elapsed();

        info!(
            fetch_products_ms = fetch_products_elapsed.as_millis() as u64,
            fetch_availabilities_ms = fetch_availabilities_elapsed.as_millis() as u64,
            product_pipeline_ms = product_pipeline_elapsed.as_millis() as u64,
            availability_pipeline_ms = availability_pipeline_elapsed.as_millis() as u64,
            total_ms = start.elapsed().as_millis() as u64,
            processed_products = product_count,
            processed_availabilities = availability_count,
            "completed warehouse update"
        );
        Ok(())
    }

    /// Fetches every configured category in parallel. Aborts the round only
    /// if every category failed; otherwise logs and skips the failed ones.
    async fn fetch_products(
        &self,
        token: &CancellationToken,
    ) -> Result<Vec<Vec<upstream::Product>>, Error> {
        let fetches = self.categories.iter().map(|category| {
            let client = self.client.clone();
            let category = category.clone();
            let token = token.clone();
            async move {
                let result = client.list_products(&category, &token).await;
                (category, result)
            }
        });
        let results = futures::future::join_all(fetches).await;

        let mut batches = Vec::with_capacity(results.len());
        let mut causes = Vec::new();
        for (category, result) in results {
            match result {
                Ok(products) => batches.push(products),
                Err(err) => {
                    warn!(%category, %err, "updater: failed to fetch category");
                    causes.push((category, err));
                }
            }
        }

        if batches.is_empty() && !causes.is_empty() {
            return Err(Error::AllCategoriesFailed {
                attempted: causes.len(),
                causes,
            });
        }
        Ok(batches)
    }

    /// Fetches every configured manufacturer's availability in parallel.
    /// Swallows per-manufacturer failures whose every hedge attempt failed
    /// with a transient signal; any other failure is fatal to the round.
    async fn fetch_availabilities(
        &self,
        token: &CancellationToken,
    ) -> Result<Vec<Vec<upstream::AvailabilityItem>>, Error> {
        let fetches = self.manufacturers.iter().map(|manufacturer| {
            let client = self.client.clone();
            let manufacturer = manufacturer.clone();
            let token = token.clone();
            async move {
                let result = client.get_availability(&manufacturer, &token).await;
                (manufacturer, result)
            }
        });
        let results = futures::future::join_all(fetches).await;

        let mut batches = Vec::with_capacity(results.len());
        for (manufacturer, result) in results {
            match result {
                Ok(items) => batches.push(items),
                Err(upstream::Error::AllAttemptsFailed { causes, .. })
                    if causes.iter().all(|c| c.is_transient()) =>
                {
                    warn!(%manufacturer, "updater: manufacturer unavailable this round, skipping");
                }
                Err(err) => {
                    return Err(Error::AvailabilityFetch {
                        manufacturer,
                        source: err,
                    })
                }
            }
        }
        Ok(batches)
    }

    async fn drive_product_pipeline(
        &self,
        products: Vec<Vec<upstream::Product>>,
        token: &CancellationToken,
    ) -> Result<usize, Error> {
        let processor = Arc::new(ProductUpdater::new(self.store.clone()));
        let pipeline = Pipeline::new(vec![Box::new(FixedWorkerPool::new(
            processor,
            self.workers,
        ))]);
        let sink = CountingSink::new();
        let source = Box::new(ProductsSource::new(products));
        pipeline
            .process(source, Box::new(sink.clone()), token.clone())
            .await?;
        Ok(sink.count())
    }

    async fn drive_availability_pipeline(
        &self,
        availabilities: Vec<Vec<upstream::AvailabilityItem>>,
        token: &CancellationToken,
    ) -> Result<usize, Error> {
        let decoder = Arc::new(DataPayloadDecoder);
        let updater = Arc::new(AvailabilityUpdater::new(self.store.clone()));
        let pipeline = Pipeline::new(vec![
            Box::new(FixedWorkerPool::new(decoder, self.workers)),
            Box::new(FixedWorkerPool::new(updater, self.workers)),
        ]);
        let sink = CountingSink::new();
        let source = Box::new(AvailabilitiesSource::new(availabilities));
        pipeline
            .process(source, Box::new(sink.clone()), token.clone())
            .await?;
        Ok(sink.count())
    }
}

#[async_trait]
impl service::Service for Updater {
    fn name(&self) -> &str {
        "warehouse-updater"
    }

    async fn run(&self, token: CancellationToken) -> Result<(), anyhow::Error> {
        info!(interval_secs = self.interval.as_secs(), "starting service");
        if let Err(err) = self.run_round(&token).await {
            error!(%err, "updater: round failed, will retry next tick");
        }

        if self.interval.is_zero() {
            token.cancelled().await;
            return Ok(());
        }

        loop {
            tokio::select! {
                _ = token.cancelled() => {
                    info!("stopped service");
                    return Ok(());
                }
                _ = tokio::time::sleep(self.interval) => {
                    if let Err(err) = self.run_round(&token).await {
                        error!(%err, "updater: round failed, will retry next tick");
                    }
                }
            }
        }
    }
}
