use async_trait::async_trait;
use chrono::Utc;

use crate::inventory::{self, Store};
use crate::pipeline::{Outcome, Payload, Processor};
use crate::upstream;

use super::payload::{AvailabilityPayload, ProductPayload};

/// Upserts a fetched product. The payload is forwarded unchanged on
/// success (the counting sink only cares that it arrived).
pub struct ProductUpdater {
    store: Store,
}

impl ProductUpdater {
    pub fn new(store: Store) -> Self {
        Self { store }
    }
}

#[async_trait]
impl Processor for ProductUpdater {
    async fn process(&self, payload: Box<dyn Payload>) -> Result<Outcome, anyhow::Error> {
        let raw = payload
            .as_any()
            .downcast_ref::<ProductPayload>()
            .expect("product pipeline stage received a non-product payload")
            .0
            .clone();

        let product = inventory::Product::new(
            raw.id,
            raw.name,
            raw.category,
            raw.price,
            raw.color,
            raw.manufacturer,
            Utc::now(),
        );
        self.store.upsert_product(product);
        Ok(Outcome::Forward(payload))
    }
}

/// Decodes the embedded `<AVAILABILITY>...</AVAILABILITY>` XML payload into
/// a status string. A decode failure fails the item, not the batch — the
/// item is dropped rather than aborting the pipeline.
pub struct DataPayloadDecoder;

#[async_trait]
impl Processor for DataPayloadDecoder {
    async fn process(&self, mut payload: Box<dyn Payload>) -> Result<Outcome, anyhow::Error> {
        let decoded = {
            let availability = payload
                .as_any()
                .downcast_ref::<AvailabilityPayload>()
                .expect("availability pipeline stage received a non-availability payload");
            upstream::decode_status(&availability.data_payload)
        };

        match decoded {
            Ok(status) => {
                payload
                    .as_any_mut()
                    .downcast_mut::<AvailabilityPayload>()
                    .expect("checked above")
                    .status = Some(status);
                Ok(Outcome::Forward(payload))
            }
            Err(err) => {
                tracing::warn!(%err, "updater: dropping availability item with undecodable payload");
                Ok(Outcome::Drop(payload))
            }
        }
    }
}

/// Upserts a decoded availability. `AvailabilityForUnknownProduct` is a
/// silent drop (a race against a still-in-flight product upsert, or a
/// product in a category we do not ingest).
pub struct AvailabilityUpdater {
    store: Store,
}

impl AvailabilityUpdater {
    pub fn new(store: Store) -> Self {
        Self { store }
    }
}

#[async_trait]
impl Processor for AvailabilityUpdater {
    async fn process(&self, payload: Box<dyn Payload>) -> Result<Outcome, anyhow::Error> {
        let (api_id, status) = {
            let availability = payload
                .as_any()
                .downcast_ref::<AvailabilityPayload>()
                .expect("availability pipeline stage received a non-availability payload");
            (
                availability.api_id.clone(),
                availability
                    .status
                    .clone()
                    .expect("availability reaches the updater stage only after decoding"),
            )
        };

        let record = inventory::Availability::new(api_id, status);
        match self.store.upsert_availability(record) {
            Ok(_) => Ok(Outcome::Forward(payload)),
            Err(inventory::Error::AvailabilityForUnknownProduct(_)) => Ok(Outcome::Drop(payload)),
            Err(err) => Err(err.into()),
        }
    }
}
