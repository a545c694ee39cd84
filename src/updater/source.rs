use async_trait::async_trait;

use crate::pipeline::{Payload, Source};
use crate::upstream;

use super::payload::{AvailabilityPayload, ProductPayload};

/// Lazy flat iterator over a two-dimensional `[category][product]` batch,
/// materialized eagerly (the fetch phase already ran to completion).
pub struct ProductsSource {
    items: std::vec::IntoIter<upstream::Product>,
    current: Option<upstream::Product>,
}

impl ProductsSource {
    pub fn new(batches: Vec<Vec<upstream::Product>>) -> Self {
        let flattened: Vec<upstream::Product> = batches.into_iter().flatten().collect();
        Self {
            items: flattened.into_iter(),
            current: None,
        }
    }
}

#[async_trait]
impl Source for ProductsSource {
    async fn next(&mut self) -> bool {
        self.current = self.items.next();
        self.current.is_some()
    }
    fn payload(&mut self) -> Box<dyn Payload> {
        Box::new(ProductPayload(
            self.current.take().expect("next() returned true"),
        ))
    }
}

/// Lazy flat iterator over per-manufacturer availability batches.
pub struct AvailabilitiesSource {
    items: std::vec::IntoIter<upstream::AvailabilityItem>,
    current: Option<upstream::AvailabilityItem>,
}

impl AvailabilitiesSource {
    pub fn new(batches: Vec<Vec<upstream::AvailabilityItem>>) -> Self {
        let flattened: Vec<upstream::AvailabilityItem> = batches.into_iter().flatten().collect();
        Self {
            items: flattened.into_iter(),
            current: None,
        }
    }
}

#[async_trait]
impl Source for AvailabilitiesSource {
    async fn next(&mut self) -> bool {
        self.current = self.items.next();
        self.current.is_some()
    }
    fn payload(&mut self) -> Box<dyn Payload> {
        let item = self.current.take().expect("next() returned true");
        Box::new(AvailabilityPayload {
            api_id: item.id,
            data_payload: item.data_payload,
            status: None,
        })
    }
}
