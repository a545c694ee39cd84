use std::fmt;

use crate::pipeline::Payload;
use crate::upstream;

/// One fetched-but-not-yet-upserted product, carried through the product
/// pipeline.
pub struct ProductPayload(pub upstream::Product);

impl fmt::Debug for ProductPayload {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProductPayload").field("id", &self.0.id).finish()
    }
}

impl Payload for ProductPayload {
    fn as_any(&self) -> &dyn std::any::Any {
        self
    }
    fn as_any_mut(&mut self) -> &mut dyn std::any::Any {
        self
    }
}

/// One fetched availability item working its way through decode → upsert.
pub struct AvailabilityPayload {
    pub api_id: String,
    pub data_payload: String,
    pub status: Option<String>,
}

impl fmt::Debug for AvailabilityPayload {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AvailabilityPayload")
            .field("api_id", &self.api_id)
            .finish()
    }
}

impl Payload for AvailabilityPayload {
    fn as_any(&self) -> &dyn std::any::Any {
        self
    }
    fn as_any_mut(&mut self) -> &mut dyn std::any::Any {
        self
    }
}
