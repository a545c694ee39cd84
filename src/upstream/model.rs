use serde::Deserialize;

/// Wire shape of one element of `GET {baseURL}/products/{category}`.
#[derive(Debug, Clone, Deserialize)]
pub struct Product {
    pub id: String,
    #[serde(rename = "type")]
    pub category: String,
    pub name: String,
    pub color: Vec<String>,
    pub price: i64,
    pub manufacturer: String,
}

/// Wire envelope of `GET {baseURL}/availability/{manufacturer}`.
#[derive(Debug, Clone, Deserialize)]
pub struct AvailabilityEnvelope {
    #[allow(dead_code)]
    pub code: i64,
    pub response: Vec<AvailabilityItem>,
}

/// One undecoded availability record: `id` is the product's `api_id`,
/// `data_payload` is the embedded `<AVAILABILITY>...</AVAILABILITY>` blob.
#[derive(Debug, Clone, Deserialize)]
pub struct AvailabilityItem {
    pub id: String,
    #[serde(rename = "DATAPAYLOAD")]
    pub data_payload: String,
}
