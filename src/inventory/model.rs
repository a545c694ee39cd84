use std::collections::BTreeSet;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A product observed from the upstream catalog.
///
/// `colors` is order-insensitive (a `BTreeSet` rather than a `Vec`) so two
/// upserts that list the same colors in a different order compare equal.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct Product {
    pub id: Uuid,
    pub api_id: String,
    pub name: String,
    pub category: String,
    pub price: i64,
    pub colors: BTreeSet<String>,
    pub manufacturer: String,
    pub retrieved_at: DateTime<Utc>,
}

impl Product {
    /// Builds a product ready for `Store::upsert_product`: `api_id`,
    /// `category`, and `manufacturer` are normalized to lowercase and `id`
    /// is left nil for the store to assign.
    pub fn new(
        api_id: impl Into<String>,
        name: impl Into<String>,
        category: impl Into<String>,
        price: i64,
        colors: impl IntoIterator<Item = String>,
        manufacturer: impl Into<String>,
        retrieved_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id: Uuid::nil(),
            api_id: api_id.into().to_lowercase(),
            name: name.into(),
            category: category.into().to_lowercase(),
            price,
            colors: colors.into_iter().collect(),
            manufacturer: manufacturer.into().to_lowercase(),
            retrieved_at,
        }
    }
}

/// An availability record joined to a `Product` by `api_id`.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct Availability {
    pub id: Uuid,
    pub api_id: String,
    pub product_id: Uuid,
    pub status: String,
    pub manufacturer: String,
    pub updated_at: DateTime<Utc>,
}

impl Availability {
    /// Builds an availability ready for `Store::upsert_availability`:
    /// `product_id`, `manufacturer`, `id`, and `updated_at` are assigned by
    /// the store at join time.
    pub fn new(api_id: impl Into<String>, status: impl Into<String>) -> Self {
        Self {
            id: Uuid::nil(),
            api_id: api_id.into().to_lowercase(),
            product_id: Uuid::nil(),
            status: status.into(),
            manufacturer: String::new(),
            updated_at: Utc::now(),
        }
    }
}
