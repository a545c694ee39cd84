use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use chrono::{DateTime, Utc};
use tracing::instrument;
use uuid::Uuid;

use super::error::Error;
use super::iterator::{AvailabilityIterator, ProductIterator};
use super::model::{Availability, Product};

/// Bound on UUID-collision retries during allocation. Collisions are
/// astronomically unlikely with v4 UUIDs; this only guards against an
/// infinite loop if the RNG were ever degenerate.
const MAX_ID_ALLOC_ATTEMPTS: usize = 1_000;

#[derive(Default)]
struct Indexes {
    products: HashMap<Uuid, Product>,
    product_by_api_id: HashMap<String, Uuid>,
    products_by_category: HashMap<String, Vec<Uuid>>,

    availabilities: HashMap<Uuid, Availability>,
    availability_by_api_id: HashMap<String, Uuid>,
}

/// In-memory inventory store. Cheap to clone: internally an `Arc` around the
/// single reader-writer lock that guards every index.
#[derive(Clone)]
pub struct Store {
    inner: Arc<RwLock<Indexes>>,
}

impl Default for Store {
    fn default() -> Self {
        Self::new()
    }
}

impl Store {
    pub fn new() -> Self {
        Self {
            inner: Arc::new(RwLock::new(Indexes::default())),
        }
    }

    fn alloc_product_id(indexes: &Indexes) -> Uuid {
        for _ in 0..MAX_ID_ALLOC_ATTEMPTS {
            let id = Uuid::new_v4();
            if !indexes.products.contains_key(&id) {
                return id;
            }
        }
        Uuid::new_v4()
    }

    fn alloc_availability_id(indexes: &Indexes) -> Uuid {
        for _ in 0..MAX_ID_ALLOC_ATTEMPTS {
            let id = Uuid::new_v4();
            if !indexes.availabilities.contains_key(&id) {
                return id;
            }
        }
        Uuid::new_v4()
    }

    /// Inserts or updates a product, keyed by `api_id`. On update, `id` is
    /// preserved from the existing record and `retrieved_at` becomes the max
    /// of the incoming and stored timestamps. Category secondary index
    /// membership is kept coherent even when a re-upsert changes category.
    #[instrument(skip(self, product), fields(api_id = %product.api_id))]
    pub fn upsert_product(&self, mut product: Product) -> Product {
        let mut indexes = self.inner.write().expect("inventory store lock poisoned");

        if let Some(&existing_id) = indexes.product_by_api_id.get(&product.api_id) {
            product.id = existing_id;
            let old_category = indexes
                .products
                .get(&existing_id)
                .map(|p| p.category.clone());
            if let Some(existing) = indexes.products.get(&existing_id) {
                if existing.retrieved_at > product.retrieved_at {
                    product.retrieved_at = existing.retrieved_at;
                }
            }
            indexes.products.insert(existing_id, product.clone());

            if old_category.as_deref() != Some(product.category.as_str()) {
                if let Some(old) = old_category {
                    if let Some(list) = indexes.products_by_category.get_mut(&old) {
                        list.retain(|id| *id != existing_id);
                    }
                }
                indexes
                    .products_by_category
                    .entry(product.category.clone())
                    .or_default()
                    .push(existing_id);
            }
            return product;
        }

        let id = Self::alloc_product_id(&indexes);
        product.id = id;
        indexes.products.insert(id, product.clone());
        indexes.product_by_api_id.insert(product.api_id.clone(), id);
        indexes
            .products_by_category
            .entry(product.category.clone())
            .or_default()
            .push(id);
        product
    }

    pub fn find_product(&self, id: Uuid) -> Result<Product, Error> {
        let indexes = self.inner.read().expect("inventory store lock poisoned");
        indexes
            .products
            .get(&id)
            .cloned()
            .ok_or(Error::UnknownProductId(id))
    }

    /// Snapshot iterator over every product in `category` (case-insensitive).
    pub fn products_by_category(&self, category: &str) -> Result<ProductIterator, Error> {
        let category = category.to_lowercase();
        let indexes = self.inner.read().expect("inventory store lock poisoned");
        let ids = indexes
            .products_by_category
            .get(&category)
            .cloned()
            .ok_or_else(|| Error::NoDataForCategory(category.clone()))?;
        Ok(ProductIterator::new(self.clone(), ids))
    }

    /// Snapshot iterator over products whose id lies in `[from_id, to_id)`
    /// under lexicographic string comparison, and whose `retrieved_at` is
    /// strictly before `retrieved_before`.
    ///
    /// The lexicographic-string range comparison (rather than canonical
    /// byte-order) is a deliberate, inherited design choice — see
    /// DESIGN.md.
    pub fn products(
        &self,
        from_id: Uuid,
        to_id: Uuid,
        retrieved_before: DateTime<Utc>,
    ) -> ProductIterator {
        let from = from_id.to_string();
        let to = to_id.to_string();
        let indexes = self.inner.read().expect("inventory store lock poisoned");
        let mut ids: Vec<Uuid> = indexes
            .products
            .values()
            .filter(|p| {
                let id = p.id.to_string();
                id.as_str() >= from.as_str()
                    && id.as_str() < to.as_str()
                    && p.retrieved_at < retrieved_before
            })
            .map(|p| p.id)
            .collect();
        ids.sort_unstable();
        ProductIterator::new(self.clone(), ids)
    }

    /// Joins `availability` to the product sharing its `api_id`, assigning
    /// `product_id` and `manufacturer` from that product. On update,
    /// `product_id` is preserved from the prior record and `updated_at` is
    /// refreshed to now.
    #[instrument(skip(self, availability), fields(api_id = %availability.api_id))]
    pub fn upsert_availability(&self, mut availability: Availability) -> Result<Availability, Error> {
        let mut indexes = self.inner.write().expect("inventory store lock poisoned");

        let product = indexes
            .product_by_api_id
            .get(&availability.api_id)
            .and_then(|id| indexes.products.get(id))
            .ok_or_else(|| Error::AvailabilityForUnknownProduct(availability.api_id.clone()))?;

        availability.product_id = product.id;
        availability.manufacturer = product.manufacturer.clone();
        availability.updated_at = Utc::now();

        if let Some(&existing_id) = indexes.availability_by_api_id.get(&availability.api_id) {
            availability.id = existing_id;
            if let Some(existing) = indexes.availabilities.get(&existing_id) {
                availability.product_id = existing.product_id;
            }
            indexes.availabilities.insert(existing_id, availability.clone());
            return Ok(availability);
        }

        let id = Self::alloc_availability_id(&indexes);
        availability.id = id;
        indexes.availabilities.insert(id, availability.clone());
        indexes
            .availability_by_api_id
            .insert(availability.api_id.clone(), id);
        Ok(availability)
    }

    pub fn find_availability(&self, id: Uuid) -> Result<Availability, Error> {
        let indexes = self.inner.read().expect("inventory store lock poisoned");
        indexes
            .availabilities
            .get(&id)
            .cloned()
            .ok_or(Error::UnknownAvailabilityId(id))
    }

    pub fn availabilities(
        &self,
        from_id: Uuid,
        to_id: Uuid,
        updated_before: DateTime<Utc>,
    ) -> AvailabilityIterator {
        let from = from_id.to_string();
        let to = to_id.to_string();
        let indexes = self.inner.read().expect("inventory store lock poisoned");
        let mut ids: Vec<Uuid> = indexes
            .availabilities
            .values()
            .filter(|a| {
                let id = a.id.to_string();
                id.as_str() >= from.as_str()
                    && id.as_str() < to.as_str()
                    && a.updated_at < updated_before
            })
            .map(|a| a.id)
            .collect();
        ids.sort_unstable();
        AvailabilityIterator::new(self.clone(), ids)
    }

    pub(super) fn read_product(&self, id: Uuid) -> Option<Product> {
        self.inner
            .read()
            .expect("inventory store lock poisoned")
            .products
            .get(&id)
            .cloned()
    }

    pub(super) fn read_availability(&self, id: Uuid) -> Option<Availability> {
        self.inner
            .read()
            .expect("inventory store lock poisoned")
            .availabilities
            .get(&id)
            .cloned()
    }
}
