use uuid::Uuid;

use super::model::{Availability, Product};
use super::store::Store;

/// A snapshot iterator over products: membership (the id list) is fixed at
/// construction time under the store's read lock, but each item's contents
/// are re-read through the lock on every `next()` call, so callers observe
/// the latest mutation to a still-live record.
pub struct ProductIterator {
    store: Store,
    ids: std::vec::IntoIter<Uuid>,
}

impl ProductIterator {
    pub(super) fn new(store: Store, ids: Vec<Uuid>) -> Self {
        Self {
            store,
            ids: ids.into_iter(),
        }
    }
}

impl Iterator for ProductIterator {
    type Item = Product;

    fn next(&mut self) -> Option<Product> {
        loop {
            let id = self.ids.next()?;
            if let Some(product) = self.store.read_product(id) {
                return Some(product);
            }
            // Id vanished is impossible (no deletes), but skip defensively
            // rather than panic if it ever did.
        }
    }
}

pub struct AvailabilityIterator {
    store: Store,
    ids: std::vec::IntoIter<Uuid>,
}

impl AvailabilityIterator {
    pub(super) fn new(store: Store, ids: Vec<Uuid>) -> Self {
        Self {
            store,
            ids: ids.into_iter(),
        }
    }
}

impl Iterator for AvailabilityIterator {
    type Item = Availability;

    fn next(&mut self) -> Option<Availability> {
        loop {
            let id = self.ids.next()?;
            if let Some(availability) = self.store.read_availability(id) {
                return Some(availability);
            }
        }
    }
}
