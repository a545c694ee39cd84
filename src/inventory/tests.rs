use std::collections::BTreeSet;
use std::thread;

use chrono::{Duration as ChronoDuration, Utc};

use super::*;

fn sample_product(api_id: &str) -> Product {
    Product::new(
        api_id,
        "A WEIRD NAME",
        "gloves",
        23,
        ["blue".to_string(), "green".to_string()],
        "umpante",
        Utc::now() - ChronoDuration::hours(10),
    )
}

#[test]
fn upsert_product_assigns_and_preserves_id() {
    let store = Store::new();
    let original = store.upsert_product(sample_product("55f976407e2feddb5daf"));
    assert_ne!(original.id, uuid::Uuid::nil());

    let accessed_at = Utc::now();
    let mut reupsert = Product::new("55f976407e2feddb5daf", "", "", 0, [], "", accessed_at);
    reupsert.name.clear();
    let existing = store.upsert_product(reupsert);

    assert_eq!(existing.id, original.id, "id changed while upserting existing product");
}

#[test]
fn retrieved_at_is_max_of_incoming_and_stored() {
    let store = Store::new();
    let t0 = Utc::now() - ChronoDuration::hours(10);
    let t1 = Utc::now();

    let mut p1 = sample_product("abc");
    p1.retrieved_at = t0;
    store.upsert_product(p1);

    let mut p2 = sample_product("abc");
    p2.retrieved_at = t1;
    let stored = store.upsert_product(p2);

    assert_eq!(stored.retrieved_at, t1);

    // Re-upserting with an older timestamp must not regress it.
    let mut p3 = sample_product("abc");
    p3.retrieved_at = t0;
    let stored = store.upsert_product(p3);
    assert_eq!(stored.retrieved_at, t1);
}

#[test]
fn find_product_round_trips() {
    let store = Store::new();
    let original = store.upsert_product(sample_product("55f976407e2feddb5daf"));
    let found = store.find_product(original.id).unwrap();
    assert_eq!(found, original);

    let err = store.find_product(uuid::Uuid::nil()).unwrap_err();
    assert_eq!(err, Error::UnknownProductId(uuid::Uuid::nil()));
}

#[test]
fn products_category_partitions_exactly() {
    let store = Store::new();
    for i in 0..45 {
        let mut p = sample_product(&format!("g{i}"));
        p.category = "gloves".into();
        store.upsert_product(p);
    }
    for i in 0..55 {
        let mut p = sample_product(&format!("b{i}"));
        p.category = "beanies".into();
        store.upsert_product(p);
    }

    let gloves: Vec<_> = store.products_by_category("gloves").unwrap().collect();
    let beanies: Vec<_> = store.products_by_category("BEANIES").unwrap().collect();

    assert_eq!(gloves.len(), 45);
    assert!(gloves.iter().all(|p| p.category == "gloves"));
    assert_eq!(beanies.len(), 55);
    assert!(beanies.iter().all(|p| p.category == "beanies"));

    let mut seen = BTreeSet::new();
    for p in &gloves {
        assert!(seen.insert(p.id), "same product seen twice");
    }

    let err = store.products_by_category("no-match").unwrap_err();
    assert_eq!(err, Error::NoDataForCategory("no-match".into()));
}

#[test]
fn availability_for_unknown_product_is_rejected() {
    let store = Store::new();
    let err = store
        .upsert_availability(Availability::new("zzz", "INSTOCK"))
        .unwrap_err();
    assert_eq!(
        err,
        Error::AvailabilityForUnknownProduct("zzz".into())
    );
    assert!(store.find_availability(uuid::Uuid::nil()).is_err());
}

#[test]
fn availability_joins_to_product_by_api_id() {
    let store = Store::new();
    let product = store.upsert_product(sample_product("abc"));
    let availability = store
        .upsert_availability(Availability::new("abc", "INSTOCK"))
        .unwrap();

    assert_eq!(availability.product_id, product.id);
    assert_eq!(availability.manufacturer, product.manufacturer);
}

#[test]
fn availability_update_preserves_product_id_and_refreshes_updated_at() {
    let store = Store::new();
    store.upsert_product(sample_product("abc"));
    let first = store
        .upsert_availability(Availability::new("abc", "INSTOCK"))
        .unwrap();

    std::thread::sleep(std::time::Duration::from_millis(5));
    let second = store
        .upsert_availability(Availability::new("abc", "OUTOFSTOCK"))
        .unwrap();

    assert_eq!(second.id, first.id);
    assert_eq!(second.product_id, first.product_id);
    assert_eq!(second.status, "OUTOFSTOCK");
    assert!(second.updated_at >= first.updated_at);
}

#[test]
fn concurrent_upserts_with_disjoint_api_ids_yield_exactly_k() {
    let store = Store::new();
    let handles: Vec<_> = (0..32)
        .map(|i| {
            let store = store.clone();
            thread::spawn(move || {
                store.upsert_product(sample_product(&format!("worker-{i}")));
            })
        })
        .collect();
    for h in handles {
        h.join().unwrap();
    }

    let all: Vec<_> = store
        .products(uuid::Uuid::nil(), uuid::Uuid::max(), Utc::now() + ChronoDuration::hours(1))
        .collect();
    assert_eq!(all.len(), 32);
}

#[test]
fn category_reassignment_keeps_secondary_index_coherent() {
    let store = Store::new();
    let mut p = sample_product("abc");
    p.category = "gloves".into();
    store.upsert_product(p.clone());

    p.category = "beanies".into();
    store.upsert_product(p);

    assert!(store.products_by_category("gloves").unwrap().next().is_none()
        || store.products_by_category("gloves").is_err());
    let beanies: Vec<_> = store.products_by_category("beanies").unwrap().collect();
    assert_eq!(beanies.len(), 1);
}
