use std::time::Duration;

use catalog_sync::inventory::Store;
use catalog_sync::updater::Updater;
use catalog_sync::upstream;
use tokio_util::sync::CancellationToken;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// End-to-end: one orchestrator round against a mocked upstream populates
/// the store with joined products and availabilities, driven through the
/// real fetch + pipeline path instead of direct store calls.
#[tokio::test]
async fn one_round_populates_products_and_joined_availability() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/products/gloves"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([
            {"id": "g1", "type": "gloves", "name": "Warm Gloves", "color": ["black"], "price": 1500, "manufacturer": "umpante"},
            {"id": "g2", "type": "gloves", "name": "Thin Gloves", "color": ["white"], "price": 900, "manufacturer": "fresh"},
        ])))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/products/beanies"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([
            {"id": "bn1", "type": "beanies", "name": "Wool Beanie", "color": ["grey"], "price": 1200, "manufacturer": "umpante"},
        ])))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/availability/umpante"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "code": 200,
            "response": [
                {"id": "g1", "DATAPAYLOAD": "<AVAILABILITY><INSTOCKVALUE>INSTOCK</INSTOCKVALUE></AVAILABILITY>"},
                {"id": "bn1", "DATAPAYLOAD": "<AVAILABILITY><INSTOCKVALUE>LESSTHAN10</INSTOCKVALUE></AVAILABILITY>"},
            ],
        })))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/availability/fresh"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "code": 200,
            "response": [
                {"id": "g2", "DATAPAYLOAD": "<AVAILABILITY><INSTOCKVALUE>OUTOFSTOCK</INSTOCKVALUE></AVAILABILITY>"},
            ],
        })))
        .mount(&server)
        .await;

    let client = upstream::Client::new(server.uri(), Duration::from_secs(5), 6);
    let store = Store::new();
    let updater = Updater::new(
        client,
        store.clone(),
        vec!["gloves".to_string(), "beanies".to_string()],
        vec!["umpante".to_string(), "fresh".to_string()],
        4,
        Duration::from_secs(0),
    );

    updater.run_round(&CancellationToken::new()).await.unwrap();

    let gloves: Vec<_> = store.products_by_category("gloves").unwrap().collect();
    assert_eq!(gloves.len(), 2);
    let beanies: Vec<_> = store.products_by_category("beanies").unwrap().collect();
    assert_eq!(beanies.len(), 1);

    let all_availabilities: Vec<_> = store
        .availabilities(uuid::Uuid::nil(), uuid::Uuid::max(), chrono::Utc::now())
        .collect();
    assert_eq!(all_availabilities.len(), 3);

    let g1 = gloves.iter().find(|p| p.api_id == "g1").unwrap();
    let joined = all_availabilities
        .iter()
        .find(|a| a.product_id == g1.id)
        .expect("g1's availability must be joined to g1's product id");
    assert_eq!(joined.status, "INSTOCK");
    assert_eq!(joined.manufacturer, "umpante");
}
