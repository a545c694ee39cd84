//! Thin read-only HTTP surface: exposes `GET /products/:category/`, calling
//! straight through to `Store::products_by_category` and mapping an
//! unknown category to an empty array rather than a 404. No business logic
//! lives here.

use std::sync::Arc;

use async_trait::async_trait;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Json};
use axum::{routing::get, Router};
use serde_json::json;
use tokio_util::sync::CancellationToken;
use tower_http::compression::CompressionLayer;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::info;

use crate::inventory::{self, Store};
use crate::service;

struct AppState {
    store: Store,
}

async fn products_by_category(
    State(state): State<Arc<AppState>>,
    Path(category): Path<String>,
) -> impl IntoResponse {
    match state.store.products_by_category(&category) {
        Ok(iter) => {
            let products: Vec<_> = iter.collect();
            Json(serde_json::to_value(products).unwrap_or_else(|_| json!([]))).into_response()
        }
        Err(inventory::Error::NoDataForCategory(_)) => {
            Json(serde_json::Value::Array(Vec::new())).into_response()
        }
        Err(err) => {
            (StatusCode::INTERNAL_SERVER_ERROR, Json(json!({ "error": err.to_string() })))
                .into_response()
        }
    }
}

fn router(store: Store) -> Router {
    let state = Arc::new(AppState { store });
    Router::new()
        .route("/products/:category/", get(products_by_category))
        .layer(TraceLayer::new_for_http())
        .layer(CompressionLayer::new())
        .layer(CorsLayer::new().allow_origin(Any).allow_methods(Any))
        .with_state(state)
}

/// Long-lived service wrapper: binds `addr` and serves the router above
/// until the group cancels it.
pub struct Frontend {
    addr: std::net::SocketAddr,
    store: Store,
}

impl Frontend {
    pub fn new(addr: std::net::SocketAddr, store: Store) -> Self {
        Self { addr, store }
    }
}

#[async_trait]
impl service::Service for Frontend {
    fn name(&self) -> &str {
        "frontend"
    }

    async fn run(&self, token: CancellationToken) -> Result<(), anyhow::Error> {
        info!(addr = %self.addr, "starting service");
        let listener = tokio::net::TcpListener::bind(self.addr).await?;
        let app = router(self.store.clone());
        axum::serve(listener, app)
            .with_graceful_shutdown(async move {
                token.cancelled().await;
            })
            .await?;
        info!("stopped service");
        Ok(())
    }
}
