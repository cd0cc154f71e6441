//! HTTP surface: the catalog GET route plus health and fallback handlers.
//!
//! ```text
//! GET /                  -> InventoryResponse
//! GET /sqlqueryfunction  -> InventoryResponse
//! GET /inventory         -> InventoryResponse
//! GET /health            -> {"status": "healthy"}
//! anything else          -> 404 {"error": "Ruta no encontrada"}
//! ```
//!
//! Repeated query parameters keep their first value.

use crate::backend::CacheBackend;
use crate::coordinator::RequestCoordinator;
use crate::error::Error;
use crate::query::InventoryQuery;
use crate::repository::InventoryStore;
use axum::extract::{Query, State};
use axum::http::{Method, StatusCode, Uri};
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use serde_json::json;

/// Body message for unmatched routes and methods.
pub const NOT_FOUND_MESSAGE: &str = "Ruta no encontrada";

/// Application state
struct AppState<S: InventoryStore, B: CacheBackend> {
    coordinator: RequestCoordinator<S, B>,
    production: bool,
}

impl<S: InventoryStore, B: CacheBackend> Clone for AppState<S, B> {
    fn clone(&self) -> Self {
        AppState {
            coordinator: self.coordinator.clone(),
            production: self.production,
        }
    }
}

/// Build the catalog router.
///
/// With `production` set, 500 bodies carry only the error message.
pub fn router<S: InventoryStore, B: CacheBackend>(
    coordinator: RequestCoordinator<S, B>,
    production: bool,
) -> Router {
    let state = AppState {
        coordinator,
        production,
    };

    Router::new()
        .route("/", get(list_inventory::<S, B>).fallback(route_not_found))
        .route(
            "/sqlqueryfunction",
            get(list_inventory::<S, B>).fallback(route_not_found),
        )
        .route(
            "/sqlqueryfunction/",
            get(list_inventory::<S, B>).fallback(route_not_found),
        )
        .route("/inventory", get(list_inventory::<S, B>).fallback(route_not_found))
        .route("/inventory/", get(list_inventory::<S, B>).fallback(route_not_found))
        .route("/health", get(health).fallback(route_not_found))
        .fallback(route_not_found)
        .with_state(state)
}

/// List inventory records matching the query string.
async fn list_inventory<S: InventoryStore, B: CacheBackend>(
    State(state): State<AppState<S, B>>,
    Query(pairs): Query<Vec<(String, String)>>,
) -> Response {
    let query = InventoryQuery::from_pairs(pairs);
    match state.coordinator.handle(&query).await {
        Ok(response) => (StatusCode::OK, Json(response)).into_response(),
        Err(e) => error_response(&e, state.production),
    }
}

/// Health check endpoint
async fn health() -> Json<serde_json::Value> {
    Json(json!({
        "status": "healthy",
        "service": "catalog-cache"
    }))
}

async fn route_not_found(method: Method, uri: Uri) -> Response {
    let err = Error::BadRoute {
        method: method.to_string(),
        path: uri.path().to_string(),
    };
    debug!("{}", err);
    error_response(&err, true)
}

/// Map an error to its JSON response.
pub fn error_response(err: &Error, production: bool) -> Response {
    match err {
        Error::BadRoute { .. } => (
            StatusCode::NOT_FOUND,
            Json(json!({ "error": NOT_FOUND_MESSAGE })),
        )
            .into_response(),
        other => {
            let mut body = json!({ "error": other.to_string() });
            if !production {
                body["stack"] = json!(format!("{:?}", other));
            }
            (StatusCode::INTERNAL_SERVER_ERROR, Json(body)).into_response()
        }
    }
}
