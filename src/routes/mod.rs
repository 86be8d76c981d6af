use axum::{
    Json, Router,
    http::{StatusCode, Uri},
    routing::get,
};

use crate::state::AppState;

pub mod doc;
pub mod health;
pub mod orders;
pub mod products;
pub mod users;

/// Build the full application router with its state attached.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_check))
        .nest("/users", users::router())
        .nest("/products", products::router())
        .nest("/orders", orders::router())
        .merge(doc::scalar_docs())
        .fallback(not_found)
        .with_state(state)
}

async fn not_found(uri: Uri) -> (StatusCode, Json<serde_json::Value>) {
    let body = serde_json::json!({ "message": "Not Found", "path": uri.path() });
    (StatusCode::NOT_FOUND, Json(body))
}
