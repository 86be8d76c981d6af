use axum::{
    Json, Router,
    extract::State,
    http::StatusCode,
    routing::get,
};
use serde_json::Value;

use crate::{
    dto::products::ProductRequest,
    error::AppResult,
    extract::IdPath,
    models::Product,
    response::{MessageBody, ValidationErrorBody},
    services::product_service,
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_products).post(create_product))
        .route(
            "/{id}",
            get(get_product).put(update_product).delete(delete_product),
        )
}

#[utoipa::path(
    get,
    path = "/products",
    responses(
        (status = 200, description = "List products", body = Vec<Product>)
    ),
    tag = "Products"
)]
pub async fn list_products(State(state): State<AppState>) -> AppResult<Json<Vec<Product>>> {
    let products = product_service::list_products(&state).await?;
    Ok(Json(products))
}

#[utoipa::path(
    get,
    path = "/products/{id}",
    params(
        ("id" = i32, Path, description = "Product ID")
    ),
    responses(
        (status = 200, description = "Get product", body = Product),
        (status = 404, description = "Product not found", body = MessageBody),
    ),
    tag = "Products"
)]
pub async fn get_product(
    State(state): State<AppState>,
    IdPath(id): IdPath<i32>,
) -> AppResult<Json<Product>> {
    let product = product_service::get_product(&state, id).await?;
    Ok(Json(product))
}

#[utoipa::path(
    post,
    path = "/products",
    request_body = ProductRequest,
    responses(
        (status = 201, description = "Create product", body = Product),
        (status = 400, description = "Validation failed", body = ValidationErrorBody),
    ),
    tag = "Products"
)]
pub async fn create_product(
    State(state): State<AppState>,
    Json(payload): Json<Value>,
) -> AppResult<(StatusCode, Json<Product>)> {
    let product = product_service::create_product(&state, &payload).await?;
    Ok((StatusCode::CREATED, Json(product)))
}

#[utoipa::path(
    put,
    path = "/products/{id}",
    params(
        ("id" = i32, Path, description = "Product ID")
    ),
    request_body(content = ProductRequest, description = "Any subset of the product fields"),
    responses(
        (status = 200, description = "Updated product", body = Product),
        (status = 400, description = "Validation failed", body = ValidationErrorBody),
        (status = 404, description = "Product not found", body = MessageBody),
    ),
    tag = "Products"
)]
pub async fn update_product(
    State(state): State<AppState>,
    IdPath(id): IdPath<i32>,
    Json(payload): Json<Value>,
) -> AppResult<Json<Product>> {
    let product = product_service::update_product(&state, id, &payload).await?;
    Ok(Json(product))
}

#[utoipa::path(
    delete,
    path = "/products/{id}",
    params(
        ("id" = i32, Path, description = "Product ID")
    ),
    responses(
        (status = 200, description = "Deleted product", body = MessageBody),
        (status = 404, description = "Product not found", body = MessageBody),
    ),
    tag = "Products"
)]
pub async fn delete_product(
    State(state): State<AppState>,
    IdPath(id): IdPath<i32>,
) -> AppResult<Json<MessageBody>> {
    let message = product_service::delete_product(&state, id).await?;
    Ok(Json(message))
}
