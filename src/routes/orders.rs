use axum::{
    Json, Router,
    extract::State,
    http::StatusCode,
    routing::{delete, get},
};
use serde_json::Value;

use crate::{
    dto::orders::{AddProductRequest, OrderRequest},
    error::AppResult,
    extract::IdPath,
    models::{Order, Product},
    response::{MessageBody, ValidationErrorBody},
    services::order_service,
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_orders).post(create_order))
        .route("/{id}", get(get_order).put(update_order).delete(delete_order))
        .route(
            "/{id}/products",
            get(list_order_products).post(add_product_to_order),
        )
        .route(
            "/{id}/products/{product_id}",
            delete(remove_product_from_order),
        )
}

#[utoipa::path(
    post,
    path = "/orders",
    request_body = OrderRequest,
    responses(
        (status = 201, description = "Order created", body = Order),
        (status = 400, description = "Validation failed", body = ValidationErrorBody),
        (status = 404, description = "User not found", body = MessageBody),
    ),
    tag = "Orders"
)]
pub async fn create_order(
    State(state): State<AppState>,
    Json(payload): Json<Value>,
) -> AppResult<(StatusCode, Json<Order>)> {
    let order = order_service::create_order(&state, &payload).await?;
    Ok((StatusCode::CREATED, Json(order)))
}

#[utoipa::path(
    get,
    path = "/orders",
    responses(
        (status = 200, description = "List orders", body = Vec<Order>)
    ),
    tag = "Orders"
)]
pub async fn list_orders(State(state): State<AppState>) -> AppResult<Json<Vec<Order>>> {
    let orders = order_service::list_orders(&state).await?;
    Ok(Json(orders))
}

#[utoipa::path(
    get,
    path = "/orders/{id}",
    params(
        ("id" = i32, Path, description = "Order ID")
    ),
    responses(
        (status = 200, description = "Get order", body = Order),
        (status = 404, description = "Order not found", body = MessageBody),
    ),
    tag = "Orders"
)]
pub async fn get_order(
    State(state): State<AppState>,
    IdPath(id): IdPath<i32>,
) -> AppResult<Json<Order>> {
    let order = order_service::get_order(&state, id).await?;
    Ok(Json(order))
}

#[utoipa::path(
    put,
    path = "/orders/{id}",
    params(
        ("id" = i32, Path, description = "Order ID")
    ),
    request_body(content = OrderRequest, description = "Any subset of the order fields"),
    responses(
        (status = 200, description = "Updated order", body = Order),
        (status = 400, description = "Validation failed", body = ValidationErrorBody),
        (status = 404, description = "Order or user not found", body = MessageBody),
    ),
    tag = "Orders"
)]
pub async fn update_order(
    State(state): State<AppState>,
    IdPath(id): IdPath<i32>,
    Json(payload): Json<Value>,
) -> AppResult<Json<Order>> {
    let order = order_service::update_order(&state, id, &payload).await?;
    Ok(Json(order))
}

#[utoipa::path(
    delete,
    path = "/orders/{id}",
    params(
        ("id" = i32, Path, description = "Order ID")
    ),
    responses(
        (status = 200, description = "Deleted order", body = MessageBody),
        (status = 404, description = "Order not found", body = MessageBody),
    ),
    tag = "Orders"
)]
pub async fn delete_order(
    State(state): State<AppState>,
    IdPath(id): IdPath<i32>,
) -> AppResult<Json<MessageBody>> {
    let message = order_service::delete_order(&state, id).await?;
    Ok(Json(message))
}

#[utoipa::path(
    get,
    path = "/orders/{id}/products",
    params(
        ("id" = i32, Path, description = "Order ID")
    ),
    responses(
        (status = 200, description = "Products in the order", body = Vec<Product>),
        (status = 404, description = "Order not found", body = MessageBody),
    ),
    tag = "Orders"
)]
pub async fn list_order_products(
    State(state): State<AppState>,
    IdPath(id): IdPath<i32>,
) -> AppResult<Json<Vec<Product>>> {
    let products = order_service::list_order_products(&state, id).await?;
    Ok(Json(products))
}

#[utoipa::path(
    post,
    path = "/orders/{id}/products",
    params(
        ("id" = i32, Path, description = "Order ID")
    ),
    request_body = AddProductRequest,
    responses(
        (status = 200, description = "Product added to order", body = MessageBody),
        (status = 400, description = "Missing product_id or product already in order"),
        (status = 404, description = "Order or product not found", body = MessageBody),
    ),
    tag = "Orders"
)]
pub async fn add_product_to_order(
    State(state): State<AppState>,
    IdPath(id): IdPath<i32>,
    Json(payload): Json<Value>,
) -> AppResult<Json<MessageBody>> {
    let message = order_service::add_product(&state, id, &payload).await?;
    Ok(Json(message))
}

#[utoipa::path(
    delete,
    path = "/orders/{id}/products/{product_id}",
    params(
        ("id" = i32, Path, description = "Order ID"),
        ("product_id" = i32, Path, description = "Product ID")
    ),
    responses(
        (status = 200, description = "Product removed from order", body = MessageBody),
        (status = 404, description = "Order or product not found, or product not in order", body = MessageBody),
    ),
    tag = "Orders"
)]
pub async fn remove_product_from_order(
    State(state): State<AppState>,
    IdPath((id, product_id)): IdPath<(i32, i32)>,
) -> AppResult<Json<MessageBody>> {
    let message = order_service::remove_product(&state, id, product_id).await?;
    Ok(Json(message))
}
