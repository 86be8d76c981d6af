use axum::{
    Json, Router,
    extract::State,
    http::StatusCode,
    routing::get,
};
use serde_json::Value;

use crate::{
    dto::users::UserRequest,
    error::AppResult,
    extract::IdPath,
    models::{Order, User},
    response::{MessageBody, ValidationErrorBody},
    services::user_service,
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_users).post(create_user))
        .route("/{id}", get(get_user).put(update_user).delete(delete_user))
        .route("/{id}/orders", get(list_user_orders))
}

#[utoipa::path(
    post,
    path = "/users",
    request_body = UserRequest,
    responses(
        (status = 201, description = "User created", body = User),
        (status = 400, description = "Validation failed", body = ValidationErrorBody),
    ),
    tag = "Users"
)]
pub async fn create_user(
    State(state): State<AppState>,
    Json(payload): Json<Value>,
) -> AppResult<(StatusCode, Json<User>)> {
    let user = user_service::create_user(&state, &payload).await?;
    Ok((StatusCode::CREATED, Json(user)))
}

#[utoipa::path(
    get,
    path = "/users",
    responses(
        (status = 200, description = "List users", body = Vec<User>)
    ),
    tag = "Users"
)]
pub async fn list_users(State(state): State<AppState>) -> AppResult<Json<Vec<User>>> {
    let users = user_service::list_users(&state).await?;
    Ok(Json(users))
}

#[utoipa::path(
    get,
    path = "/users/{id}",
    params(
        ("id" = i32, Path, description = "User ID")
    ),
    responses(
        (status = 200, description = "Get user", body = User),
        (status = 404, description = "User not found", body = MessageBody),
    ),
    tag = "Users"
)]
pub async fn get_user(
    State(state): State<AppState>,
    IdPath(id): IdPath<i32>,
) -> AppResult<Json<User>> {
    let user = user_service::get_user(&state, id).await?;
    Ok(Json(user))
}

#[utoipa::path(
    put,
    path = "/users/{id}",
    params(
        ("id" = i32, Path, description = "User ID")
    ),
    request_body(content = UserRequest, description = "Any subset of the user fields"),
    responses(
        (status = 200, description = "Updated user", body = User),
        (status = 400, description = "Validation failed", body = ValidationErrorBody),
        (status = 404, description = "User not found", body = MessageBody),
    ),
    tag = "Users"
)]
pub async fn update_user(
    State(state): State<AppState>,
    IdPath(id): IdPath<i32>,
    Json(payload): Json<Value>,
) -> AppResult<Json<User>> {
    let user = user_service::update_user(&state, id, &payload).await?;
    Ok(Json(user))
}

#[utoipa::path(
    delete,
    path = "/users/{id}",
    params(
        ("id" = i32, Path, description = "User ID")
    ),
    responses(
        (status = 200, description = "User and their orders deleted", body = MessageBody),
        (status = 404, description = "User not found", body = MessageBody),
    ),
    tag = "Users"
)]
pub async fn delete_user(
    State(state): State<AppState>,
    IdPath(id): IdPath<i32>,
) -> AppResult<Json<MessageBody>> {
    let message = user_service::delete_user(&state, id).await?;
    Ok(Json(message))
}

#[utoipa::path(
    get,
    path = "/users/{id}/orders",
    params(
        ("id" = i32, Path, description = "User ID")
    ),
    responses(
        (status = 200, description = "Orders placed by the user", body = Vec<Order>),
        (status = 404, description = "User not found", body = MessageBody),
    ),
    tag = "Users"
)]
pub async fn list_user_orders(
    State(state): State<AppState>,
    IdPath(id): IdPath<i32>,
) -> AppResult<Json<Vec<Order>>> {
    let orders = user_service::list_user_orders(&state, id).await?;
    Ok(Json(orders))
}
