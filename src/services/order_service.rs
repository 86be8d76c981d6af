use sea_orm::{ActiveModelTrait, ConnectionTrait, EntityTrait, QueryOrder, TransactionTrait};
use serde_json::Value;

use crate::{
    dto::orders::{AddProductRequest, OrderChanges},
    entity::orders::{ActiveModel, Column, Entity as Orders, Model as OrderModel},
    error::{AppError, AppResult},
    models::{Order, Product},
    response::MessageBody,
    services::{order_product_service, user_service::find_user},
    state::AppState,
    validation::Mode,
};

pub async fn list_orders(state: &AppState) -> AppResult<Vec<Order>> {
    let orders = Orders::find()
        .order_by_asc(Column::Id)
        .all(&state.orm)
        .await?
        .into_iter()
        .map(Order::from)
        .collect();
    Ok(orders)
}

pub async fn get_order(state: &AppState, id: i32) -> AppResult<Order> {
    let order = find_order(&state.orm, id).await?;
    Ok(order.into())
}

pub async fn create_order(state: &AppState, payload: &Value) -> AppResult<Order> {
    let changes = OrderChanges::from_json(payload, Mode::Full)?;

    let txn = state.orm.begin().await?;
    if let Some(user_id) = changes.user_id {
        find_user(&txn, user_id).await?;
    }

    let mut active = <ActiveModel as ActiveModelTrait>::default();
    changes.apply(&mut active);
    let order = active.insert(&txn).await?;
    txn.commit().await?;

    tracing::info!(order_id = order.id, user_id = order.user_id, "order created");
    Ok(order.into())
}

pub async fn update_order(state: &AppState, id: i32, payload: &Value) -> AppResult<Order> {
    let txn = state.orm.begin().await?;
    let existing = find_order(&txn, id).await?;
    let changes = OrderChanges::from_json(payload, Mode::Partial)?;

    if let Some(user_id) = changes.user_id {
        find_user(&txn, user_id).await?;
    }

    let order = if changes.is_empty() {
        existing
    } else {
        let mut active: ActiveModel = existing.into();
        changes.apply(&mut active);
        active.update(&txn).await?
    };
    txn.commit().await?;

    Ok(order.into())
}

pub async fn delete_order(state: &AppState, id: i32) -> AppResult<MessageBody> {
    let txn = state.orm.begin().await?;
    find_order(&txn, id).await?;

    let unlinked = order_product_service::unlink_orders(&txn, &[id]).await?;
    Orders::delete_by_id(id).exec(&txn).await?;
    txn.commit().await?;

    tracing::info!(order_id = id, unlinked, "order deleted");
    Ok(MessageBody::new(format!("Order {id} deleted successfully")))
}

pub async fn list_order_products(state: &AppState, id: i32) -> AppResult<Vec<Product>> {
    order_product_service::list_products(&state.orm, id).await
}

pub async fn add_product(
    state: &AppState,
    order_id: i32,
    payload: &Value,
) -> AppResult<MessageBody> {
    let txn = state.orm.begin().await?;
    let order = find_order(&txn, order_id).await?;
    let request = AddProductRequest::from_json(payload)?;

    order_product_service::add_product(&txn, &order, request.product_id).await?;
    txn.commit().await?;

    Ok(MessageBody::new(format!(
        "Product {} added to order {order_id}",
        request.product_id
    )))
}

pub async fn remove_product(
    state: &AppState,
    order_id: i32,
    product_id: i32,
) -> AppResult<MessageBody> {
    let txn = state.orm.begin().await?;
    order_product_service::remove_product(&txn, order_id, product_id).await?;
    txn.commit().await?;

    Ok(MessageBody::new(format!(
        "Product {product_id} removed from order {order_id}"
    )))
}

pub(crate) async fn find_order<C: ConnectionTrait>(db: &C, id: i32) -> AppResult<OrderModel> {
    Orders::find_by_id(id)
        .one(db)
        .await?
        .ok_or_else(|| AppError::not_found("Order"))
}
