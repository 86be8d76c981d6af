use sea_orm::{ActiveModelTrait, ConnectionTrait, EntityTrait, QueryOrder, TransactionTrait};
use serde_json::Value;

use crate::{
    dto::products::ProductChanges,
    entity::products::{ActiveModel, Column, Entity as Products, Model as ProductModel},
    error::{AppError, AppResult},
    models::Product,
    response::MessageBody,
    services::order_product_service::unlink_product,
    state::AppState,
    validation::Mode,
};

pub async fn list_products(state: &AppState) -> AppResult<Vec<Product>> {
    let items = Products::find()
        .order_by_asc(Column::Id)
        .all(&state.orm)
        .await?
        .into_iter()
        .map(Product::from)
        .collect();
    Ok(items)
}

pub async fn get_product(state: &AppState, id: i32) -> AppResult<Product> {
    let product = find_product(&state.orm, id).await?;
    Ok(product.into())
}

pub async fn create_product(state: &AppState, payload: &Value) -> AppResult<Product> {
    let changes = ProductChanges::from_json(payload, Mode::Full)?;

    let txn = state.orm.begin().await?;
    let mut active = <ActiveModel as ActiveModelTrait>::default();
    changes.apply(&mut active);
    let product = active.insert(&txn).await?;
    txn.commit().await?;

    tracing::info!(product_id = product.id, "product created");
    Ok(product.into())
}

pub async fn update_product(state: &AppState, id: i32, payload: &Value) -> AppResult<Product> {
    let txn = state.orm.begin().await?;
    let existing = find_product(&txn, id).await?;
    let changes = ProductChanges::from_json(payload, Mode::Partial)?;

    let product = if changes.is_empty() {
        existing
    } else {
        let mut active: ActiveModel = existing.into();
        changes.apply(&mut active);
        active.update(&txn).await?
    };
    txn.commit().await?;

    Ok(product.into())
}

pub async fn delete_product(state: &AppState, id: i32) -> AppResult<MessageBody> {
    let txn = state.orm.begin().await?;
    find_product(&txn, id).await?;

    let unlinked = unlink_product(&txn, id).await?;
    Products::delete_by_id(id).exec(&txn).await?;
    txn.commit().await?;

    tracing::info!(product_id = id, unlinked, "product deleted");
    Ok(MessageBody::new(format!("Product {id} deleted successfully")))
}

pub(crate) async fn find_product<C: ConnectionTrait>(db: &C, id: i32) -> AppResult<ProductModel> {
    Products::find_by_id(id)
        .one(db)
        .await?
        .ok_or_else(|| AppError::not_found("Product"))
}
