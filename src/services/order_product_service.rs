//! Order ↔ product association management.
//!
//! Every function takes the connection it should run on, so callers can pass
//! the request transaction and have all checks and writes commit together.

use sea_orm::{
    ActiveValue::Set, ColumnTrait, ConnectionTrait, EntityTrait, QueryFilter, QueryOrder, SqlErr,
};

use crate::{
    entity::{
        OrderProducts, Products,
        order_products::{ActiveModel as LinkActive, Column as LinkCol},
        orders::Model as OrderModel,
        products::Column as ProdCol,
    },
    error::{AppError, AppResult},
    models::Product,
    services::{order_service::find_order, product_service::find_product},
};

pub const ALREADY_IN_ORDER: &str = "Product already in order";
pub const NOT_IN_ORDER: &str = "Product not in order";

pub async fn list_products<C: ConnectionTrait>(db: &C, order_id: i32) -> AppResult<Vec<Product>> {
    find_order(db, order_id).await?;

    let products = Products::find()
        .inner_join(OrderProducts)
        .filter(LinkCol::OrderId.eq(order_id))
        .order_by_asc(ProdCol::Id)
        .all(db)
        .await?
        .into_iter()
        .map(Product::from)
        .collect();

    Ok(products)
}

/// Link a product to an order the caller has already loaded.
pub async fn add_product<C: ConnectionTrait>(
    db: &C,
    order: &OrderModel,
    product_id: i32,
) -> AppResult<()> {
    find_product(db, product_id).await?;

    if is_linked(db, order.id, product_id).await? {
        tracing::warn!(order_id = order.id, product_id, "product already in order");
        return Err(AppError::Conflict(ALREADY_IN_ORDER.into()));
    }

    insert_link(db, order.id, product_id).await?;
    tracing::info!(order_id = order.id, product_id, "product added to order");
    Ok(())
}

/// Insert the association row. A unique violation (a concurrent request won
/// the race past `is_linked`) is reported as a conflict.
pub async fn insert_link<C: ConnectionTrait>(
    db: &C,
    order_id: i32,
    product_id: i32,
) -> AppResult<()> {
    let link = LinkActive {
        order_id: Set(order_id),
        product_id: Set(product_id),
    };

    match OrderProducts::insert(link).exec_without_returning(db).await {
        Ok(_) => Ok(()),
        Err(err) if matches!(err.sql_err(), Some(SqlErr::UniqueConstraintViolation(_))) => {
            tracing::warn!(order_id, product_id, "association insert lost a race");
            Err(AppError::Conflict(ALREADY_IN_ORDER.into()))
        }
        Err(err) => Err(err.into()),
    }
}

pub async fn remove_product<C: ConnectionTrait>(
    db: &C,
    order_id: i32,
    product_id: i32,
) -> AppResult<()> {
    find_order(db, order_id).await?;
    find_product(db, product_id).await?;

    let result = OrderProducts::delete_many()
        .filter(LinkCol::OrderId.eq(order_id))
        .filter(LinkCol::ProductId.eq(product_id))
        .exec(db)
        .await?;

    if result.rows_affected == 0 {
        return Err(AppError::NotFound(NOT_IN_ORDER.into()));
    }

    tracing::info!(order_id, product_id, "product removed from order");
    Ok(())
}

/// Drop every association row of the given orders.
pub async fn unlink_orders<C: ConnectionTrait>(db: &C, order_ids: &[i32]) -> AppResult<u64> {
    if order_ids.is_empty() {
        return Ok(0);
    }
    let result = OrderProducts::delete_many()
        .filter(LinkCol::OrderId.is_in(order_ids.iter().copied()))
        .exec(db)
        .await?;
    Ok(result.rows_affected)
}

/// Drop every association row pointing at the product.
pub async fn unlink_product<C: ConnectionTrait>(db: &C, product_id: i32) -> AppResult<u64> {
    let result = OrderProducts::delete_many()
        .filter(LinkCol::ProductId.eq(product_id))
        .exec(db)
        .await?;
    Ok(result.rows_affected)
}

async fn is_linked<C: ConnectionTrait>(db: &C, order_id: i32, product_id: i32) -> AppResult<bool> {
    let link = OrderProducts::find_by_id((order_id, product_id)).one(db).await?;
    Ok(link.is_some())
}
