use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, QueryFilter, QueryOrder,
    QuerySelect, TransactionTrait,
};
use serde_json::Value;

use crate::{
    dto::users::UserChanges,
    entity::{
        orders::{Column as OrderCol, Entity as Orders},
        users::{ActiveModel, Column, Entity as Users, Model as UserModel},
    },
    error::{AppError, AppResult},
    models::{Order, User},
    response::MessageBody,
    services::order_product_service::unlink_orders,
    state::AppState,
    validation::Mode,
};

pub async fn list_users(state: &AppState) -> AppResult<Vec<User>> {
    let items = Users::find()
        .order_by_asc(Column::Id)
        .all(&state.orm)
        .await?
        .into_iter()
        .map(User::from)
        .collect();
    Ok(items)
}

pub async fn get_user(state: &AppState, id: i32) -> AppResult<User> {
    let user = find_user(&state.orm, id).await?;
    Ok(user.into())
}

pub async fn create_user(state: &AppState, payload: &Value) -> AppResult<User> {
    let changes = UserChanges::from_json(payload, Mode::Full)?;

    let txn = state.orm.begin().await?;
    let mut active = <ActiveModel as ActiveModelTrait>::default();
    changes.apply(&mut active);
    let user = active.insert(&txn).await?;
    txn.commit().await?;

    tracing::info!(user_id = user.id, "user created");
    Ok(user.into())
}

pub async fn update_user(state: &AppState, id: i32, payload: &Value) -> AppResult<User> {
    let txn = state.orm.begin().await?;
    let existing = find_user(&txn, id).await?;
    let changes = UserChanges::from_json(payload, Mode::Partial)?;

    let user = if changes.is_empty() {
        existing
    } else {
        let mut active: ActiveModel = existing.into();
        changes.apply(&mut active);
        active.update(&txn).await?
    };
    txn.commit().await?;

    Ok(user.into())
}

/// Deletes the user together with their orders and those orders' associations.
pub async fn delete_user(state: &AppState, id: i32) -> AppResult<MessageBody> {
    let txn = state.orm.begin().await?;
    find_user(&txn, id).await?;

    let order_ids: Vec<i32> = Orders::find()
        .select_only()
        .column(OrderCol::Id)
        .filter(OrderCol::UserId.eq(id))
        .into_tuple()
        .all(&txn)
        .await?;

    unlink_orders(&txn, &order_ids).await?;
    Orders::delete_many()
        .filter(OrderCol::UserId.eq(id))
        .exec(&txn)
        .await?;
    Users::delete_by_id(id).exec(&txn).await?;
    txn.commit().await?;

    tracing::info!(user_id = id, orders = order_ids.len(), "user deleted");
    Ok(MessageBody::new("User deleted successfully"))
}

pub async fn list_user_orders(state: &AppState, id: i32) -> AppResult<Vec<Order>> {
    find_user(&state.orm, id).await?;

    let orders = Orders::find()
        .filter(OrderCol::UserId.eq(id))
        .order_by_asc(OrderCol::Id)
        .all(&state.orm)
        .await?
        .into_iter()
        .map(Order::from)
        .collect();
    Ok(orders)
}

pub(crate) async fn find_user<C: ConnectionTrait>(db: &C, id: i32) -> AppResult<UserModel> {
    Users::find_by_id(id)
        .one(db)
        .await?
        .ok_or_else(|| AppError::not_found("User"))
}
