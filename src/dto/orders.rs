use chrono::NaiveDateTime;
use sea_orm::ActiveValue::Set;
use serde::Deserialize;
use serde_json::Value;
use utoipa::ToSchema;

use crate::{
    entity::orders::ActiveModel,
    validation::{FieldSpec, Mode, ValidationErrors, validate},
};

pub const ORDER_FIELDS: &[FieldSpec] = &[
    FieldSpec::timestamp("order_date").required(),
    FieldSpec::integer("user_id").required(),
];

pub const ADD_PRODUCT_FIELDS: &[FieldSpec] = &[FieldSpec::integer("product_id").required()];

#[derive(Debug, Deserialize, ToSchema)]
pub struct OrderRequest {
    pub order_date: NaiveDateTime,
    pub user_id: i32,
}

#[derive(Debug, Default)]
pub struct OrderChanges {
    pub order_date: Option<NaiveDateTime>,
    pub user_id: Option<i32>,
}

impl OrderChanges {
    pub fn from_json(body: &Value, mode: Mode) -> Result<Self, ValidationErrors> {
        let mut record = validate(body, ORDER_FIELDS, mode)?;
        Ok(Self {
            order_date: record.timestamp("order_date").flatten(),
            user_id: record.integer("user_id").flatten(),
        })
    }

    pub fn is_empty(&self) -> bool {
        self.order_date.is_none() && self.user_id.is_none()
    }

    pub fn apply(self, active: &mut ActiveModel) {
        if let Some(order_date) = self.order_date {
            active.order_date = Set(order_date);
        }
        if let Some(user_id) = self.user_id {
            active.user_id = Set(user_id);
        }
    }
}

/// Body of `POST /orders/{id}/products`.
#[derive(Debug, Deserialize, ToSchema)]
pub struct AddProductRequest {
    pub product_id: i32,
}

impl AddProductRequest {
    pub fn from_json(body: &Value) -> Result<Self, ValidationErrors> {
        let mut record = validate(body, ADD_PRODUCT_FIELDS, Mode::Full)?;
        let product_id = record
            .integer("product_id")
            .flatten()
            .ok_or_else(|| ValidationErrors::single("product_id", "Missing data for required field."))?;
        Ok(Self { product_id })
    }
}
