use sea_orm::ActiveValue::Set;
use serde::Deserialize;
use serde_json::Value;
use utoipa::ToSchema;

use crate::{
    entity::products::ActiveModel,
    validation::{FieldSpec, Mode, ValidationErrors, validate},
};

pub const PRODUCT_FIELDS: &[FieldSpec] = &[
    FieldSpec::text("name").required().max_len(100),
    FieldSpec::number("price").required().min(0.0),
];

#[derive(Debug, Deserialize, ToSchema)]
pub struct ProductRequest {
    pub name: String,
    pub price: f64,
}

#[derive(Debug, Default)]
pub struct ProductChanges {
    pub name: Option<String>,
    pub price: Option<f64>,
}

impl ProductChanges {
    pub fn from_json(body: &Value, mode: Mode) -> Result<Self, ValidationErrors> {
        let mut record = validate(body, PRODUCT_FIELDS, mode)?;
        Ok(Self {
            name: record.text("name").flatten(),
            price: record.number("price").flatten(),
        })
    }

    pub fn is_empty(&self) -> bool {
        self.name.is_none() && self.price.is_none()
    }

    pub fn apply(self, active: &mut ActiveModel) {
        if let Some(name) = self.name {
            active.name = Set(name);
        }
        if let Some(price) = self.price {
            active.price = Set(price);
        }
    }
}
