use sea_orm::ActiveValue::Set;
use serde::Deserialize;
use serde_json::Value;
use utoipa::ToSchema;

use crate::{
    entity::users::ActiveModel,
    validation::{FieldSpec, Mode, ValidationErrors, validate},
};

pub const USER_FIELDS: &[FieldSpec] = &[
    FieldSpec::text("name").required().max_len(50),
    FieldSpec::text("email").max_len(200),
    FieldSpec::integer("street_number"),
    FieldSpec::text("street_name").max_len(100),
    FieldSpec::text("city").max_len(100),
    FieldSpec::text("state").max_len(100),
    FieldSpec::text("zip_code").max_len(20),
];

/// Body of `POST /users`. `PUT /users/{id}` accepts any subset of it.
#[derive(Debug, Deserialize, ToSchema)]
pub struct UserRequest {
    pub name: String,
    pub email: Option<String>,
    pub street_number: Option<i32>,
    pub street_name: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub zip_code: Option<String>,
}

/// Validated user fields. Outer `None` means "leave unchanged".
#[derive(Debug, Default)]
pub struct UserChanges {
    pub name: Option<String>,
    pub email: Option<Option<String>>,
    pub street_number: Option<Option<i32>>,
    pub street_name: Option<Option<String>>,
    pub city: Option<Option<String>>,
    pub state: Option<Option<String>>,
    pub zip_code: Option<Option<String>>,
}

impl UserChanges {
    pub fn from_json(body: &Value, mode: Mode) -> Result<Self, ValidationErrors> {
        let mut record = validate(body, USER_FIELDS, mode)?;
        Ok(Self {
            name: record.text("name").flatten(),
            email: record.text("email"),
            street_number: record.integer("street_number"),
            street_name: record.text("street_name"),
            city: record.text("city"),
            state: record.text("state"),
            zip_code: record.text("zip_code"),
        })
    }

    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.email.is_none()
            && self.street_number.is_none()
            && self.street_name.is_none()
            && self.city.is_none()
            && self.state.is_none()
            && self.zip_code.is_none()
    }

    pub fn apply(self, active: &mut ActiveModel) {
        if let Some(name) = self.name {
            active.name = Set(name);
        }
        if let Some(email) = self.email {
            active.email = Set(email);
        }
        if let Some(street_number) = self.street_number {
            active.street_number = Set(street_number);
        }
        if let Some(street_name) = self.street_name {
            active.street_name = Set(street_name);
        }
        if let Some(city) = self.city {
            active.city = Set(city);
        }
        if let Some(state) = self.state {
            active.state = Set(state);
        }
        if let Some(zip_code) = self.zip_code {
            active.zip_code = Set(zip_code);
        }
    }
}
