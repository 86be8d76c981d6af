//! Table-driven validation of raw JSON request bodies.
//!
//! Each entity describes its fields as a slice of [`FieldSpec`]s. [`validate`]
//! walks the table once and collects every problem before failing, so a client
//! sees all bad fields in a single response.

use std::{collections::BTreeMap, fmt};

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde::Serialize;
use serde_json::Value;
use utoipa::ToSchema;

/// Error key used when the body itself is not a JSON object.
pub const SCHEMA_KEY: &str = "_schema";

const TIMESTAMP_FORMATS: [&str; 2] = ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    Text,
    Integer,
    Number,
    Timestamp,
}

/// Full validation requires every required field. Partial validation only
/// checks the fields that are present and is used for updates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    Full,
    Partial,
}

#[derive(Debug, Clone, Copy)]
pub struct FieldSpec {
    pub name: &'static str,
    pub kind: FieldKind,
    pub required: bool,
    pub max_len: Option<usize>,
    pub min: Option<f64>,
}

impl FieldSpec {
    pub const fn new(name: &'static str, kind: FieldKind) -> Self {
        Self {
            name,
            kind,
            required: false,
            max_len: None,
            min: None,
        }
    }

    pub const fn text(name: &'static str) -> Self {
        Self::new(name, FieldKind::Text)
    }

    pub const fn integer(name: &'static str) -> Self {
        Self::new(name, FieldKind::Integer)
    }

    pub const fn number(name: &'static str) -> Self {
        Self::new(name, FieldKind::Number)
    }

    pub const fn timestamp(name: &'static str) -> Self {
        Self::new(name, FieldKind::Timestamp)
    }

    pub const fn required(mut self) -> Self {
        self.required = true;
        self
    }

    pub const fn max_len(mut self, max: usize) -> Self {
        self.max_len = Some(max);
        self
    }

    pub const fn min(mut self, min: f64) -> Self {
        self.min = Some(min);
        self
    }

    fn check(&self, value: &Value) -> Result<FieldValue, Vec<String>> {
        match self.kind {
            FieldKind::Text => {
                let Some(text) = value.as_str() else {
                    return Err(vec!["Not a valid string.".to_string()]);
                };
                let mut messages = Vec::new();
                if self.required && text.trim().is_empty() {
                    messages.push("Field may not be blank.".to_string());
                }
                if let Some(max) = self.max_len
                    && text.chars().count() > max
                {
                    messages.push(format!("Longer than maximum length {max}."));
                }
                if messages.is_empty() {
                    Ok(FieldValue::Text(text.to_string()))
                } else {
                    Err(messages)
                }
            }
            FieldKind::Integer => {
                let number = parse_integer(value)
                    .ok_or_else(|| vec!["Not a valid integer.".to_string()])?;
                self.check_min(f64::from(number))?;
                Ok(FieldValue::Integer(number))
            }
            FieldKind::Number => {
                let number =
                    parse_number(value).ok_or_else(|| vec!["Not a valid number.".to_string()])?;
                self.check_min(number)?;
                Ok(FieldValue::Number(number))
            }
            FieldKind::Timestamp => parse_timestamp(value)
                .map(FieldValue::Timestamp)
                .ok_or_else(|| vec!["Not a valid datetime.".to_string()]),
        }
    }

    fn check_min(&self, number: f64) -> Result<(), Vec<String>> {
        match self.min {
            Some(min) if number < min => {
                Err(vec![format!("Must be greater than or equal to {min}.")])
            }
            _ => Ok(()),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    Null,
    Text(String),
    Integer(i32),
    Number(f64),
    Timestamp(NaiveDateTime),
}

/// Fields that passed validation, keyed by name.
///
/// Accessors return `None` when the field was absent and `Some(None)` when it
/// was explicitly null.
#[derive(Debug, Default)]
pub struct Record {
    fields: BTreeMap<&'static str, FieldValue>,
}

impl Record {
    #[cfg(test)]
    fn contains(&self, name: &str) -> bool {
        self.fields.contains_key(name)
    }

    pub fn text(&mut self, name: &str) -> Option<Option<String>> {
        match self.fields.remove(name)? {
            FieldValue::Text(text) => Some(Some(text)),
            FieldValue::Null => Some(None),
            _ => None,
        }
    }

    pub fn integer(&mut self, name: &str) -> Option<Option<i32>> {
        match self.fields.remove(name)? {
            FieldValue::Integer(number) => Some(Some(number)),
            FieldValue::Null => Some(None),
            _ => None,
        }
    }

    pub fn number(&mut self, name: &str) -> Option<Option<f64>> {
        match self.fields.remove(name)? {
            FieldValue::Number(number) => Some(Some(number)),
            FieldValue::Null => Some(None),
            _ => None,
        }
    }

    pub fn timestamp(&mut self, name: &str) -> Option<Option<NaiveDateTime>> {
        match self.fields.remove(name)? {
            FieldValue::Timestamp(at) => Some(Some(at)),
            FieldValue::Null => Some(None),
            _ => None,
        }
    }
}

/// Field-keyed validation messages.
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize, ToSchema)]
#[serde(transparent)]
pub struct ValidationErrors(BTreeMap<String, Vec<String>>);

impl ValidationErrors {
    pub fn single(field: impl Into<String>, message: impl Into<String>) -> Self {
        let mut errors = Self::default();
        errors.add(field, message);
        errors
    }

    pub fn add(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.0.entry(field.into()).or_default().push(message.into());
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn field(&self, name: &str) -> Option<&[String]> {
        self.0.get(name).map(Vec::as_slice)
    }

    pub fn fields(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let fields: Vec<&str> = self.fields().collect();
        write!(f, "invalid fields: {}", fields.join(", "))
    }
}

impl std::error::Error for ValidationErrors {}

/// Check `input` against `fields`, returning the typed values or every error found.
pub fn validate(input: &Value, fields: &[FieldSpec], mode: Mode) -> Result<Record, ValidationErrors> {
    let Some(object) = input.as_object() else {
        return Err(ValidationErrors::single(SCHEMA_KEY, "Invalid input type."));
    };

    let mut errors = ValidationErrors::default();
    let mut record = Record::default();

    for spec in fields {
        match object.get(spec.name) {
            None => {
                if spec.required && mode == Mode::Full {
                    errors.add(spec.name, "Missing data for required field.");
                }
            }
            Some(Value::Null) => {
                if spec.required {
                    errors.add(spec.name, "Field may not be null.");
                } else {
                    record.fields.insert(spec.name, FieldValue::Null);
                }
            }
            Some(value) => match spec.check(value) {
                Ok(checked) => {
                    record.fields.insert(spec.name, checked);
                }
                Err(messages) => {
                    for message in messages {
                        errors.add(spec.name, message);
                    }
                }
            },
        }
    }

    for key in object.keys() {
        if !fields.iter().any(|spec| spec.name == key) {
            errors.add(key.as_str(), "Unknown field.");
        }
    }

    if errors.is_empty() {
        Ok(record)
    } else {
        Err(errors)
    }
}

fn parse_integer(value: &Value) -> Option<i32> {
    match value {
        Value::Number(number) => {
            if let Some(whole) = number.as_i64() {
                return i32::try_from(whole).ok();
            }
            let float = number.as_f64()?;
            let in_range = float >= f64::from(i32::MIN) && float <= f64::from(i32::MAX);
            (float.fract() == 0.0 && in_range).then_some(float as i32)
        }
        Value::String(text) => text.trim().parse::<i32>().ok(),
        _ => None,
    }
}

fn parse_number(value: &Value) -> Option<f64> {
    match value {
        Value::Number(number) => number.as_f64(),
        Value::String(text) => text.trim().parse::<f64>().ok().filter(|n| n.is_finite()),
        _ => None,
    }
}

fn parse_timestamp(value: &Value) -> Option<NaiveDateTime> {
    let text = value.as_str()?.trim();
    if let Ok(at) = DateTime::parse_from_rfc3339(text) {
        return Some(at.with_timezone(&Utc).naive_utc());
    }
    TIMESTAMP_FORMATS
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(text, format).ok())
        .or_else(|| {
            NaiveDate::parse_from_str(text, "%Y-%m-%d")
                .ok()
                .and_then(|date| date.and_hms_opt(0, 0, 0))
        })
}
