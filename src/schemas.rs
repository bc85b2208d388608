//! Request and response shapes for the property endpoints.
//!
//! Input is validated field by field from the raw JSON document so that every
//! failing field is reported at once, with the location and a stable error
//! kind. Nothing in here touches the database.

use crate::entities;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;

/// One failed check, located by path (`["body", "price"]`, `["query", "limit"]`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldError {
    pub loc: Vec<String>,
    pub msg: String,
    #[serde(rename = "type")]
    pub kind: String,
}

impl FieldError {
    pub fn new(loc: &[&str], kind: &str, msg: impl Into<String>) -> Self {
        Self {
            loc: loc.iter().map(|s| s.to_string()).collect(),
            msg: msg.into(),
            kind: kind.to_string(),
        }
    }

    /// Last path segment, usually the field name.
    pub fn field(&self) -> &str {
        self.loc.last().map(String::as_str).unwrap_or_default()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ValidationError {
    pub errors: Vec<FieldError>,
}

impl ValidationError {
    pub fn single(loc: &[&str], kind: &str, msg: impl Into<String>) -> Self {
        Self {
            errors: vec![FieldError::new(loc, kind, msg)],
        }
    }

    pub fn has_field(&self, field: &str) -> bool {
        self.errors.iter().any(|e| e.field() == field)
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<String> = self
            .errors
            .iter()
            .map(|e| format!("{}: {}", e.loc.join("."), e.msg))
            .collect();
        write!(f, "{}", parts.join("; "))
    }
}

impl std::error::Error for ValidationError {}

/// Validated input for creating or replacing a property.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PropertyCreate {
    pub name: String,
    pub address: String,
    pub price: f64,
}

impl PropertyCreate {
    pub fn new(name: impl Into<String>, address: impl Into<String>, price: f64) -> Self {
        Self {
            name: name.into(),
            address: address.into(),
            price,
        }
    }

    /// Validate a request body. Unknown keys are ignored.
    pub fn from_json(body: &Value) -> Result<Self, ValidationError> {
        let Some(obj) = body.as_object() else {
            return Err(ValidationError::single(
                &["body"],
                "model_attributes_type",
                "Input should be a valid JSON object",
            ));
        };

        let mut errors = Vec::new();
        let name = take_string(obj, "name", &mut errors);
        let address = take_string(obj, "address", &mut errors);
        let price = take_price(obj, "price", &mut errors);

        match (name, address, price) {
            (Some(name), Some(address), Some(price)) if errors.is_empty() => Ok(Self {
                name,
                address,
                price,
            }),
            _ => Err(ValidationError { errors }),
        }
    }
}

fn take_string(obj: &Map<String, Value>, field: &str, errors: &mut Vec<FieldError>) -> Option<String> {
    match obj.get(field) {
        None => {
            errors.push(FieldError::new(&["body", field], "missing", "Field required"));
            None
        }
        Some(Value::String(s)) => Some(s.clone()),
        Some(_) => {
            errors.push(FieldError::new(
                &["body", field],
                "string_type",
                "Input should be a valid string",
            ));
            None
        }
    }
}

fn take_price(obj: &Map<String, Value>, field: &str, errors: &mut Vec<FieldError>) -> Option<f64> {
    let Some(value) = obj.get(field) else {
        errors.push(FieldError::new(&["body", field], "missing", "Field required"));
        return None;
    };
    match coerce_price(value) {
        Ok(price) => Some(price),
        Err((kind, msg)) => {
            errors.push(FieldError::new(&["body", field], kind, msg));
            None
        }
    }
}

/// Lax float coercion: JSON numbers and numeric strings are accepted.
pub fn coerce_price(value: &Value) -> Result<f64, (&'static str, &'static str)> {
    let price = match value {
        Value::Number(n) => n
            .as_f64()
            .ok_or(("float_type", "Input should be a valid number"))?,
        Value::String(s) => s.trim().parse::<f64>().map_err(|_| {
            (
                "float_parsing",
                "Input should be a valid number, unable to parse string as a number",
            )
        })?,
        _ => return Err(("float_type", "Input should be a valid number")),
    };
    if !price.is_finite() {
        return Err(("finite_number", "Input should be a finite number"));
    }
    Ok(price)
}

/// Served representation of a stored property.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Property {
    pub id: i32,
    pub name: String,
    pub address: String,
    pub price: f64,
}

impl From<entities::property::Model> for Property {
    fn from(model: entities::property::Model) -> Self {
        Self {
            id: model.id,
            name: model.name,
            address: model.address,
            price: model.price,
        }
    }
}

/// Offset based page bounds. Only constructed through [`Page::new`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Page {
    offset: u64,
    limit: u64,
}

impl Page {
    pub fn new(offset: i64, limit: i64) -> Result<Self, ValidationError> {
        let mut errors = Vec::new();
        if offset < 0 {
            errors.push(FieldError::new(
                &["query", "skip"],
                "greater_than_equal",
                "Input should be greater than or equal to 0",
            ));
        }
        if limit <= 0 {
            errors.push(FieldError::new(
                &["query", "limit"],
                "greater_than",
                "Input should be greater than 0",
            ));
        }
        if !errors.is_empty() {
            return Err(ValidationError { errors });
        }
        Ok(Self {
            offset: offset as u64,
            limit: limit as u64,
        })
    }

    pub fn offset(&self) -> u64 {
        self.offset
    }

    pub fn limit(&self) -> u64 {
        self.limit
    }
}

/// Filters behind the search endpoint. Every field is optional.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PropertyFilter {
    pub name: Option<String>,
    pub min_price: Option<f64>,
    pub max_price: Option<f64>,
}

impl PropertyFilter {
    pub fn validate(&self) -> Result<(), ValidationError> {
        let mut errors = Vec::new();
        for (field, bound) in [("min_price", self.min_price), ("max_price", self.max_price)] {
            if matches!(bound, Some(v) if !v.is_finite()) {
                errors.push(FieldError::new(
                    &["query", field],
                    "finite_number",
                    "Input should be a finite number",
                ));
            }
        }
        if let (Some(min), Some(max)) = (self.min_price, self.max_price) {
            if min > max {
                errors.push(FieldError::new(
                    &["query", "max_price"],
                    "greater_than_equal",
                    "max_price should be greater than or equal to min_price",
                ));
            }
        }
        if errors.is_empty() {
            Ok(())
        } else {
            Err(ValidationError { errors })
        }
    }

    /// Name needle exactly as given, `None` when empty or only whitespace.
    pub fn name_needle(&self) -> Option<&str> {
        self.name.as_deref().filter(|s| !s.trim().is_empty())
    }
}
