//! Static description of a collection's queryable fields.
//!
//! A [`CollectionSchema`] maps the public (API) field names onto storage
//! expressions and tells the query layer how to coerce raw string values.

use chrono::{DateTime, NaiveDate, Utc};
use serde_json::{Value, json};
use std::cmp::Ordering;

use crate::error::AppError;

/// Storage type of a field, used to coerce query-string values.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    Id,
    Text,
    Number,
    Integer,
    Bool,
    Timestamp,
    /// Arrays and embedded documents: projected, never filtered or sorted on.
    Composite,
}

/// A single queryable field.
#[derive(Debug, Clone, Copy)]
pub struct FieldDef {
    /// Public name as it appears in documents and query parameters.
    pub name: &'static str,
    /// SQL expression for the field, evaluated against the collection's table.
    pub column: &'static str,
    pub kind: FieldKind,
    /// Hidden fields can be filtered on but are never returned in documents.
    pub hidden: bool,
}

impl FieldDef {
    pub const fn new(name: &'static str, column: &'static str, kind: FieldKind) -> Self {
        Self {
            name,
            column,
            kind,
            hidden: false,
        }
    }

    pub const fn hidden(name: &'static str, column: &'static str, kind: FieldKind) -> Self {
        Self {
            name,
            column,
            kind,
            hidden: true,
        }
    }
}

/// Queryable shape of a collection.
#[derive(Debug)]
pub struct CollectionSchema {
    pub name: &'static str,
    pub table: &'static str,
    pub fields: &'static [FieldDef],
}

impl CollectionSchema {
    /// Looks up a field by its public name.
    pub fn field(&self, name: &str) -> Option<&FieldDef> {
        self.fields.iter().find(|f| f.name == name)
    }

    /// Looks up a field that can be filtered or sorted on.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Validation`] for unknown or composite fields.
    pub fn comparable_field(&self, name: &str, usage: &str) -> Result<&FieldDef, AppError> {
        match self.field(name) {
            Some(field) if field.kind != FieldKind::Composite => Ok(field),
            _ => Err(AppError::bad_request(
                format!("Invalid {} field: {}", usage, name),
                json!({ "collection": self.name, "field": name }),
            )),
        }
    }
}

/// A query-string value coerced to the field's storage type.
#[derive(Debug, Clone, PartialEq)]
pub enum TypedValue {
    Text(String),
    Number(f64),
    Integer(i64),
    Bool(bool),
    Timestamp(DateTime<Utc>),
}

impl FieldDef {
    /// Coerces a raw value for comparison against this field.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Validation`] (`Invalid <field>: <value>`) when the value
    /// cannot be represented in the field's type.
    pub fn coerce(&self, raw: &str) -> Result<TypedValue, AppError> {
        let invalid = || {
            AppError::bad_request(
                format!("Invalid {}: {}", self.name, raw),
                json!({ "field": self.name, "value": raw }),
            )
        };

        let value = raw.trim();
        match self.kind {
            FieldKind::Text => Ok(TypedValue::Text(raw.to_string())),
            FieldKind::Number => value
                .parse::<f64>()
                .ok()
                .filter(|n| n.is_finite())
                .map(TypedValue::Number)
                .ok_or_else(invalid),
            FieldKind::Id | FieldKind::Integer => value
                .parse::<i64>()
                .map(TypedValue::Integer)
                .map_err(|_| invalid()),
            FieldKind::Bool => match value {
                "true" => Ok(TypedValue::Bool(true)),
                "false" => Ok(TypedValue::Bool(false)),
                _ => Err(invalid()),
            },
            FieldKind::Timestamp => parse_timestamp(value)
                .map(TypedValue::Timestamp)
                .ok_or_else(invalid),
            FieldKind::Composite => Err(invalid()),
        }
    }

    /// Reads a document value in this field's type.
    ///
    /// Returns `None` for nulls and values of an unexpected shape.
    pub fn read(&self, value: &Value) -> Option<TypedValue> {
        match (self.kind, value) {
            (FieldKind::Text, Value::String(s)) => Some(TypedValue::Text(s.clone())),
            (FieldKind::Number, Value::Number(n)) => n.as_f64().map(TypedValue::Number),
            (FieldKind::Id | FieldKind::Integer, Value::Number(n)) => {
                n.as_i64().map(TypedValue::Integer)
            }
            (FieldKind::Bool, Value::Bool(b)) => Some(TypedValue::Bool(*b)),
            (FieldKind::Timestamp, Value::String(s)) => {
                parse_timestamp(s).map(TypedValue::Timestamp)
            }
            _ => None,
        }
    }
}

impl TypedValue {
    /// Orders two values of the same type; mismatched types compare equal.
    pub fn compare(&self, other: &TypedValue) -> Ordering {
        match (self, other) {
            (TypedValue::Text(a), TypedValue::Text(b)) => a.cmp(b),
            (TypedValue::Number(a), TypedValue::Number(b)) => a.total_cmp(b),
            (TypedValue::Integer(a), TypedValue::Integer(b)) => a.cmp(b),
            (TypedValue::Bool(a), TypedValue::Bool(b)) => a.cmp(b),
            (TypedValue::Timestamp(a), TypedValue::Timestamp(b)) => a.cmp(b),
            _ => Ordering::Equal,
        }
    }
}

/// Accepts RFC 3339 timestamps and plain `YYYY-MM-DD` dates (midnight UTC).
pub fn parse_timestamp(value: &str) -> Option<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
        return Some(dt.with_timezone(&Utc));
    }

    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|dt| dt.and_utc())
}

#[cfg(test)]
mod tests {
    use super::*;

    const FIELDS: &[FieldDef] = &[
        FieldDef::new("price", "price", FieldKind::Number),
        FieldDef::new("images", "images", FieldKind::Composite),
        FieldDef::new("createdAt", "created_at", FieldKind::Timestamp),
    ];

    const SCHEMA: CollectionSchema = CollectionSchema {
        name: "things",
        table: "things",
        fields: FIELDS,
    };

    #[test]
    fn test_coerce_number() {
        let price = SCHEMA.field("price").unwrap();
        assert_eq!(price.coerce("10.5").unwrap(), TypedValue::Number(10.5));
        assert_eq!(price.coerce(" 7 ").unwrap(), TypedValue::Number(7.0));
    }

    #[test]
    fn test_coerce_number_rejects_garbage() {
        let price = SCHEMA.field("price").unwrap();
        let err = price.coerce("abc").unwrap_err();
        assert_eq!(err.message(), "Invalid price: abc");
        assert!(price.coerce("NaN").is_err());
    }

    #[test]
    fn test_comparable_field_rejects_composite_and_unknown() {
        assert!(SCHEMA.comparable_field("price", "sort").is_ok());
        assert!(SCHEMA.comparable_field("images", "sort").is_err());
        assert!(SCHEMA.comparable_field("nope", "filter").is_err());
    }

    #[test]
    fn test_parse_timestamp_formats() {
        assert!(parse_timestamp("2024-03-01T10:00:00Z").is_some());
        assert!(parse_timestamp("2024-03-01").is_some());
        assert!(parse_timestamp("yesterday").is_none());
    }

    #[test]
    fn test_read_timestamp_compares_chronologically() {
        let field = SCHEMA.field("createdAt").unwrap();
        let a = field.read(&json!("2024-01-01T00:00:00.500Z")).unwrap();
        let b = field.read(&json!("2024-01-01T00:00:01Z")).unwrap();
        assert_eq!(a.compare(&b), Ordering::Less);
    }
}
