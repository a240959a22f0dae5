use std::cmp::Ordering;

use serde_json::Value;

use super::Row;

/// Equality-based row selector used for lookups and scoped bulk updates
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Filter {
    conditions: Vec<(String, Value)>,
    exclusions: Vec<(String, Value)>,
    order_by: Option<String>,
}

impl Filter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Keep rows whose `field` equals `value` (a missing field reads as null)
    pub fn eq(mut self, field: &str, value: impl Into<Value>) -> Self {
        self.conditions.push((field.to_string(), value.into()));
        self
    }

    /// Drop rows whose `field` equals `value`
    pub fn exclude(mut self, field: &str, value: impl Into<Value>) -> Self {
        self.exclusions.push((field.to_string(), value.into()));
        self
    }

    /// Sort matches ascending by `field`; ties keep primary key order
    pub fn order_by(mut self, field: &str) -> Self {
        self.order_by = Some(field.to_string());
        self
    }

    pub fn ordering(&self) -> Option<&str> {
        self.order_by.as_deref()
    }

    pub fn matches(&self, row: &Row) -> bool {
        let field_value = |field: &str| row.get(field).unwrap_or(&Value::Null);

        self.conditions
            .iter()
            .all(|(field, value)| field_value(field) == value)
            && !self
                .exclusions
                .iter()
                .any(|(field, value)| field_value(field) == value)
    }

    /// Sort rows in place according to `order_by`, if any
    pub fn sort(&self, rows: &mut [Row]) {
        if let Some(field) = &self.order_by {
            rows.sort_by(|a, b| {
                compare_values(
                    a.get(field).unwrap_or(&Value::Null),
                    b.get(field).unwrap_or(&Value::Null),
                )
            });
        }
    }
}

// nulls first, then numbers, then strings; anything else compares equal
fn compare_values(a: &Value, b: &Value) -> Ordering {
    match (a, b) {
        (Value::Null, Value::Null) => Ordering::Equal,
        (Value::Null, _) => Ordering::Less,
        (_, Value::Null) => Ordering::Greater,
        (Value::Number(x), Value::Number(y)) => x
            .as_f64()
            .partial_cmp(&y.as_f64())
            .unwrap_or(Ordering::Equal),
        (Value::String(x), Value::String(y)) => x.cmp(y),
        (Value::Bool(x), Value::Bool(y)) => x.cmp(y),
        _ => Ordering::Equal,
    }
}
