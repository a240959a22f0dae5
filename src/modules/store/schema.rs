use std::any::TypeId;
use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use lazy_static::lazy_static;
use serde_json::Value;

use super::{Model, ModelError, Row};
use crate::modules::choices::Enumeration;

/// Effective choice set of an enumerated field
#[derive(Debug, Clone, PartialEq)]
pub enum ChoiceSet {
    Int(Enumeration<i64>),
    Text(Enumeration<String>),
}

impl ChoiceSet {
    /// Check a persisted JSON value against the declared codes
    pub fn contains_value(&self, value: &Value) -> bool {
        match self {
            ChoiceSet::Int(e) => value.as_i64().map_or(false, |code| e.contains(&code)),
            ChoiceSet::Text(e) => value
                .as_str()
                .map_or(false, |code| e.contains(&code.to_string())),
        }
    }

    pub fn len(&self) -> usize {
        match self {
            ChoiceSet::Int(e) => e.len(),
            ChoiceSet::Text(e) => e.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn as_int(&self) -> Option<&Enumeration<i64>> {
        match self {
            ChoiceSet::Int(e) => Some(e),
            ChoiceSet::Text(_) => None,
        }
    }

    pub fn as_text(&self) -> Option<&Enumeration<String>> {
        match self {
            ChoiceSet::Text(e) => Some(e),
            ChoiceSet::Int(_) => None,
        }
    }
}

impl From<Enumeration<i64>> for ChoiceSet {
    fn from(e: Enumeration<i64>) -> Self {
        ChoiceSet::Int(e)
    }
}

impl From<Enumeration<String>> for ChoiceSet {
    fn from(e: Enumeration<String>) -> Self {
        ChoiceSet::Text(e)
    }
}

/// Registration-time description of an entity type's table
#[derive(Debug, Clone, PartialEq)]
pub struct ModelSchema {
    table: &'static str,
    unique: Vec<&'static str>,
    choices: HashMap<&'static str, ChoiceSet>,
}

impl ModelSchema {
    pub fn table(&self) -> &'static str {
        self.table
    }

    pub fn unique_fields(&self) -> &[&'static str] {
        &self.unique
    }

    pub fn field_choices(&self, field: &str) -> Option<&ChoiceSet> {
        self.choices.get(field)
    }

    /// Reject any field value that falls outside its declared choice set.
    /// Nulls and fields without a declared set pass.
    pub fn validate_row(&self, row: &Row) -> Result<(), ModelError> {
        for (field, set) in &self.choices {
            match row.get(*field) {
                None | Some(Value::Null) => continue,
                Some(value) if set.contains_value(value) => continue,
                Some(value) => {
                    return Err(ModelError::InvalidChoice {
                        field: field.to_string(),
                        value: value.to_string(),
                    })
                }
            }
        }
        Ok(())
    }
}

/// Collects unique columns and field choices while an entity type registers
pub struct SchemaBuilder {
    schema: ModelSchema,
}

impl SchemaBuilder {
    pub fn new(table: &'static str) -> Self {
        Self {
            schema: ModelSchema {
                table,
                unique: Vec::new(),
                choices: HashMap::new(),
            },
        }
    }

    pub fn unique(&mut self, field: &'static str) -> &mut Self {
        if !self.schema.unique.contains(&field) {
            self.schema.unique.push(field);
        }
        self
    }

    /// Install (or replace) the choice set for a field. Later calls win, so a
    /// concrete type registering after its abstract defaults finishes the field.
    pub fn set_field_choices(
        &mut self,
        field: &'static str,
        choices: impl Into<ChoiceSet>,
    ) -> &mut Self {
        self.schema.choices.insert(field, choices.into());
        self
    }

    pub fn build(self) -> ModelSchema {
        self.schema
    }
}

lazy_static! {
    static ref SCHEMAS: RwLock<HashMap<TypeId, Arc<ModelSchema>>> = RwLock::new(HashMap::new());
}

/// Resolved schema for `M`, built from `M::declare_schema` on first use and cached
pub fn schema_for<M: Model>() -> Arc<ModelSchema> {
    let key = TypeId::of::<M>();

    if let Some(schema) = SCHEMAS
        .read()
        .unwrap_or_else(|poisoned| poisoned.into_inner())
        .get(&key)
    {
        return Arc::clone(schema);
    }

    let mut builder = SchemaBuilder::new(M::TABLE);
    M::declare_schema(&mut builder);
    let schema = Arc::new(builder.build());

    let mut schemas = SCHEMAS
        .write()
        .unwrap_or_else(|poisoned| poisoned.into_inner());
    Arc::clone(schemas.entry(key).or_insert(schema))
}
