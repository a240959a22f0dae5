use serde::{Deserialize, Serialize};

use super::ranking::Ranked;
use crate::modules::choices::Enumeration;
use crate::modules::store::{Model, SchemaBuilder};

pub fn default_number_types() -> Enumeration<i64> {
    Enumeration::new()
        .with(0, "UNKNOWN", "Unknown")
        .with(1, "HOME", "Home")
        .with(2, "WORK", "Work")
        .with(3, "CELL", "Cell/Mobile")
        .with(4, "FAX", "Fax")
}

#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
pub struct PhoneFields {
    pub title: Option<String>,
    pub number: String,
    pub number_type: i64,
    /// When to call, special instructions
    pub notes: Option<String>,
    pub display_order: i64,
}

impl PhoneFields {
    pub fn new(number: &str, number_type: i64) -> Self {
        Self {
            number: number.to_string(),
            number_type,
            ..Self::default()
        }
    }
}

pub trait PhoneNumber: Model + Ranked {
    fn number_types() -> Enumeration<i64> {
        default_number_types()
    }

    fn phone(&self) -> &PhoneFields;
    fn phone_mut(&mut self) -> &mut PhoneFields;

    /// Call from `Model::declare_schema`
    fn declare_phone_choices(schema: &mut SchemaBuilder) {
        schema.set_field_choices("number_type", Self::number_types());
    }

    fn display_title(&self) -> String {
        let fields = self.phone();
        match &fields.title {
            Some(title) if !title.is_empty() => title.clone(),
            _ => Self::number_types()
                .label_of(&fields.number_type)
                .unwrap_or_default()
                .to_string(),
        }
    }
}
