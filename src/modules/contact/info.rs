use serde::{Deserialize, Serialize};

use super::ranking::Ranked;
use crate::modules::choices::{Enumeration, ISO_COUNTRIES};
use crate::modules::store::{Model, SchemaBuilder};

pub const DEFAULT_COUNTRY: &str = "US";

pub fn default_address_types() -> Enumeration<i64> {
    Enumeration::new()
        .with(0, "BILLING", "Billing")
        .with(1, "SHIPPING", "Shipping")
}

/// Postal address columns; every part is optional so foreign formats fit.
/// Flatten into the concrete type.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct ContactFields {
    /// Label; falls back to the address type
    pub title: Option<String>,
    pub address1: Option<String>,
    pub address2: Option<String>,
    pub address3: Option<String>,
    pub city: Option<String>,
    /// State or province
    pub state: Option<String>,
    /// Zip or postal code
    pub zip: Option<String>,
    /// ISO 3166-1 alpha-2
    pub country: Option<String>,
    pub address_type: i64,
    pub display_order: i64,
}

impl Default for ContactFields {
    fn default() -> Self {
        Self {
            title: None,
            address1: None,
            address2: None,
            address3: None,
            city: None,
            state: None,
            zip: None,
            country: Some(DEFAULT_COUNTRY.to_string()),
            address_type: 0,
            display_order: 0,
        }
    }
}

/// Reusable contact address. Concrete types add the owning foreign key and
/// may narrow or widen the country and address type choices.
pub trait ContactInfo: Model + Ranked {
    fn countries() -> Enumeration<String> {
        ISO_COUNTRIES.clone()
    }

    fn address_types() -> Enumeration<i64> {
        default_address_types()
    }

    fn contact(&self) -> &ContactFields;
    fn contact_mut(&mut self) -> &mut ContactFields;

    /// Call from `Model::declare_schema`
    fn declare_contact_choices(schema: &mut SchemaBuilder) {
        schema
            .set_field_choices("country", Self::countries())
            .set_field_choices("address_type", Self::address_types());
    }

    fn display_title(&self) -> String {
        let fields = self.contact();
        match &fields.title {
            Some(title) if !title.is_empty() => title.clone(),
            _ => Self::address_types()
                .label_of(&fields.address_type)
                .unwrap_or_default()
                .to_string(),
        }
    }

    fn country_name(&self) -> Option<String> {
        let code = self.contact().country.as_ref()?;
        Self::countries().label_of(code).map(str::to_string)
    }
}
