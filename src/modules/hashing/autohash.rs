use chrono::{DateTime, Utc};
use serde_json::Value;

use super::HashGenerator;
use crate::modules::store::objects::{first, to_row};
use crate::modules::store::{Filter, Model, ModelError, SchemaBuilder, Store};
use crate::modules::utils::logging::log_data_operation;
use crate::modules::utils::time::{hash_timestamp, now};

/// Column holding the public token
pub const HASH_FIELD: &str = "hash";

/// Entities exposed to end users through an opaque hash instead of their
/// sequential primary key.
///
/// Concrete types must call `ensure_hash` from `Model::pre_save` and
/// `declare_hash_column` from `Model::declare_schema`.
///
/// Two concurrent inserts can still produce the same token. The store's
/// unique constraint rejects the later write with a uniqueness violation;
/// the caller decides whether to call `generate_hash` again and re-save.
/// Nothing here retries.
pub trait AutoHash: Model {
    /// Distinguishes this entity type's hash space. Required; an empty
    /// secret fails at generation time with a configuration error.
    const AUTOHASH_SECRET: &'static str;

    /// Ordered field names whose values feed the hash
    const AUTOHASH_FIELDS: &'static [&'static str] = &[];

    /// Leave the current timestamp out of the hash inputs
    const AUTOHASH_NO_DATETIME: bool = false;

    /// Only generate when `generate_hash` is called explicitly
    const AUTOHASH_ALLOW_EMPTY: bool = false;

    fn hash_token(&self) -> Option<&str>;
    fn set_hash_token(&mut self, token: String);

    /// Text form of each `AUTOHASH_FIELDS` value, in declaration order
    fn autohash_values(&self) -> Result<Vec<String>, ModelError> {
        let row = to_row(self)?;
        Self::AUTOHASH_FIELDS
            .iter()
            .map(|field| match row.get(*field) {
                Some(Value::String(text)) => Ok(text.clone()),
                Some(Value::Null) => Ok(String::new()),
                Some(other) => Ok(other.to_string()),
                None => Err(ModelError::Configuration(format!(
                    "AUTOHASH_FIELDS names unknown field {}.{}",
                    Self::TABLE,
                    field
                ))),
            })
            .collect()
    }

    fn generate_hash(&mut self) -> Result<(), ModelError> {
        self.generate_hash_at(now())
    }

    /// Generate using `instant` as the timestamp input
    fn generate_hash_at(&mut self, instant: DateTime<Utc>) -> Result<(), ModelError> {
        let mut values = self.autohash_values()?;
        if !Self::AUTOHASH_NO_DATETIME {
            values.push(hash_timestamp(&instant));
        }

        let token = match HashGenerator::generate(Self::TABLE, Self::AUTOHASH_SECRET, &values) {
            Ok(token) => token,
            Err(e) => {
                log_data_operation(
                    "generate_hash",
                    Self::TABLE,
                    Self::TABLE,
                    false,
                    Some(&e.to_string()),
                );
                return Err(e);
            }
        };

        self.set_hash_token(token);
        Ok(())
    }

    /// Populate an empty hash unless empty hashes are allowed.
    /// Returns true when a new token was generated.
    fn ensure_hash(&mut self) -> Result<bool, ModelError> {
        let empty = self.hash_token().map_or(true, str::is_empty);
        if Self::AUTOHASH_ALLOW_EMPTY || !empty {
            return Ok(false);
        }
        self.generate_hash()?;
        Ok(true)
    }

    /// Look a record up by its public token
    fn find_by_hash<S: Store>(store: &S, token: &str) -> Result<Option<Self>, ModelError> {
        first(store, &Filter::new().eq(HASH_FIELD, token))
    }
}

/// Register the unique hash column
pub fn declare_hash_column(schema: &mut SchemaBuilder) {
    schema.unique(HASH_FIELD);
}
