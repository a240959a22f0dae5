use std::sync::Arc;

use log::debug;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;

use super::schema::{schema_for, ChoiceSet, ModelSchema, SchemaBuilder};
use super::{Filter, ModelError, RecordId, Row, Store};

/// A persistable entity type.
///
/// Behaviour traits (`AutoHash`, `SoftDelete`, ...) are composed on top of
/// this one; concrete types wire them in through the `pre_save` and
/// `pre_delete` hooks and through `declare_schema`.
pub trait Model: Serialize + DeserializeOwned + Clone + 'static {
    /// Table name, also used as the entity type discriminator
    const TABLE: &'static str;

    fn id(&self) -> Option<RecordId>;
    fn set_id(&mut self, id: RecordId);

    /// Register unique columns and effective field choices for this type
    fn declare_schema(_schema: &mut SchemaBuilder) {}

    /// Runs before every full save
    fn pre_save(&mut self) -> Result<(), ModelError> {
        Ok(())
    }

    /// Runs before a hard delete; returning an error vetoes it
    fn pre_delete(&self) -> Result<(), ModelError> {
        Ok(())
    }

    fn schema() -> Arc<ModelSchema> {
        schema_for::<Self>()
    }

    /// Effective choices of `field` for this entity's concrete type
    fn field_choices(&self, field: &str) -> Option<ChoiceSet> {
        Self::schema().field_choices(field).cloned()
    }
}

/// Serialize a model into a row, leaving the primary key to the store
pub fn to_row<M: Model>(model: &M) -> Result<Row, ModelError> {
    match serde_json::to_value(model)? {
        Value::Object(mut row) => {
            row.remove("id");
            Ok(row)
        }
        other => Err(ModelError::Serialization(format!(
            "{} did not serialize to an object: {}",
            M::TABLE,
            other
        ))),
    }
}

pub fn from_row<M: Model>(row: Row) -> Result<M, ModelError> {
    Ok(serde_json::from_value(Value::Object(row))?)
}

/// Insert a new record or overwrite an existing one.
///
/// A unique-column clash comes back as a uniqueness violation and is never
/// retried here.
pub fn save<M: Model, S: Store>(store: &mut S, model: &mut M) -> Result<(), ModelError> {
    model.pre_save()?;

    let schema = M::schema();
    let row = to_row(model)?;
    schema.validate_row(&row)?;

    match model.id() {
        Some(id) => store.update(&schema, id, row)?,
        None => {
            let id = store.insert(&schema, row)?;
            model.set_id(id);
        }
    }
    Ok(())
}

/// Persist only the named fields of an already saved record
pub fn save_fields<M: Model, S: Store>(
    store: &mut S,
    model: &M,
    fields: &[&str],
) -> Result<(), ModelError> {
    let id = model
        .id()
        .ok_or(ModelError::NotPersisted { table: M::TABLE })?;

    let row = to_row(model)?;
    let mut changes = Row::new();
    for field in fields {
        let value = row.get(*field).cloned().ok_or_else(|| {
            ModelError::Serialization(format!("{} has no field {}", M::TABLE, field))
        })?;
        changes.insert(field.to_string(), value);
    }

    let schema = M::schema();
    schema.validate_row(&changes)?;
    store.update(&schema, id, changes)?;

    debug!("Saved fields {:?} of {} #{}", fields, M::TABLE, id);
    Ok(())
}

pub fn get<M: Model, S: Store>(store: &S, id: RecordId) -> Result<Option<M>, ModelError> {
    first(store, &Filter::new().eq("id", id))
}

pub fn filter<M: Model, S: Store>(store: &S, filter: &Filter) -> Result<Vec<M>, ModelError> {
    store
        .select(M::TABLE, filter)?
        .into_iter()
        .map(from_row)
        .collect()
}

pub fn first<M: Model, S: Store>(store: &S, filter: &Filter) -> Result<Option<M>, ModelError> {
    match store.select(M::TABLE, filter)?.into_iter().next() {
        Some(row) => Ok(Some(from_row(row)?)),
        None => Ok(None),
    }
}

/// Scoped bulk update; returns the number of rows changed
pub fn update<M: Model, S: Store>(
    store: &mut S,
    filter: &Filter,
    changes: Row,
) -> Result<usize, ModelError> {
    let schema = M::schema();
    schema.validate_row(&changes)?;
    Ok(store.update_where(&schema, filter, changes)?)
}

/// Physically remove a record, subject to the type's `pre_delete` veto
pub fn delete<M: Model, S: Store>(store: &mut S, model: &M) -> Result<bool, ModelError> {
    model.pre_delete()?;
    let id = model
        .id()
        .ok_or(ModelError::NotPersisted { table: M::TABLE })?;
    Ok(store.delete(M::TABLE, id)?)
}
