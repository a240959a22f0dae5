pub mod error;
pub mod filter;
pub mod memory;
pub mod objects;
pub mod schema;

pub use error::{ModelError, StoreError};
pub use filter::Filter;
pub use memory::{MemorySnapshot, MemoryStore};
pub use objects::Model;
pub use schema::{schema_for, ChoiceSet, ModelSchema, SchemaBuilder};

/// Primary key assigned by the store on first insert
pub type RecordId = u64;

/// A persisted record as a JSON object keyed by column name
pub type Row = serde_json::Map<String, serde_json::Value>;

/// Persistence collaborator.
///
/// Implementations must enforce the schema's unique columns on every write
/// and report clashes as `StoreError::UniquenessViolation`; callers decide
/// whether to retry.
pub trait Store {
    /// Insert a new row and return its primary key
    fn insert(&mut self, schema: &ModelSchema, row: Row) -> Result<RecordId, StoreError>;

    /// Overwrite only the columns present in `changes`
    fn update(
        &mut self,
        schema: &ModelSchema,
        id: RecordId,
        changes: Row,
    ) -> Result<(), StoreError>;

    fn select(&self, table: &str, filter: &Filter) -> Result<Vec<Row>, StoreError>;

    /// Apply `changes` to every row matching `filter`; returns the match count
    fn update_where(
        &mut self,
        schema: &ModelSchema,
        filter: &Filter,
        changes: Row,
    ) -> Result<usize, StoreError>;

    fn delete(&mut self, table: &str, id: RecordId) -> Result<bool, StoreError>;

    /// Run `work` so that either all of its writes land or none do
    fn atomic<T, E, F>(&mut self, work: F) -> Result<T, E>
    where
        Self: Sized,
        F: FnOnce(&mut Self) -> Result<T, E>;
}
