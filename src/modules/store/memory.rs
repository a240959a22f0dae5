use std::collections::{BTreeMap, HashMap};
use std::fs::File;
use std::io::{self, Read, Write};
use std::path::Path;

use log::debug;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::{Filter, ModelSchema, RecordId, Row, Store, StoreError};
use crate::modules::utils::logging::log_data_operation;

/// Rows of one table, keyed by primary key
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
struct Table {
    rows: BTreeMap<RecordId, Row>,
    next_id: RecordId,
}

impl Table {
    fn allocate_id(&mut self) -> RecordId {
        self.next_id += 1;
        self.next_id
    }

    /// Check a candidate row against every other row for each unique column
    fn check_unique(
        &self,
        schema: &ModelSchema,
        candidate: &Row,
        skip: Option<RecordId>,
    ) -> Result<(), StoreError> {
        for field in schema.unique_fields() {
            let value = match candidate.get(*field) {
                None | Some(Value::Null) => continue, // NULLs never collide
                Some(value) => value,
            };

            let clash = self
                .rows
                .iter()
                .any(|(id, row)| Some(*id) != skip && row.get(*field) == Some(value));

            if clash {
                return Err(StoreError::UniquenessViolation {
                    table: schema.table().to_string(),
                    field: field.to_string(),
                    value: value.to_string(),
                });
            }
        }
        Ok(())
    }
}

/// Frozen copy of a `MemoryStore`, used to roll back `atomic` blocks
#[derive(Debug, Clone)]
pub struct MemorySnapshot {
    tables: HashMap<String, Table>,
}

/// In-process storage backend with unique-column enforcement
#[derive(Serialize, Deserialize, Debug, Clone, Default)]
pub struct MemoryStore {
    tables: HashMap<String, Table>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of rows currently held for `table`
    pub fn count(&self, table: &str) -> usize {
        self.tables.get(table).map_or(0, |t| t.rows.len())
    }

    pub fn snapshot(&self) -> MemorySnapshot {
        MemorySnapshot {
            tables: self.tables.clone(),
        }
    }

    pub fn restore(&mut self, snapshot: MemorySnapshot) {
        self.tables = snapshot.tables;
    }

    /// Write every table to `path` as JSON
    pub fn save_to_file(&self, path: &Path) -> Result<(), StoreError> {
        let data = serde_json::to_string_pretty(self)
            .map_err(|e| StoreError::Corrupt(e.to_string()))?;

        File::create(path)?.write_all(data.as_bytes())?;

        log_data_operation(
            "store_snapshot_save",
            "memory_store",
            &path.display().to_string(),
            true,
            None,
        );
        Ok(())
    }

    /// Load a snapshot written by `save_to_file`; a missing file yields an empty store
    pub fn load_from_file(path: &Path) -> Result<Self, StoreError> {
        let mut file = match File::open(path) {
            Ok(file) => file,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Self::new()),
            Err(e) => return Err(e.into()),
        };

        let mut data = String::new();
        file.read_to_string(&mut data)?;

        serde_json::from_str(&data).map_err(|e| {
            log_data_operation(
                "store_snapshot_load",
                "memory_store",
                &path.display().to_string(),
                false,
                Some(&e.to_string()),
            );
            StoreError::Corrupt(e.to_string())
        })
    }

    fn table_mut(&mut self, table: &str) -> &mut Table {
        self.tables.entry(table.to_string()).or_default()
    }
}

impl Store for MemoryStore {
    fn insert(&mut self, schema: &ModelSchema, mut row: Row) -> Result<RecordId, StoreError> {
        let table = self.table_mut(schema.table());
        table.check_unique(schema, &row, None)?;

        let id = table.allocate_id();
        row.insert("id".to_string(), Value::from(id));
        table.rows.insert(id, row);

        debug!("Inserted {} #{}", schema.table(), id);
        Ok(id)
    }

    fn update(
        &mut self,
        schema: &ModelSchema,
        id: RecordId,
        changes: Row,
    ) -> Result<(), StoreError> {
        let table = self.table_mut(schema.table());

        let mut merged = match table.rows.get(&id) {
            Some(row) => row.clone(),
            None => {
                return Err(StoreError::NotFound {
                    table: schema.table().to_string(),
                    id,
                })
            }
        };
        for (field, value) in changes {
            if field != "id" {
                merged.insert(field, value);
            }
        }

        table.check_unique(schema, &merged, Some(id))?;
        table.rows.insert(id, merged);

        debug!("Updated {} #{}", schema.table(), id);
        Ok(())
    }

    fn select(&self, table: &str, filter: &Filter) -> Result<Vec<Row>, StoreError> {
        let mut rows: Vec<Row> = match self.tables.get(table) {
            Some(t) => t
                .rows
                .values()
                .filter(|row| filter.matches(row))
                .cloned()
                .collect(),
            None => Vec::new(),
        };
        filter.sort(&mut rows);
        Ok(rows)
    }

    fn update_where(
        &mut self,
        schema: &ModelSchema,
        filter: &Filter,
        changes: Row,
    ) -> Result<usize, StoreError> {
        let table = self.table_mut(schema.table());

        // Stage the update on a copy so a unique clash leaves the table untouched
        let mut staged = table.clone();
        let mut touched = Vec::new();
        for (id, row) in staged.rows.iter_mut() {
            if filter.matches(row) {
                for (field, value) in &changes {
                    if field != "id" {
                        row.insert(field.clone(), value.clone());
                    }
                }
                touched.push(*id);
            }
        }

        for id in &touched {
            if let Some(row) = staged.rows.get(id) {
                staged.check_unique(schema, row, Some(*id))?;
            }
        }

        *table = staged;
        debug!("Bulk updated {} rows in {}", touched.len(), schema.table());
        Ok(touched.len())
    }

    fn delete(&mut self, table: &str, id: RecordId) -> Result<bool, StoreError> {
        Ok(self
            .tables
            .get_mut(table)
            .map_or(false, |t| t.rows.remove(&id).is_some()))
    }

    fn atomic<T, E, F>(&mut self, work: F) -> Result<T, E>
    where
        Self: Sized,
        F: FnOnce(&mut Self) -> Result<T, E>,
    {
        let snapshot = self.snapshot();
        let result = work(self);
        if result.is_err() {
            self.restore(snapshot);
            debug!("Rolled back atomic block");
        }
        result
    }
}
