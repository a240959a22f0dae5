use chrono::{DateTime, Utc};

use crate::modules::store::objects::save_fields;
use crate::modules::store::{Filter, Model, ModelError, Store};
use crate::modules::utils::logging::log_data_operation;
use crate::modules::utils::time::now;

pub const DATE_DELETED_FIELD: &str = "date_deleted";

/// Records removed by stamping `date_deleted` instead of erasing the row.
///
/// Only single-record deletes are intercepted. Calling `Store::delete`
/// directly, or any cascade in the backend, still removes rows; revoke
/// delete rights at the storage level if that matters.
pub trait SoftDelete: Model {
    fn date_deleted(&self) -> Option<DateTime<Utc>>;
    fn set_date_deleted(&mut self, instant: Option<DateTime<Utc>>);

    fn is_deleted(&self) -> bool {
        self.date_deleted().is_some()
    }

    /// Always fails; use `soft_delete`
    fn delete<S: Store>(&self, _store: &mut S) -> Result<(), ModelError> {
        Self::deny_hard_delete()
    }

    /// Stamp the record as deleted and persist only that column
    fn soft_delete<S: Store>(&mut self, store: &mut S) -> Result<(), ModelError> {
        let previous = self.date_deleted();
        self.set_date_deleted(Some(now()));
        let result = save_fields(store, &*self, &[DATE_DELETED_FIELD]);
        if result.is_err() {
            self.set_date_deleted(previous);
        }

        let subject = self
            .id()
            .map(|id| id.to_string())
            .unwrap_or_else(|| "unsaved".to_string());
        log_data_operation(
            "soft_delete",
            &subject,
            Self::TABLE,
            result.is_ok(),
            result.as_ref().err().map(|e| e.to_string()).as_deref(),
        );
        result
    }

    /// Use as the body of `Model::pre_delete` so the generic delete path
    /// refuses too
    fn deny_hard_delete() -> Result<(), ModelError> {
        Err(ModelError::DeleteNotSupported { table: Self::TABLE })
    }

    /// Filter matching rows that are not soft-deleted
    fn live_filter() -> Filter {
        Filter::new().eq(DATE_DELETED_FIELD, serde_json::Value::Null)
    }
}
