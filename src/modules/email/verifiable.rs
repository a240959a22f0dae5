use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::status::{default_verification_states, EmailStatus};
use crate::modules::choices::Enumeration;
use crate::modules::store::objects::{save_fields, update};
use crate::modules::store::{Filter, Model, ModelError, Row, SchemaBuilder, Store};
use crate::modules::utils::logging::log_data_operation;
use crate::modules::utils::time::now;

pub const ADDRESS_FIELD: &str = "address";
pub const STATUS_FIELD: &str = "status";
pub const DATE_VALIDATED_FIELD: &str = "date_validated";

/// Columns of an email record; flatten into the concrete type.
/// `address` is deliberately not unique.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct EmailFields {
    pub address: String,
    pub status: EmailStatus,
    pub date_created: DateTime<Utc>,
    /// When the current status was reached
    pub date_validated: Option<DateTime<Utc>>,
}

impl EmailFields {
    pub fn new(address: &str) -> Self {
        Self {
            address: address.to_string(),
            status: EmailStatus::UNVERIFIED,
            date_created: now(),
            date_validated: None,
        }
    }
}

/// Email address with a verification lifecycle.
///
/// At most one record per address should be VALID. `mark_as_valid` keeps
/// that true procedurally; there is no constraint behind it.
pub trait VerifiableEmail: Model {
    /// Effective `status` choices. Keep VALID, INVALID and UNVERIFIED
    /// at their default codes when extending.
    fn verification_states() -> Enumeration<i64> {
        default_verification_states()
    }

    fn email(&self) -> &EmailFields;
    fn email_mut(&mut self) -> &mut EmailFields;

    /// Call from `Model::declare_schema`
    fn declare_email_choices(schema: &mut SchemaBuilder) {
        schema.set_field_choices(STATUS_FIELD, Self::verification_states());
    }

    /// Mark this record VALID and demote every other UNVERIFIED record
    /// with the same address to INVALID. Returns the number demoted.
    ///
    /// The two writes are independent: if the demotion fails, this record
    /// stays VALID. Use `mark_as_valid_atomic` to tie them together. With
    /// `save` false this record is only changed in memory, which lets the
    /// caller persist it inside a larger unit of work.
    fn mark_as_valid<S: Store>(&mut self, store: &mut S, save: bool) -> Result<usize, ModelError> {
        self.mark_as_valid_at(store, now(), save)
    }

    fn mark_as_valid_at<S: Store>(
        &mut self,
        store: &mut S,
        instant: DateTime<Utc>,
        save: bool,
    ) -> Result<usize, ModelError> {
        let fields = self.email_mut();
        fields.status = EmailStatus::VALID;
        fields.date_validated = Some(instant);

        if save {
            save_fields(store, &*self, &[STATUS_FIELD, DATE_VALIDATED_FIELD])?;
        }

        let demoted = match self.invalidate_siblings(store) {
            Ok(count) => count,
            Err(e) => {
                log_data_operation(
                    "mark_as_valid",
                    &self.email().address,
                    Self::TABLE,
                    false,
                    Some(&e.to_string()),
                );
                return Err(e);
            }
        };

        log_data_operation(
            "mark_as_valid",
            &self.email().address,
            Self::TABLE,
            true,
            Some(&format!("{} sibling(s) invalidated", demoted)),
        );
        Ok(demoted)
    }

    /// Demote other UNVERIFIED copies of this address; settled records
    /// are left alone
    fn invalidate_siblings<S: Store>(&self, store: &mut S) -> Result<usize, ModelError> {
        let siblings = Filter::new()
            .eq(ADDRESS_FIELD, self.email().address.as_str())
            .eq(STATUS_FIELD, EmailStatus::UNVERIFIED)
            .exclude("id", self.id());

        let mut changes = Row::new();
        changes.insert(STATUS_FIELD.to_string(), Value::from(EmailStatus::INVALID));
        update::<Self, S>(store, &siblings, changes)
    }

    /// `mark_as_valid` with both writes in one transaction. On failure
    /// neither the store nor this record keeps the change.
    fn mark_as_valid_atomic<S: Store>(&mut self, store: &mut S) -> Result<usize, ModelError> {
        let before = self.email().clone();
        let result = store.atomic(|store| self.mark_as_valid(store, true));
        if result.is_err() {
            *self.email_mut() = before;
        }
        result
    }

    fn is_valid(&self) -> bool {
        self.email().status == EmailStatus::VALID
    }
}
