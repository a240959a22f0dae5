use serde::{Deserialize, Serialize};

use super::user::AppUser;
use crate::modules::choices::Enumeration;
use crate::modules::store::objects::{filter, get};
use crate::modules::store::{Filter, Model, ModelError, RecordId, SchemaBuilder, Store};
use crate::modules::utils::logging::log_auth_event;

pub const CREDENTIAL_TYPE_FIELD: &str = "credential_type";

/// Columns shared by every credential record; flatten into the concrete type
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
pub struct CredentialFields {
    /// Identifier, e.g. a username or an external account id
    pub data1: Option<String>,
    /// Secret or token, e.g. a password hash
    pub data2: Option<String>,
    pub credential_type: i64,
}

impl CredentialFields {
    pub fn new(credential_type: i64, data1: &str) -> Self {
        Self {
            data1: Some(data1.to_string()),
            data2: None,
            credential_type,
        }
    }
}

/// One way of proving a user's identity.
///
/// Each record checks supplied proof against itself; it never looks at
/// other credentials of the same user.
pub trait Credential: Model {
    type User: AppUser;

    /// Column referencing the owning user
    const USER_FIELD: &'static str = "user_id";

    /// Closed set of credential kinds this type accepts
    fn credential_types() -> Enumeration<i64>;

    fn fields(&self) -> &CredentialFields;
    fn fields_mut(&mut self) -> &mut CredentialFields;
    fn user_id(&self) -> Option<RecordId>;

    /// True when `proof` establishes that `user` owns this credential
    fn authenticate<S: Store>(
        &mut self,
        store: &mut S,
        user: &Self::User,
        proof: &[&str],
    ) -> Result<bool, ModelError>;

    /// Call from `Model::declare_schema`
    fn declare_credential_choices(schema: &mut SchemaBuilder) {
        schema.set_field_choices(CREDENTIAL_TYPE_FIELD, Self::credential_types());
    }

    fn for_user<S: Store>(store: &S, user: &Self::User) -> Result<Vec<Self>, ModelError> {
        let id = user.id().ok_or(ModelError::NotPersisted {
            table: <Self::User as Model>::TABLE,
        })?;
        filter(store, &Filter::new().eq(Self::USER_FIELD, id))
    }
}

/// Find the user owning a credential of `credential_type` whose identifier
/// is `identifier` and which accepts `proof`.
///
/// A type outside `C::credential_types()` is a programming error and comes
/// back as `InvalidChoice`; a failed match is `Ok(None)`.
pub fn authenticate_with_credentials<C: Credential, S: Store>(
    store: &mut S,
    credential_type: i64,
    identifier: &str,
    proof: &[&str],
) -> Result<Option<C::User>, ModelError> {
    if !C::credential_types().contains(&credential_type) {
        return Err(ModelError::InvalidChoice {
            field: CREDENTIAL_TYPE_FIELD.to_string(),
            value: credential_type.to_string(),
        });
    }

    let candidates: Vec<C> = filter(
        &*store,
        &Filter::new()
            .eq(CREDENTIAL_TYPE_FIELD, credential_type)
            .eq("data1", identifier),
    )?;

    for mut credential in candidates {
        let user_id = match credential.user_id() {
            Some(id) => id,
            None => continue,
        };
        let user: Option<C::User> = get(&*store, user_id)?;
        if let Some(user) = user {
            if credential.authenticate(store, &user, proof)? {
                log_auth_event("authenticate", identifier, true, Some(C::TABLE));
                return Ok(Some(user));
            }
        }
    }

    log_auth_event("authenticate", identifier, false, Some(C::TABLE));
    Ok(None)
}
