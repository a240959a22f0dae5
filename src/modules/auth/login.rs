use serde_json::Value;

use super::session::RequestContext;
use crate::modules::store::objects::first;
use crate::modules::store::{Filter, Model, ModelError, Store};
use crate::modules::utils::logging::log_auth_event;

pub const DEFAULT_LOGIN_ID_KEY: &str = "app_user_id";
pub const DEFAULT_LOGIN_REQUEST_KEY: &str = "app_user";

/// Ties a record to a browser session.
///
/// Only the association is handled here: deciding who may log in is the
/// job of `SimpleAppUser::authenticate` or `AppUser::authenticate`.
/// Override the two keys to let several user kinds share one session.
pub trait Login: Model {
    /// Session key holding the logged-in record's primary key
    const LOGIN_ID_KEY: &'static str = DEFAULT_LOGIN_ID_KEY;

    /// Request cache slot holding the resolved record
    const LOGIN_REQUEST_KEY: &'static str = DEFAULT_LOGIN_REQUEST_KEY;

    /// Associate this record with the session. The session key is always
    /// rotated first.
    fn login(&self, request: &mut RequestContext<'_>) -> Result<(), ModelError> {
        let id = self
            .id()
            .ok_or(ModelError::NotPersisted { table: Self::TABLE })?;

        request.session.cycle_key();
        request.session.set(Self::LOGIN_ID_KEY, Value::from(id));
        request
            .cache
            .set::<Option<Self>>(Self::LOGIN_REQUEST_KEY, Some(self.clone()));

        log_auth_event("login", &format!("{}#{}", Self::TABLE, id), true, None);
        Ok(())
    }

    /// Reset the whole session, not just the login key
    fn logout(request: &mut RequestContext<'_>) {
        let subject = Self::get_login_user_id(request)
            .map(|id| format!("{}#{}", Self::TABLE, id))
            .unwrap_or_else(|| Self::TABLE.to_string());

        request.cache.set::<Option<Self>>(Self::LOGIN_REQUEST_KEY, None);
        request.session.flush();

        log_auth_event("logout", &subject, true, None);
    }

    /// Checks the session only; never reads the store
    fn is_logged_in(request: &RequestContext<'_>) -> bool {
        request.session.contains(Self::LOGIN_ID_KEY)
            && Self::get_login_user_id(request).map_or(false, |id| !id.is_null())
    }

    /// Raw session value, unvalidated
    fn get_login_user_id(request: &RequestContext<'_>) -> Option<Value> {
        request.session.get(Self::LOGIN_ID_KEY).cloned()
    }

    /// Filter used to fetch the logged-in record. Override to add rules
    /// such as excluding deactivated accounts.
    fn get_login_user_queryset(request: &RequestContext<'_>) -> Filter {
        Filter::new().eq(
            "id",
            Self::get_login_user_id(request).unwrap_or(Value::Null),
        )
    }

    /// Resolve the logged-in record, hitting the store at most once per
    /// request. "Nobody" is cached too.
    fn get_current_user<S: Store>(
        request: &mut RequestContext<'_>,
        store: &S,
    ) -> Result<Option<Self>, ModelError> {
        if let Some(cached) = request.cache.get::<Option<Self>>(Self::LOGIN_REQUEST_KEY) {
            return Ok(cached.clone());
        }

        // Pessimistic default in case the lookup below fails
        request.cache.set::<Option<Self>>(Self::LOGIN_REQUEST_KEY, None);
        if !Self::is_logged_in(request) {
            return Ok(None);
        }

        let user: Option<Self> = first(store, &Self::get_login_user_queryset(request))?;
        request
            .cache
            .set::<Option<Self>>(Self::LOGIN_REQUEST_KEY, user.clone());
        Ok(user)
    }
}
