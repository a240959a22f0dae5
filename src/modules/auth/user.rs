use super::login::Login;
use super::password::PasswordHolder;
use crate::modules::hashing::AutoHash;
use crate::modules::store::objects::first;
use crate::modules::store::{Filter, ModelError, Store};
use crate::modules::utils::logging::log_auth_event;

/// A user record that carries its own username and password.
///
/// Use this or `AppUser`, never both on one type.
pub trait SimpleAppUser: AutoHash + Login + PasswordHolder {
    const USERNAME_FIELD: &'static str = "username";

    /// Verification step used by `authenticate`; swap it to check a
    /// password some other way
    fn verify_login_password<S: Store>(
        &mut self,
        store: &mut S,
        password: &str,
    ) -> Result<bool, ModelError> {
        self.check_password(store, password)
    }

    /// Matching record, or `None` when the username is unknown or the
    /// password is wrong. Callers cannot tell the two apart.
    fn authenticate<S: Store>(
        store: &mut S,
        username: &str,
        password: &str,
    ) -> Result<Option<Self>, ModelError> {
        let candidate: Option<Self> =
            first(&*store, &Filter::new().eq(Self::USERNAME_FIELD, username))?;

        let user = match candidate {
            Some(mut user) => {
                if user.verify_login_password(store, password)? {
                    Some(user)
                } else {
                    None
                }
            }
            None => {
                // Spend the same hashing work as a real check
                let _ = Self::make_password(password);
                None
            }
        };

        log_auth_event("authenticate", username, user.is_some(), None);
        Ok(user)
    }
}

/// A user whose proofs of identity live in separate credential records.
/// Implementations usually forward to `authenticate_with_credentials`.
pub trait AppUser: AutoHash + Login {
    fn authenticate<S: Store>(
        store: &mut S,
        credential_type: i64,
        proof: &[&str],
    ) -> Result<Option<Self>, ModelError>;
}
