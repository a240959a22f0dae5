pub mod credential;
pub mod login;
pub mod password;
pub mod session;
pub mod user;

pub use credential::{authenticate_with_credentials, Credential, CredentialFields};
pub use login::{Login, DEFAULT_LOGIN_ID_KEY, DEFAULT_LOGIN_REQUEST_KEY};
pub use password::{
    configure_password_hasher, configured_hasher, ConfiguredHasher, PasswordCheck,
    PasswordHasher, PasswordHolder, Pbkdf2Hasher, DEFAULT_HASHER, UNUSABLE_PASSWORD_PREFIX,
};
pub use session::{MemorySession, RequestCache, RequestContext, Session};
pub use user::{AppUser, SimpleAppUser};
