// First, declare the modules folder itself
mod modules;

// Re-export everything from modules for easier access
pub use modules::{auth, choices, config, contact, email, hashing, lifecycle, store, utils};

// Re-export commonly used types
pub use modules::auth::{
    AppUser, Credential, Login, MemorySession, PasswordHolder, RequestContext, Session,
    SimpleAppUser,
};
pub use modules::config::Settings;
pub use modules::email::{EmailStatus, VerifiableEmail};
pub use modules::hashing::{AutoHash, HashGenerator};
pub use modules::lifecycle::SoftDelete;
pub use modules::store::{MemoryStore, Model, ModelError, Store, StoreError};

// Constants
pub const HASH_LENGTH: usize = 43;
pub const DEFAULT_PASSWORD_ITERATIONS: u32 = 320_000;
pub const SETTINGS_FILE: &str = "modelkit.json";

// Type aliases
pub type HmacSha256 = hmac::Hmac<sha2::Sha256>;
