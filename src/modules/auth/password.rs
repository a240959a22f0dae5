use base64::{engine::general_purpose::STANDARD as base64, Engine as _};
use lazy_static::lazy_static;
use pbkdf2::pbkdf2;
use rand::distributions::Alphanumeric;
use rand::Rng;
use sha2::{Digest, Sha256};
use std::sync::RwLock;

use crate::modules::config::Settings;
use crate::modules::store::objects::save_fields;
use crate::modules::store::{Model, ModelError, Store};
use crate::modules::utils::logging::log_auth_event;
use crate::{HmacSha256, DEFAULT_PASSWORD_ITERATIONS};

/// Stored hashes starting with this marker never verify
pub const UNUSABLE_PASSWORD_PREFIX: &str = "!";

const PBKDF2_ALGORITHM: &str = "pbkdf2_sha256";
const LEGACY_SHA256_ALGORITHM: &str = "sha256";
const SALT_LENGTH: usize = 22;

/// Outcome of verifying a raw password against a stored hash
#[derive(Debug, Clone, PartialEq)]
pub struct PasswordCheck {
    pub matched: bool,
    /// Replacement hash when the stored one uses outdated parameters
    pub upgraded: Option<String>,
}

impl PasswordCheck {
    fn rejected() -> Self {
        Self {
            matched: false,
            upgraded: None,
        }
    }
}

/// One-way password hashing collaborator
pub trait PasswordHasher: Send + Sync {
    fn hash(&self, raw: &str) -> String;
    fn verify(&self, raw: &str, encoded: &str) -> PasswordCheck;

    fn is_usable(&self, encoded: Option<&str>) -> bool {
        match encoded {
            Some(encoded) => !encoded.is_empty() && !encoded.starts_with(UNUSABLE_PASSWORD_PREFIX),
            None => false,
        }
    }

    /// A value that can never be produced by `hash`
    fn unusable(&self) -> String {
        format!("{}{}", UNUSABLE_PASSWORD_PREFIX, random_string(40))
    }
}

/// PBKDF2-HMAC-SHA256 hasher producing `pbkdf2_sha256$<iterations>$<salt>$<b64>`.
///
/// Hashes made with a different iteration count, and legacy
/// `sha256$<salt>$<hex>` hashes, verify but come back flagged for upgrade.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Pbkdf2Hasher {
    iterations: u32,
}

impl Pbkdf2Hasher {
    pub const fn new(iterations: u32) -> Self {
        Self { iterations }
    }

    pub fn from_settings(settings: &Settings) -> Self {
        Self::new(settings.password_iterations)
    }

    pub fn iterations(&self) -> u32 {
        self.iterations
    }

    /// Hash with explicit parameters
    pub fn encode(&self, raw: &str, salt: &str, iterations: u32) -> String {
        let digest = derive(raw, salt, iterations);
        format!(
            "{}${}${}${}",
            PBKDF2_ALGORITHM,
            iterations,
            salt,
            base64.encode(digest)
        )
    }
}

impl Default for Pbkdf2Hasher {
    fn default() -> Self {
        Self::new(DEFAULT_PASSWORD_ITERATIONS)
    }
}

impl PasswordHasher for Pbkdf2Hasher {
    fn hash(&self, raw: &str) -> String {
        self.encode(raw, &random_string(SALT_LENGTH), self.iterations)
    }

    fn verify(&self, raw: &str, encoded: &str) -> PasswordCheck {
        if !self.is_usable(Some(encoded)) {
            return PasswordCheck::rejected();
        }

        let parts: Vec<&str> = encoded.split('$').collect();
        let matched = match parts.as_slice() {
            [PBKDF2_ALGORITHM, iterations, salt, stored] => match iterations.parse::<u32>() {
                Ok(iterations) if iterations > 0 => {
                    let matched = base64
                        .decode(stored)
                        .map(|stored| constant_time_eq(&derive(raw, salt, iterations), &stored))
                        .unwrap_or(false);
                    return PasswordCheck {
                        matched,
                        upgraded: (matched && iterations != self.iterations)
                            .then(|| self.hash(raw)),
                    };
                }
                _ => false,
            },
            [LEGACY_SHA256_ALGORITHM, salt, stored] => {
                let digest = Sha256::digest(format!("{}{}", salt, raw).as_bytes());
                hex::decode(stored)
                    .map(|stored| constant_time_eq(&digest, &stored))
                    .unwrap_or(false)
            }
            _ => false,
        };

        // Anything that verifies outside the current scheme gets rehashed
        PasswordCheck {
            matched,
            upgraded: matched.then(|| self.hash(raw)),
        }
    }
}

lazy_static! {
    static ref CONFIGURED_HASHER: RwLock<Pbkdf2Hasher> = RwLock::new(Pbkdf2Hasher::default());
}

/// Make `settings.password_iterations` the process-wide cost used by
/// `DEFAULT_HASHER`. Call once at startup, next to `initialize_logging`.
pub fn configure_password_hasher(settings: &Settings) {
    let hasher = Pbkdf2Hasher::from_settings(settings);
    match CONFIGURED_HASHER.write() {
        Ok(mut slot) => *slot = hasher,
        Err(poisoned) => *poisoned.into_inner() = hasher,
    }
}

/// The hasher installed by `configure_password_hasher`, or the default
pub fn configured_hasher() -> Pbkdf2Hasher {
    match CONFIGURED_HASHER.read() {
        Ok(slot) => *slot,
        Err(poisoned) => *poisoned.into_inner(),
    }
}

/// Delegates to whatever `configure_password_hasher` installed
#[derive(Debug, Clone, Copy, Default)]
pub struct ConfiguredHasher;

impl PasswordHasher for ConfiguredHasher {
    fn hash(&self, raw: &str) -> String {
        configured_hasher().hash(raw)
    }

    fn verify(&self, raw: &str, encoded: &str) -> PasswordCheck {
        configured_hasher().verify(raw, encoded)
    }
}

/// Hasher used by `PasswordHolder` unless a type overrides `password_hasher`
pub static DEFAULT_HASHER: ConfiguredHasher = ConfiguredHasher;

fn derive(raw: &str, salt: &str, iterations: u32) -> Vec<u8> {
    let mut key = vec![0u8; 32];
    pbkdf2::<HmacSha256>(raw.as_bytes(), salt.as_bytes(), iterations, &mut key);
    key
}

fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    a.len() == b.len() && a.iter().zip(b).fold(0u8, |acc, (x, y)| acc | (x ^ y)) == 0
}

fn random_string(length: usize) -> String {
    rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(length)
        .map(char::from)
        .collect()
}

/// Entities storing a local one-way password hash.
///
/// `check_password` may write to the store: a successful check against an
/// outdated hash replaces it and persists `PASSWORD_FIELD`. `set_password`
/// never persists; save the record afterwards.
pub trait PasswordHolder: Model {
    /// Column holding the hash; credentials use "data2"
    const PASSWORD_FIELD: &'static str = "password";

    fn password_hash(&self) -> Option<&str>;
    fn store_password_hash(&mut self, encoded: Option<String>);

    fn password_hasher() -> &'static dyn PasswordHasher {
        &DEFAULT_HASHER
    }

    fn set_password(&mut self, raw: &str) {
        let encoded = Self::password_hasher().hash(raw);
        self.store_password_hash(Some(encoded));
    }

    fn check_password<S: Store>(&mut self, store: &mut S, raw: &str) -> Result<bool, ModelError> {
        let check = match self.password_hash() {
            Some(encoded) => Self::password_hasher().verify(raw, encoded),
            None => return Ok(false),
        };

        if let (true, Some(upgraded)) = (check.matched, check.upgraded) {
            self.store_password_hash(Some(upgraded));
            // Unsaved records keep the upgrade in memory only
            if self.id().is_some() {
                save_fields(store, &*self, &[Self::PASSWORD_FIELD])?;
            }
            log_auth_event(
                "password_upgrade",
                Self::TABLE,
                true,
                Some("Stored hash replaced with current parameters"),
            );
        }

        Ok(check.matched)
    }

    fn set_unusable_password(&mut self) {
        let encoded = Self::password_hasher().unusable();
        self.store_password_hash(Some(encoded));
    }

    fn has_usable_password(&self) -> bool {
        Self::password_hasher().is_usable(self.password_hash())
    }

    /// Build a hash up front, e.g. while constructing a record
    fn make_password(raw: &str) -> String {
        Self::password_hasher().hash(raw)
    }
}
