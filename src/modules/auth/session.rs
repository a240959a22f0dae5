use std::any::Any;
use std::collections::HashMap;

use rand::distributions::Alphanumeric;
use rand::Rng;
use serde::{Deserialize, Serialize};
use serde_json::Value;

const SESSION_KEY_LENGTH: usize = 32;

/// Per-client key-value bag owned by the surrounding framework
pub trait Session {
    fn get(&self, key: &str) -> Option<&Value>;
    fn set(&mut self, key: &str, value: Value);
    fn remove(&mut self, key: &str) -> Option<Value>;

    fn contains(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    /// Drop every value and issue a new session key
    fn flush(&mut self);

    /// Issue a new session key, keeping the stored values
    fn cycle_key(&mut self);

    fn session_key(&self) -> &str;
}

/// Session kept in process memory
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct MemorySession {
    key: String,
    data: HashMap<String, Value>,
}

impl MemorySession {
    pub fn new() -> Self {
        Self {
            key: new_session_key(),
            data: HashMap::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}

impl Default for MemorySession {
    fn default() -> Self {
        Self::new()
    }
}

impl Session for MemorySession {
    fn get(&self, key: &str) -> Option<&Value> {
        self.data.get(key)
    }

    fn set(&mut self, key: &str, value: Value) {
        self.data.insert(key.to_string(), value);
    }

    fn remove(&mut self, key: &str) -> Option<Value> {
        self.data.remove(key)
    }

    fn flush(&mut self) {
        self.data.clear();
        self.key = new_session_key();
    }

    fn cycle_key(&mut self) {
        self.key = new_session_key();
    }

    fn session_key(&self) -> &str {
        &self.key
    }
}

fn new_session_key() -> String {
    rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(SESSION_KEY_LENGTH)
        .map(char::from)
        .collect()
}

/// Typed slots that live for a single request.
///
/// A slot holding `None` means "looked up, nothing found", which is not the
/// same as an absent slot.
#[derive(Default)]
pub struct RequestCache {
    slots: HashMap<String, Box<dyn Any>>,
}

impl RequestCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn has(&self, key: &str) -> bool {
        self.slots.contains_key(key)
    }

    /// Slot contents, if present and of type `T`
    pub fn get<T: 'static>(&self, key: &str) -> Option<&T> {
        self.slots.get(key).and_then(|slot| slot.downcast_ref::<T>())
    }

    pub fn set<T: 'static>(&mut self, key: &str, value: T) {
        self.slots.insert(key.to_string(), Box::new(value));
    }

    pub fn remove(&mut self, key: &str) -> bool {
        self.slots.remove(key).is_some()
    }
}

/// Everything login helpers need from the current request
pub struct RequestContext<'s> {
    pub session: &'s mut dyn Session,
    pub cache: RequestCache,
}

impl<'s> RequestContext<'s> {
    pub fn new(session: &'s mut dyn Session) -> Self {
        Self {
            session,
            cache: RequestCache::new(),
        }
    }
}
