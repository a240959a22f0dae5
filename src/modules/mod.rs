// Declare all modules
pub mod auth;
pub mod choices;
pub mod config;
pub mod contact;
pub mod email;
pub mod hashing;
pub mod lifecycle;
pub mod store;
pub mod utils;

#[cfg(test)]
pub(crate) mod fixtures;

// No re-exports here as they're handled in lib.rs
