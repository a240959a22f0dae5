pub mod autohash;
pub mod generator;

pub use autohash::{declare_hash_column, AutoHash, HASH_FIELD};
pub use generator::HashGenerator;
