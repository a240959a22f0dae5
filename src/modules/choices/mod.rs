pub mod countries;
pub mod enumeration;

pub use countries::ISO_COUNTRIES;
pub use enumeration::{Choice, Enumeration};
