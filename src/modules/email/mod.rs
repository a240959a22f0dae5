pub mod multiple;
pub mod status;
pub mod verifiable;

pub use multiple::MultipleEmail;
pub use status::{default_verification_states, EmailStatus};
pub use verifiable::{EmailFields, VerifiableEmail};
