pub mod info;
pub mod phone;
pub mod ranking;
pub mod website;

pub use info::{default_address_types, ContactFields, ContactInfo, DEFAULT_COUNTRY};
pub use phone::{default_number_types, PhoneFields, PhoneNumber};
pub use ranking::{best, best_stored, Ranked, DISPLAY_ORDER_FIELD};
pub use website::{WebSite, WebSiteFields};
