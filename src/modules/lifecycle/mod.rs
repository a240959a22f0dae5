pub mod soft_delete;

pub use soft_delete::{SoftDelete, DATE_DELETED_FIELD};
