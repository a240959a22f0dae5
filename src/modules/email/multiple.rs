use super::verifiable::VerifiableEmail;
use crate::modules::contact::Ranked;

/// One of several labelled addresses belonging to the same owner
pub trait MultipleEmail: VerifiableEmail + Ranked {
    fn title(&self) -> Option<&str>;

    /// Title if set, otherwise the address itself
    fn display_title(&self) -> String {
        match self.title() {
            Some(title) if !title.is_empty() => title.to_string(),
            _ => self.email().address.clone(),
        }
    }
}
