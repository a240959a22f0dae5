use serde::{Deserialize, Serialize};

use crate::modules::choices::Enumeration;

/// Verification state of an email record. Non-positive codes are the
/// built-in states; positive codes are left for in-progress states an
/// application defines.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[serde(transparent)]
pub struct EmailStatus(pub i64);

impl EmailStatus {
    /// Owner opted out of all mail
    pub const BLOCKED: EmailStatus = EmailStatus(-3);
    /// Known good
    pub const VALID: EmailStatus = EmailStatus(-2);
    /// Known bad
    pub const INVALID: EmailStatus = EmailStatus(-1);
    /// Link sent, awaiting response
    pub const UNVERIFIED: EmailStatus = EmailStatus(0);

    pub fn code(self) -> i64 {
        self.0
    }

    /// No transition out of these states is defined
    pub fn is_settled(self) -> bool {
        matches!(
            self,
            EmailStatus::BLOCKED | EmailStatus::VALID | EmailStatus::INVALID
        )
    }
}

impl Default for EmailStatus {
    fn default() -> Self {
        EmailStatus::UNVERIFIED
    }
}

impl From<EmailStatus> for serde_json::Value {
    fn from(status: EmailStatus) -> Self {
        serde_json::Value::from(status.0)
    }
}

pub fn default_verification_states() -> Enumeration<i64> {
    Enumeration::new()
        .with_name(EmailStatus::BLOCKED.0, "BLOCKED")
        .with_name(EmailStatus::VALID.0, "VALID")
        .with_name(EmailStatus::INVALID.0, "INVALID")
        .with_name(EmailStatus::UNVERIFIED.0, "UNVERIFIED")
}
