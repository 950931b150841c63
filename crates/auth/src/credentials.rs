use serde::{Deserialize, Serialize};

use crate::AuthError;

/// Email + password pair as typed on the login / sign-up screens.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Credentials {
    pub email: String,
    pub password: String,
}

impl Credentials {
    pub fn new(email: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            password: password.into(),
        }
    }

    /// Both fields must be present before anything is sent to a provider.
    pub fn validate(&self) -> Result<(), AuthError> {
        if self.email.trim().is_empty() || self.password.is_empty() {
            return Err(AuthError::MissingCredentials);
        }
        Ok(())
    }

    /// Email as used for account lookup (trimmed, lowercase).
    pub fn normalized_email(&self) -> String {
        self.email.trim().to_lowercase()
    }
}

// Keep passwords out of logs.
impl core::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Credentials")
            .field("email", &self.email)
            .field("password", &"<redacted>")
            .finish()
    }
}
