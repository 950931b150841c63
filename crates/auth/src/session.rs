use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use shopkeep_core::PrincipalId;

use crate::{AuthError, Credentials};

/// Opaque bearer token proving a signed-in session on this device.
#[derive(Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SessionToken(String);

impl SessionToken {
    /// Mint a random token (UUIDv4; not time-ordered, not guessable from ids).
    pub fn generate() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    pub fn from_stored(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl core::fmt::Debug for SessionToken {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str("SessionToken(<redacted>)")
    }
}

/// A signed-in session.
///
/// Sessions restored from a bare legacy token carry neither principal nor
/// sign-in time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Session {
    pub token: SessionToken,
    pub principal_id: Option<PrincipalId>,
    pub signed_in_at: Option<DateTime<Utc>>,
}

impl Session {
    pub fn start(principal_id: PrincipalId, now: DateTime<Utc>) -> Self {
        Self {
            token: SessionToken::generate(),
            principal_id: Some(principal_id),
            signed_in_at: Some(now),
        }
    }

    pub fn encode(&self) -> Result<String, AuthError> {
        serde_json::to_string(self).map_err(|e| AuthError::Storage(e.to_string()))
    }

    /// Decode a stored session.
    ///
    /// Anything that is not a session document is taken as a bare token, which
    /// is how older clients stored it. Blank values mean "no session".
    pub fn decode(stored: &str) -> Option<Self> {
        if stored.trim().is_empty() {
            return None;
        }
        match serde_json::from_str::<Session>(stored) {
            Ok(session) => Some(session),
            Err(_) => Some(Self {
                token: SessionToken::from_stored(stored),
                principal_id: None,
                signed_in_at: None,
            }),
        }
    }
}

/// Signed-in / signed-out state of the shell.
///
/// `is_authenticated` never suspends; it reflects the last `restore`, `login` or
/// `logout`. The catalog does not depend on this gate: which screens may reach
/// the catalog is decided by the presentation layer.
#[async_trait]
pub trait SessionGate: Send + Sync {
    fn is_authenticated(&self) -> bool;

    fn current(&self) -> Option<Session>;

    /// Observe the stored token at process start. Returns the resulting state.
    async fn restore(&self) -> Result<bool, AuthError>;

    async fn login(&self, credentials: &Credentials) -> Result<Session, AuthError>;

    /// Register an account. Does not sign in.
    async fn sign_up(&self, credentials: &Credentials) -> Result<PrincipalId, AuthError>;

    async fn logout(&self) -> Result<(), AuthError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn encoded_session_decodes_back() {
        let session = Session::start(PrincipalId::new(), Utc::now());
        let decoded = Session::decode(&session.encode().unwrap()).unwrap();
        assert_eq!(decoded, session);
    }

    #[test]
    fn bare_token_decodes_as_legacy_session() {
        let session = Session::decode("dummy-token").unwrap();
        assert_eq!(session.token.as_str(), "dummy-token");
        assert!(session.principal_id.is_none());
        assert!(session.signed_in_at.is_none());
    }

    #[test]
    fn blank_token_is_no_session() {
        assert!(Session::decode("").is_none());
        assert!(Session::decode("  ").is_none());
    }

    #[test]
    fn generated_tokens_differ() {
        assert_ne!(SessionToken::generate(), SessionToken::generate());
    }
}
