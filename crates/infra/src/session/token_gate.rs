use std::sync::RwLock;

use async_trait::async_trait;
use chrono::Utc;

use shopkeep_auth::{AuthError, Credentials, IdentityProvider, Session, SessionGate};
use shopkeep_core::PrincipalId;

use crate::durable_store::{DurableStore, DurableStoreError};

/// Durable key holding the session token.
pub const DEFAULT_SESSION_KEY: &str = "token";

/// Signed in iff a session token is stored.
///
/// Credentials are checked by the injected [`IdentityProvider`]; the gate only
/// records the outcome. Login/logout are serialized so the stored token and
/// the in-memory state change together.
pub struct TokenSessionGate<S, P> {
    store: S,
    provider: P,
    key: String,
    current: RwLock<Option<Session>>,
    transitions: tokio::sync::Mutex<()>,
}

impl<S, P> TokenSessionGate<S, P>
where
    S: DurableStore,
    P: IdentityProvider,
{
    pub fn new(store: S, provider: P) -> Self {
        Self {
            store,
            provider,
            key: DEFAULT_SESSION_KEY.to_string(),
            current: RwLock::new(None),
            transitions: tokio::sync::Mutex::new(()),
        }
    }

    pub fn with_key(mut self, key: impl Into<String>) -> Self {
        self.key = key.into();
        self
    }

    pub fn provider(&self) -> &P {
        &self.provider
    }

    fn set_current(&self, session: Option<Session>) {
        match self.current.write() {
            Ok(mut current) => *current = session,
            Err(poisoned) => *poisoned.into_inner() = session,
        }
    }
}

fn storage_error(e: DurableStoreError) -> AuthError {
    AuthError::Storage(e.to_string())
}

#[async_trait]
impl<S, P> SessionGate for TokenSessionGate<S, P>
where
    S: DurableStore,
    P: IdentityProvider,
{
    fn is_authenticated(&self) -> bool {
        self.current.read().map(|c| c.is_some()).unwrap_or(false)
    }

    fn current(&self) -> Option<Session> {
        self.current.read().ok().and_then(|c| c.clone())
    }

    async fn restore(&self) -> Result<bool, AuthError> {
        let _guard = self.transitions.lock().await;
        let stored = self.store.get(&self.key).await.map_err(storage_error)?;
        let session = stored.as_deref().and_then(Session::decode);
        let authenticated = session.is_some();
        self.set_current(session);
        tracing::debug!(authenticated, "session restored from durable store");
        Ok(authenticated)
    }

    async fn login(&self, credentials: &Credentials) -> Result<Session, AuthError> {
        credentials.validate()?;
        let _guard = self.transitions.lock().await;

        let principal_id = self.provider.verify(credentials).await.map_err(|e| {
            tracing::info!("login failed: {e}");
            e
        })?;

        let session = Session::start(principal_id, Utc::now());
        self.store
            .set(&self.key, session.encode()?)
            .await
            .map_err(storage_error)?;
        self.set_current(Some(session.clone()));

        tracing::info!(%principal_id, "signed in");
        Ok(session)
    }

    async fn sign_up(&self, credentials: &Credentials) -> Result<PrincipalId, AuthError> {
        credentials.validate()?;
        self.provider.sign_up(credentials).await
    }

    async fn logout(&self) -> Result<(), AuthError> {
        let _guard = self.transitions.lock().await;
        self.store.remove(&self.key).await.map_err(storage_error)?;
        self.set_current(None);
        tracing::info!("signed out");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::sync::atomic::{AtomicBool, Ordering};

    use super::*;
    use crate::durable_store::InMemoryDurableStore;
    use shopkeep_auth::StaticIdentityProvider;

    fn provider() -> StaticIdentityProvider {
        StaticIdentityProvider::new(4)
            .with_account("test@example.com", "123456")
            .unwrap()
    }

    fn good() -> Credentials {
        Credentials::new("test@example.com", "123456")
    }

    #[derive(Default)]
    struct ReadOnlyStore {
        inner: InMemoryDurableStore,
        readonly: AtomicBool,
    }

    #[async_trait]
    impl DurableStore for ReadOnlyStore {
        async fn get(&self, key: &str) -> Result<Option<String>, DurableStoreError> {
            self.inner.get(key).await
        }

        async fn set(&self, key: &str, value: String) -> Result<(), DurableStoreError> {
            if self.readonly.load(Ordering::SeqCst) {
                return Err(DurableStoreError::Io("read-only".to_string()));
            }
            self.inner.set(key, value).await
        }

        async fn remove(&self, key: &str) -> Result<(), DurableStoreError> {
            if self.readonly.load(Ordering::SeqCst) {
                return Err(DurableStoreError::Io("read-only".to_string()));
            }
            self.inner.remove(key).await
        }
    }

    #[tokio::test]
    async fn starts_signed_out_on_empty_store() {
        let gate = TokenSessionGate::new(InMemoryDurableStore::new(), provider());
        assert!(!gate.restore().await.unwrap());
        assert!(!gate.is_authenticated());
    }

    #[tokio::test]
    async fn login_stores_token_and_survives_restart() {
        let store = Arc::new(InMemoryDurableStore::new());
        let gate = TokenSessionGate::new(store.clone(), provider());

        let session = gate.login(&good()).await.unwrap();
        assert!(gate.is_authenticated());
        assert_eq!(gate.current(), Some(session.clone()));
        assert!(store.peek(DEFAULT_SESSION_KEY).is_some());

        let restarted = TokenSessionGate::new(store, provider());
        assert!(restarted.restore().await.unwrap());
        assert_eq!(restarted.current(), Some(session));
    }

    #[tokio::test]
    async fn wrong_password_stays_signed_out() {
        let store = Arc::new(InMemoryDurableStore::new());
        let gate = TokenSessionGate::new(store.clone(), provider());

        let err = gate
            .login(&Credentials::new("test@example.com", "000000"))
            .await
            .unwrap_err();
        assert_eq!(err, AuthError::InvalidCredentials);
        assert!(!gate.is_authenticated());
        assert!(store.peek(DEFAULT_SESSION_KEY).is_none());
    }

    #[tokio::test]
    async fn missing_credentials_are_rejected_before_the_provider() {
        let gate = TokenSessionGate::new(InMemoryDurableStore::new(), provider());
        let err = gate.login(&Credentials::new("", "")).await.unwrap_err();
        assert_eq!(err, AuthError::MissingCredentials);
    }

    #[tokio::test]
    async fn logout_clears_token() {
        let store = Arc::new(InMemoryDurableStore::new());
        let gate = TokenSessionGate::new(store.clone(), provider());
        gate.login(&good()).await.unwrap();

        gate.logout().await.unwrap();
        assert!(!gate.is_authenticated());
        assert!(store.peek(DEFAULT_SESSION_KEY).is_none());

        let restarted = TokenSessionGate::new(store, provider());
        assert!(!restarted.restore().await.unwrap());
    }

    #[tokio::test]
    async fn legacy_bare_token_counts_as_signed_in() {
        let store = InMemoryDurableStore::new().with_value(DEFAULT_SESSION_KEY, "dummy-token");
        let gate = TokenSessionGate::new(store, provider());
        assert!(gate.restore().await.unwrap());
        assert!(gate.current().unwrap().principal_id.is_none());
    }

    #[tokio::test]
    async fn storage_failure_on_login_leaves_gate_signed_out() {
        let store = ReadOnlyStore::default();
        store.readonly.store(true, Ordering::SeqCst);
        let gate = TokenSessionGate::new(store, provider());

        let err = gate.login(&good()).await.unwrap_err();
        assert!(matches!(err, AuthError::Storage(_)));
        assert!(!gate.is_authenticated());
    }

    #[tokio::test]
    async fn storage_failure_on_logout_keeps_session() {
        let store = Arc::new(ReadOnlyStore::default());
        let gate = TokenSessionGate::new(store.clone(), provider());
        gate.login(&good()).await.unwrap();

        store.readonly.store(true, Ordering::SeqCst);
        assert!(matches!(gate.logout().await, Err(AuthError::Storage(_))));
        assert!(gate.is_authenticated());
    }

    #[tokio::test]
    async fn sign_up_does_not_sign_in() {
        let gate = TokenSessionGate::new(InMemoryDurableStore::new(), StaticIdentityProvider::new(4));
        let creds = Credentials::new("new@example.com", "pw");

        gate.sign_up(&creds).await.unwrap();
        assert!(!gate.is_authenticated());

        gate.login(&creds).await.unwrap();
        assert!(gate.is_authenticated());
    }

    #[tokio::test]
    async fn custom_key_is_used() {
        let store = Arc::new(InMemoryDurableStore::new());
        let gate = TokenSessionGate::new(store.clone(), provider()).with_key("session");
        gate.login(&good()).await.unwrap();
        assert!(store.peek("session").is_some());
        assert!(store.peek(DEFAULT_SESSION_KEY).is_none());
    }
}
