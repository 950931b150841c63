//! Identity provider contract and a local, in-memory implementation.

use std::collections::HashMap;
use std::sync::RwLock;

use async_trait::async_trait;

use shopkeep_core::PrincipalId;

use crate::{AuthError, Credentials};

/// Remote (or local) authority that verifies credentials.
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    async fn verify(&self, credentials: &Credentials) -> Result<PrincipalId, AuthError>;

    async fn sign_up(&self, credentials: &Credentials) -> Result<PrincipalId, AuthError>;
}

#[derive(Debug, Clone)]
struct Account {
    principal_id: PrincipalId,
    password_hash: String,
}

/// In-memory identity provider with bcrypt-hashed passwords.
///
/// Used for dev/tests and as the offline stand-in for the remote provider.
#[derive(Debug)]
pub struct StaticIdentityProvider {
    accounts: RwLock<HashMap<String, Account>>,
    cost: u32,
}

impl StaticIdentityProvider {
    /// `cost` is the bcrypt work factor (4..=31).
    pub fn new(cost: u32) -> Self {
        Self {
            accounts: RwLock::new(HashMap::new()),
            cost,
        }
    }

    /// Seed an account; replaces any existing account for the same email.
    pub fn with_account(self, email: &str, password: &str) -> Result<Self, AuthError> {
        let credentials = Credentials::new(email, password);
        credentials.validate()?;
        let account = Account {
            principal_id: PrincipalId::new(),
            password_hash: self.hash(&credentials.password)?,
        };
        self.accounts
            .write()
            .map_err(|_| AuthError::Provider("lock poisoned".to_string()))?
            .insert(credentials.normalized_email(), account);
        Ok(self)
    }

    fn has_account(&self, email: &str) -> Result<bool, AuthError> {
        self.accounts
            .read()
            .map(|a| a.contains_key(email))
            .map_err(|_| AuthError::Provider("lock poisoned".to_string()))
    }

    pub fn account_count(&self) -> usize {
        self.accounts.read().map(|a| a.len()).unwrap_or(0)
    }

    fn hash(&self, password: &str) -> Result<String, AuthError> {
        bcrypt::hash(password, self.cost).map_err(|e| AuthError::Provider(e.to_string()))
    }
}

/// Run a bcrypt call on the blocking pool; at production cost it takes long
/// enough to stall a runtime worker.
async fn off_runtime<T, F>(work: F) -> Result<T, AuthError>
where
    F: FnOnce() -> Result<T, bcrypt::BcryptError> + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(work)
        .await
        .map_err(|e| AuthError::Provider(format!("password task failed: {e}")))?
        .map_err(|e| AuthError::Provider(e.to_string()))
}

impl Default for StaticIdentityProvider {
    fn default() -> Self {
        Self::new(bcrypt::DEFAULT_COST)
    }
}

#[async_trait]
impl IdentityProvider for StaticIdentityProvider {
    async fn verify(&self, credentials: &Credentials) -> Result<PrincipalId, AuthError> {
        credentials.validate()?;

        let account = {
            let accounts = self
                .accounts
                .read()
                .map_err(|_| AuthError::Provider("lock poisoned".to_string()))?;
            accounts.get(&credentials.normalized_email()).cloned()
        };

        let Some(account) = account else {
            tracing::debug!("login rejected: unknown account");
            return Err(AuthError::InvalidCredentials);
        };

        let password = credentials.password.clone();
        let password_hash = account.password_hash.clone();
        let ok = off_runtime(move || bcrypt::verify(password, &password_hash)).await?;
        if !ok {
            tracing::debug!(principal_id = %account.principal_id, "login rejected: wrong password");
            return Err(AuthError::InvalidCredentials);
        }

        Ok(account.principal_id)
    }

    async fn sign_up(&self, credentials: &Credentials) -> Result<PrincipalId, AuthError> {
        credentials.validate()?;
        let email = credentials.normalized_email();
        if self.has_account(&email)? {
            return Err(AuthError::AccountExists);
        }

        let password = credentials.password.clone();
        let cost = self.cost;
        let password_hash = off_runtime(move || bcrypt::hash(password, cost)).await?;

        let mut accounts = self
            .accounts
            .write()
            .map_err(|_| AuthError::Provider("lock poisoned".to_string()))?;
        // Re-check: a concurrent sign-up may have won while hashing.
        if accounts.contains_key(&email) {
            return Err(AuthError::AccountExists);
        }

        let principal_id = PrincipalId::new();
        accounts.insert(
            email,
            Account {
                principal_id,
                password_hash,
            },
        );
        tracing::info!(%principal_id, "account created");
        Ok(principal_id)
    }
}
