//! Screen routing gated on the session.

use std::sync::Arc;

use thiserror::Error;

use shopkeep_auth::{AuthError, Credentials, Session, SessionGate};
use shopkeep_core::PrincipalId;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Screen {
    Login,
    SignUp,
    Home,
    ProductManager,
}

impl Screen {
    /// Screens that are only reachable while signed in.
    pub fn requires_session(self) -> bool {
        matches!(self, Screen::Home | Screen::ProductManager)
    }

    pub fn title(self) -> &'static str {
        match self {
            Screen::Login => "Login",
            Screen::SignUp => "Sign Up",
            Screen::Home => "Home",
            Screen::ProductManager => "ProductManager",
        }
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum NavigationError {
    #[error("{} requires a signed-in session", .0.title())]
    NotAuthenticated(Screen),

    #[error("{} is not available while signed in", .0.title())]
    AlreadySignedIn(Screen),
}

/// Tracks the visible screen and keeps it consistent with the session.
///
/// Signed out, only `Login` and `SignUp` are reachable; signing in lands on
/// `Home` and signing out returns to `Login`.
pub struct AppShell {
    session: Arc<dyn SessionGate>,
    screen: Screen,
}

impl AppShell {
    pub fn new(session: Arc<dyn SessionGate>) -> Self {
        let screen = if session.is_authenticated() {
            Screen::Home
        } else {
            Screen::Login
        };
        Self { session, screen }
    }

    pub fn screen(&self) -> Screen {
        self.screen
    }

    pub fn is_authenticated(&self) -> bool {
        self.session.is_authenticated()
    }

    pub fn navigate(&mut self, to: Screen) -> Result<Screen, NavigationError> {
        let authenticated = self.session.is_authenticated();
        if to.requires_session() && !authenticated {
            return Err(NavigationError::NotAuthenticated(to));
        }
        if !to.requires_session() && authenticated {
            return Err(NavigationError::AlreadySignedIn(to));
        }
        tracing::debug!(from = ?self.screen, to = ?to, "navigate");
        self.screen = to;
        Ok(to)
    }

    /// Pop back one level: `ProductManager` → `Home`, `SignUp` → `Login`.
    pub fn back(&mut self) -> Screen {
        self.screen = match self.screen {
            Screen::ProductManager => Screen::Home,
            Screen::SignUp => Screen::Login,
            other => other,
        };
        self.screen
    }

    pub async fn login(&mut self, credentials: &Credentials) -> Result<Session, AuthError> {
        let session = self.session.login(credentials).await?;
        self.screen = Screen::Home;
        Ok(session)
    }

    /// Create the account and return to `Login`; does not sign in.
    pub async fn sign_up(&mut self, credentials: &Credentials) -> Result<PrincipalId, AuthError> {
        let principal_id = self.session.sign_up(credentials).await?;
        if !self.session.is_authenticated() {
            self.screen = Screen::Login;
        }
        Ok(principal_id)
    }

    pub async fn logout(&mut self) -> Result<(), AuthError> {
        self.session.logout().await?;
        self.screen = Screen::Login;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shopkeep_auth::StaticIdentityProvider;
    use shopkeep_infra::{InMemoryDurableStore, TokenSessionGate};

    fn shell() -> AppShell {
        let provider = StaticIdentityProvider::new(4)
            .with_account("test@example.com", "123456")
            .unwrap();
        AppShell::new(Arc::new(TokenSessionGate::new(InMemoryDurableStore::new(), provider)))
    }

    #[tokio::test]
    async fn signed_out_starts_on_login_and_cannot_reach_home() {
        let mut shell = shell();
        assert_eq!(shell.screen(), Screen::Login);
        assert_eq!(
            shell.navigate(Screen::Home),
            Err(NavigationError::NotAuthenticated(Screen::Home))
        );
        assert_eq!(shell.navigate(Screen::SignUp), Ok(Screen::SignUp));
        assert_eq!(shell.back(), Screen::Login);
    }

    #[tokio::test]
    async fn login_and_logout_move_between_login_and_home() {
        let mut shell = shell();
        shell
            .login(&Credentials::new("test@example.com", "123456"))
            .await
            .unwrap();
        assert_eq!(shell.screen(), Screen::Home);

        assert_eq!(shell.navigate(Screen::ProductManager), Ok(Screen::ProductManager));
        assert_eq!(shell.back(), Screen::Home);
        assert_eq!(
            shell.navigate(Screen::Login),
            Err(NavigationError::AlreadySignedIn(Screen::Login))
        );

        shell.logout().await.unwrap();
        assert_eq!(shell.screen(), Screen::Login);
        assert!(!shell.is_authenticated());
    }

    #[tokio::test]
    async fn failed_login_stays_on_login() {
        let mut shell = shell();
        let err = shell
            .login(&Credentials::new("test@example.com", "nope"))
            .await
            .unwrap_err();
        assert_eq!(err, AuthError::InvalidCredentials);
        assert_eq!(shell.screen(), Screen::Login);
    }

    #[tokio::test]
    async fn sign_up_returns_to_login() {
        let mut shell = shell();
        shell.navigate(Screen::SignUp).unwrap();
        shell
            .sign_up(&Credentials::new("new@example.com", "pw"))
            .await
            .unwrap();
        assert_eq!(shell.screen(), Screen::Login);
        assert!(!shell.is_authenticated());
    }
}
