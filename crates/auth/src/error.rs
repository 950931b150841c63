use thiserror::Error;

/// Failure of a session gate or identity provider call.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AuthError {
    #[error("both email and password are required")]
    MissingCredentials,

    #[error("invalid email or password")]
    InvalidCredentials,

    #[error("an account already exists for this email")]
    AccountExists,

    /// The identity provider failed for a reason unrelated to the credentials.
    #[error("identity provider error: {0}")]
    Provider(String),

    /// Reading or writing the stored session token failed.
    #[error("session storage error: {0}")]
    Storage(String),
}
