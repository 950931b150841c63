//! `shopkeep-auth`: session gate contract (signed-in / signed-out).
//!
//! This crate is intentionally decoupled from storage: the token-backed gate
//! lives in `shopkeep-infra`. The catalog never depends on this crate.

pub mod credentials;
pub mod error;
pub mod identity;
pub mod session;

pub use credentials::Credentials;
pub use error::AuthError;
pub use identity::{IdentityProvider, StaticIdentityProvider};
pub use session::{Session, SessionGate, SessionToken};
