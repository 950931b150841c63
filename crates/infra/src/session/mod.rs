//! Session gate backed by a token in the durable store.

pub mod token_gate;

pub use token_gate::{DEFAULT_SESSION_KEY, TokenSessionGate};
