//! Process-wide logging setup shared by every binary in the workspace.

/// Subscriber configuration and installation.
pub mod tracing;

pub use crate::tracing::{LogFormat, LogTarget, ObservabilityConfig, ObservabilityError};

/// Install the subscriber described by `config`.
///
/// Safe to call multiple times; subsequent calls become no-ops.
pub fn init(config: &ObservabilityConfig) {
    crate::tracing::init(config);
}

/// Install a subscriber configured from the process environment.
pub fn init_default() {
    crate::tracing::init(&ObservabilityConfig::from_env());
}
