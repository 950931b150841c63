//! Application configuration, read from the environment at startup.

use std::path::PathBuf;
use std::str::FromStr;

use thiserror::Error;

use shopkeep_infra::{DEFAULT_CATALOG_KEY, DEFAULT_SESSION_KEY};
use shopkeep_observability::ObservabilityConfig;

pub const STORE_VAR: &str = "SHOPKEEP_STORE";
pub const DATA_DIR_VAR: &str = "SHOPKEEP_DATA_DIR";
pub const CATALOG_KEY_VAR: &str = "SHOPKEEP_CATALOG_KEY";
pub const SESSION_KEY_VAR: &str = "SHOPKEEP_SESSION_KEY";
pub const ON_CORRUPT_VAR: &str = "SHOPKEEP_ON_CORRUPT";
pub const CURRENCY_VAR: &str = "SHOPKEEP_CURRENCY";

const DEFAULT_CURRENCY: &str = "₹";

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("unknown SHOPKEEP_STORE value: {0:?} (expected memory, file or sqlite)")]
    UnknownStore(String),

    #[error("unknown SHOPKEEP_ON_CORRUPT value: {0:?} (expected abort or discard)")]
    UnknownCorruptPolicy(String),

    #[error("{0} must not be empty")]
    Empty(&'static str),

    #[error("no platform data directory; set SHOPKEEP_DATA_DIR")]
    NoDataDir,
}

/// Which [`DurableStore`](shopkeep_infra::DurableStore) backend to open.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StoreBackend {
    Memory,
    #[default]
    File,
    Sqlite,
}

impl FromStr for StoreBackend {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "memory" => Ok(Self::Memory),
            "file" => Ok(Self::File),
            "sqlite" => Ok(Self::Sqlite),
            other => Err(ConfigError::UnknownStore(other.to_string())),
        }
    }
}

/// What to do when the stored catalog cannot be decoded at startup.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CorruptPolicy {
    /// Refuse to start; the payload stays on disk for inspection.
    #[default]
    Abort,
    /// Start from an empty catalog; the payload is overwritten by the next write.
    Discard,
}

impl FromStr for CorruptPolicy {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "abort" => Ok(Self::Abort),
            "discard" => Ok(Self::Discard),
            other => Err(ConfigError::UnknownCorruptPolicy(other.to_string())),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    pub store: StoreBackend,
    pub data_dir: PathBuf,
    pub catalog_key: String,
    pub session_key: String,
    pub on_corrupt: CorruptPolicy,
    pub currency_symbol: String,
    pub observability: ObservabilityConfig,
}

impl AppConfig {
    /// In-memory configuration with every default; nothing touches disk.
    pub fn in_memory() -> Self {
        Self {
            store: StoreBackend::Memory,
            data_dir: PathBuf::new(),
            catalog_key: DEFAULT_CATALOG_KEY.to_string(),
            session_key: DEFAULT_SESSION_KEY.to_string(),
            on_corrupt: CorruptPolicy::default(),
            currency_symbol: DEFAULT_CURRENCY.to_string(),
            observability: ObservabilityConfig::default(),
        }
    }

    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let store = match lookup(STORE_VAR) {
            Some(raw) => raw.parse()?,
            None => StoreBackend::default(),
        };

        let on_corrupt = match lookup(ON_CORRUPT_VAR) {
            Some(raw) => raw.parse()?,
            None => CorruptPolicy::default(),
        };

        let data_dir = match lookup(DATA_DIR_VAR) {
            Some(dir) if dir.trim().is_empty() => return Err(ConfigError::Empty(DATA_DIR_VAR)),
            Some(dir) => PathBuf::from(dir),
            None if store == StoreBackend::Memory => PathBuf::new(),
            None => dirs::data_dir()
                .map(|d| d.join("shopkeep"))
                .ok_or(ConfigError::NoDataDir)?,
        };

        Ok(Self {
            store,
            data_dir,
            catalog_key: non_empty(&lookup, CATALOG_KEY_VAR, DEFAULT_CATALOG_KEY)?,
            session_key: non_empty(&lookup, SESSION_KEY_VAR, DEFAULT_SESSION_KEY)?,
            on_corrupt,
            currency_symbol: lookup(CURRENCY_VAR).unwrap_or_else(|| DEFAULT_CURRENCY.to_string()),
            observability: ObservabilityConfig::from_lookup(&lookup),
        })
    }

    /// Directory holding one file per key for [`StoreBackend::File`].
    pub fn file_store_dir(&self) -> PathBuf {
        self.data_dir.join("store")
    }

    /// Database file for [`StoreBackend::Sqlite`].
    pub fn sqlite_path(&self) -> PathBuf {
        self.data_dir.join("shopkeep.db")
    }
}

fn non_empty(
    lookup: &impl Fn(&str) -> Option<String>,
    var: &'static str,
    default: &str,
) -> Result<String, ConfigError> {
    match lookup(var) {
        Some(value) if value.trim().is_empty() => Err(ConfigError::Empty(var)),
        Some(value) => Ok(value),
        None => Ok(default.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| vars.get(key).cloned()
    }

    #[test]
    fn memory_store_needs_no_data_dir() {
        let config = AppConfig::from_lookup(lookup(&[(STORE_VAR, "memory")])).unwrap();
        assert_eq!(config, AppConfig::in_memory());
    }

    #[test]
    fn reads_every_variable() {
        let config = AppConfig::from_lookup(lookup(&[
            (STORE_VAR, "SQLite"),
            (DATA_DIR_VAR, "/tmp/shop"),
            (CATALOG_KEY_VAR, "items"),
            (SESSION_KEY_VAR, "auth"),
            (ON_CORRUPT_VAR, "discard"),
            (CURRENCY_VAR, "$"),
            ("SHOPKEEP_LOG", "debug"),
        ]))
        .unwrap();

        assert_eq!(config.store, StoreBackend::Sqlite);
        assert_eq!(config.sqlite_path(), PathBuf::from("/tmp/shop/shopkeep.db"));
        assert_eq!(config.catalog_key, "items");
        assert_eq!(config.session_key, "auth");
        assert_eq!(config.on_corrupt, CorruptPolicy::Discard);
        assert_eq!(config.currency_symbol, "$");
        assert_eq!(config.observability.filter, "debug");
    }

    #[test]
    fn rejects_unknown_values() {
        assert_eq!(
            AppConfig::from_lookup(lookup(&[(STORE_VAR, "redis")])),
            Err(ConfigError::UnknownStore("redis".to_string()))
        );
        assert!(matches!(
            AppConfig::from_lookup(lookup(&[(STORE_VAR, "memory"), (ON_CORRUPT_VAR, "ignore")])),
            Err(ConfigError::UnknownCorruptPolicy(_))
        ));
    }

    #[test]
    fn rejects_blank_keys() {
        assert_eq!(
            AppConfig::from_lookup(lookup(&[(STORE_VAR, "memory"), (CATALOG_KEY_VAR, " ")])),
            Err(ConfigError::Empty(CATALOG_KEY_VAR))
        );
    }

    #[test]
    fn file_store_lives_under_data_dir() {
        let config = AppConfig::from_lookup(lookup(&[(DATA_DIR_VAR, "/data")])).unwrap();
        assert_eq!(config.store, StoreBackend::File);
        assert_eq!(config.file_store_dir(), PathBuf::from("/data/store"));
    }
}
