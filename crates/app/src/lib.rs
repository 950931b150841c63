//! Application shell for the shopkeep catalog.
//!
//! Wires the durable store, session gate and catalog repository together and
//! exposes the per-screen state (routing, product form, product grid).

pub mod browser;
pub mod config;
pub mod console;
pub mod editor;
pub mod shell;
pub mod state;

pub use browser::{CatalogBrowser, EMPTY_MESSAGE, ProductCard};
pub use config::{AppConfig, ConfigError, CorruptPolicy, StoreBackend};
pub use console::{Command, Console};
pub use editor::CatalogEditor;
pub use shell::{AppShell, NavigationError, Screen};
pub use state::{AppCatalog, AppState, SharedStore};
