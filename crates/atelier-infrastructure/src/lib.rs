//! Durable local state: preference storage, configuration, and paths.

pub mod config;
pub mod paths;
pub mod prefs_store;

pub use config::ClientConfig;
pub use paths::AtelierPaths;
pub use prefs_store::TomlPreferenceStore;
