//! Unified path management for atelier configuration files.
//!
//! # Directory Structure
//!
//! ```text
//! ~/.config/atelier/           # Config directory
//! ├── config.toml              # Connection and timeout settings
//! └── state.toml               # Durable key/value preferences
//! ```

use atelier_core::error::{AtelierError, Result};
use std::path::PathBuf;

/// Unified path management for atelier.
pub struct AtelierPaths;

impl AtelierPaths {
    /// Returns the atelier configuration directory.
    ///
    /// # Errors
    ///
    /// Returns a config error if the platform config directory cannot be
    /// determined.
    pub fn config_dir() -> Result<PathBuf> {
        dirs::config_dir()
            .map(|dir| dir.join("atelier"))
            .ok_or_else(|| AtelierError::config("cannot determine config directory"))
    }

    /// Returns the path to the main configuration file.
    pub fn config_file() -> Result<PathBuf> {
        Ok(Self::config_dir()?.join("config.toml"))
    }

    /// Returns the path to the durable preference file.
    pub fn state_file() -> Result<PathBuf> {
        Ok(Self::config_dir()?.join("state.toml"))
    }
}
