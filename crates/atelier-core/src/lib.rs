pub mod agent;
pub mod api;
pub mod chat;
pub mod document;
pub mod error;
pub mod prefs;
pub mod project;
pub mod session;

#[cfg(test)]
pub(crate) mod testing;

// Re-export common error type
pub use error::{AtelierError, Result};
