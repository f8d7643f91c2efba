//! Error types for the Atelier client.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A shared error type for the entire Atelier client.
///
/// This provides typed, structured error variants with automatic conversion
/// from common error types via the `From` trait. The variants mirror the
/// failure classes the bootstrap coordinator distinguishes: fatal auth
/// failures, rate limiting, transient server/network trouble, and local
/// domain rules violated before any network call is made.
#[derive(Error, Debug, Clone, Serialize, Deserialize)]
pub enum AtelierError {
    /// Authentication failure (HTTP 401/403). Fatal to the session.
    #[error("Authentication failed ({status}): {message}")]
    Auth { status: u16, message: String },

    /// Rate limited by the backend (HTTP 429).
    #[error("Rate limited by the server")]
    RateLimit { retry_after_secs: Option<u64> },

    /// Transient server-side failure (HTTP 5xx).
    #[error("Server error ({status}): {message}")]
    Server { status: u16, message: String },

    /// Connection-level failure before an HTTP status was received.
    #[error("Network error: {0}")]
    Network(String),

    /// Client-side abort of a short request that exceeded its deadline.
    #[error("Request timed out")]
    Timeout,

    /// Structured field errors from the backend, flattened to one string.
    #[error("Validation failed: {message}")]
    Validation { message: String },

    /// A local domain rule violated before any network call.
    #[error("{0}")]
    Domain(String),

    /// Entity not found error with type information
    #[error("Entity not found: {entity_type} '{id}'")]
    NotFound { entity_type: String, id: String },

    /// IO error (file system operations)
    #[error("IO error: {message}")]
    Io { message: String },

    /// Serialization/deserialization error
    #[error("Serialization error: {format} - {message}")]
    Serialization { format: String, message: String },

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Internal error (should not happen in normal operation)
    #[error("Internal error: {0}")]
    Internal(String),
}

impl AtelierError {
    // ============================================================================
    // Constructor helpers
    // ============================================================================

    /// Creates an Auth error
    pub fn auth(status: u16, message: impl Into<String>) -> Self {
        Self::Auth {
            status,
            message: message.into(),
        }
    }

    /// Creates a RateLimit error
    pub fn rate_limit(retry_after_secs: Option<u64>) -> Self {
        Self::RateLimit { retry_after_secs }
    }

    /// Creates a Server error
    pub fn server(status: u16, message: impl Into<String>) -> Self {
        Self::Server {
            status,
            message: message.into(),
        }
    }

    /// Creates a Network error
    pub fn network(message: impl Into<String>) -> Self {
        Self::Network(message.into())
    }

    /// Creates a Validation error from an already-flattened message
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }

    /// Creates a Domain error
    pub fn domain(message: impl Into<String>) -> Self {
        Self::Domain(message.into())
    }

    /// Creates a NotFound error
    pub fn not_found(entity_type: impl Into<String>, id: impl Into<String>) -> Self {
        Self::NotFound {
            entity_type: entity_type.into(),
            id: id.into(),
        }
    }

    /// Creates an IO error
    pub fn io(message: impl Into<String>) -> Self {
        Self::Io {
            message: message.into(),
        }
    }

    /// Creates a Config error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    /// Creates an Internal error
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal(message.into())
    }

    // ============================================================================
    // Classification predicates
    // ============================================================================

    /// Check if this is a fatal authentication error
    pub fn is_auth(&self) -> bool {
        matches!(self, Self::Auth { .. })
    }

    /// Check if this is a rate-limit error
    pub fn is_rate_limit(&self) -> bool {
        matches!(self, Self::RateLimit { .. })
    }

    /// Check if this is a NotFound error
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }

    /// Check if this error is transient: a retry at a later time may succeed
    /// without any local state change.
    ///
    /// Returns true for:
    /// - `Server` errors (5xx)
    /// - `Network` errors (connectivity)
    /// - `Timeout` errors
    /// - `Network`/`Internal` errors whose message indicates the backing
    ///   store is unreachable
    pub fn is_transient(&self) -> bool {
        match self {
            Self::Server { .. } | Self::Network(_) | Self::Timeout => true,
            Self::Internal(message) => {
                let lower = message.to_lowercase();
                lower.contains("unreachable") || lower.contains("unavailable")
            }
            _ => false,
        }
    }

    /// Returns the text shown to the user for this failure.
    ///
    /// Known technical messages are mapped to friendlier copy via
    /// [`translate::user_facing`]; anything unknown passes through unchanged.
    pub fn user_message(&self) -> String {
        match self {
            Self::Auth { .. } => "Your session has expired. Please sign in again.".to_string(),
            Self::RateLimit { .. } => {
                "You're going a little fast. Please wait a moment and try again.".to_string()
            }
            Self::Server { .. } | Self::Timeout => {
                "The server is having trouble right now. Please try again later.".to_string()
            }
            Self::Network(_) => {
                "Cannot reach the server. Check your connection and try again.".to_string()
            }
            Self::Validation { message } => translate::user_facing(message),
            Self::Domain(message) => translate::user_facing(message),
            other => translate::user_facing(&other.to_string()),
        }
    }
}

// ============================================================================
// From implementations for automatic conversion
// ============================================================================

impl From<std::io::Error> for AtelierError {
    fn from(err: std::io::Error) -> Self {
        Self::Io {
            message: format!("{} (kind: {:?})", err, err.kind()),
        }
    }
}

impl From<serde_json::Error> for AtelierError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization {
            format: "JSON".to_string(),
            message: err.to_string(),
        }
    }
}

impl From<toml::de::Error> for AtelierError {
    fn from(err: toml::de::Error) -> Self {
        Self::Serialization {
            format: "TOML".to_string(),
            message: err.to_string(),
        }
    }
}

impl From<toml::ser::Error> for AtelierError {
    fn from(err: toml::ser::Error) -> Self {
        Self::Serialization {
            format: "TOML".to_string(),
            message: err.to_string(),
        }
    }
}

/// A type alias for `Result<T, AtelierError>`.
pub type Result<T> = std::result::Result<T, AtelierError>;

pub mod translate {
    //! Translation of known backend technical messages to user-facing copy.
    //!
    //! The backend emits a small, stable set of technical strings; this table
    //! maps them (and known validation substrings) to text suitable for
    //! direct display. Unknown messages pass through unchanged.

    /// Exact technical messages and their replacements.
    const EXACT: &[(&str, &str)] = &[
        (
            "datastore unreachable",
            "The server is having trouble right now. Please try again later.",
        ),
        (
            "no active project selected",
            "Select a project before starting a conversation.",
        ),
        (
            "knowledge base files can only be removed by an administrator",
            "This file is part of the project knowledge base and can only be removed by an administrator.",
        ),
    ];

    /// Validation substrings and their replacements.
    const SUBSTRING: &[(&str, &str)] = &[
        ("must not be blank", "This field cannot be empty."),
        ("already exists", "An item with this name already exists."),
        ("too large", "The file is too large to upload."),
    ];

    /// Maps a known technical message to user-facing copy.
    ///
    /// Unknown messages are returned unchanged.
    pub fn user_facing(message: &str) -> String {
        for (technical, friendly) in EXACT {
            if message == *technical {
                return (*friendly).to_string();
            }
        }
        for (needle, friendly) in SUBSTRING {
            if message.contains(needle) {
                return (*friendly).to_string();
            }
        }
        message.to_string()
    }
}
