//! Session domain model.

use serde::{Deserialize, Serialize};

/// The authenticated user.
///
/// The token, not this record, is the sole authority for "is logged in";
/// the user is display data loaded during bootstrap.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    /// Unique user identifier
    pub id: String,
    /// Account email
    pub email: String,
    /// Display name
    pub name: String,
}
