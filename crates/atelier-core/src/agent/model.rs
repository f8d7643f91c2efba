//! Agent domain model.

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

/// An AI agent belonging to the currently active project.
///
/// `order` plus `id` as tiebreak defines a total order used for display and
/// default selection, independent of fetch order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Agent {
    /// Unique agent identifier
    pub id: String,
    /// Display name
    pub name: String,
    /// Optional role label shown under the name
    pub role: Option<String>,
    /// Model identifier used for this agent's replies
    pub model: String,
    /// Display/sort position within the project
    pub order: i32,
    /// System instruction sent with every conversation turn
    pub system_instruction: String,
    /// Instruction used when generating document summaries
    pub summary_instruction: String,
    /// Ids of documents attached to this agent
    #[serde(default)]
    pub files: Vec<String>,
}

impl Agent {
    /// Total display order: `order` ascending, ties broken by lexicographic
    /// id. Stable regardless of the order the server returned agents in.
    pub fn display_cmp(&self, other: &Self) -> Ordering {
        self.order
            .cmp(&other.order)
            .then_with(|| self.id.cmp(&other.id))
    }
}
