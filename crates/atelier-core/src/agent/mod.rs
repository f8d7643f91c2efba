//! Agent domain: the per-project agent roster and active selection.

pub mod model;
pub mod registry;

pub use model::Agent;
pub use registry::AgentRegistry;
