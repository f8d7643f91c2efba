//! Application layer: the bootstrap coordinator.

pub mod coordinator;

pub use coordinator::{BootstrapPhase, ResourceCoordinator};
