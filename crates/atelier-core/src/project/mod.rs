//! Project domain: projects, project types, and the active selection.

pub mod model;
pub mod registry;

pub use model::{Project, ProjectType};
pub use registry::ProjectRegistry;
