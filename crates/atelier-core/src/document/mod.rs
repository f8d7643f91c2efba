//! Project document domain: the shared document pool and its cache.

pub mod cache;
pub mod model;

pub use cache::DocumentCache;
pub use model::{Document, DocumentKey};
