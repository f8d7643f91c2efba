//! Session domain: the authenticated user and their token.

pub mod model;
pub mod store;

pub use model::User;
pub use store::SessionStore;
