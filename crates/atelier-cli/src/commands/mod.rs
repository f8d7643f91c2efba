pub mod agents;
pub mod chat;
pub mod docs;
pub mod projects;
pub mod session;
