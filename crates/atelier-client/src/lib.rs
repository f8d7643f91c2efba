//! HTTP implementation of the backend port.

mod dto;
mod rest;

pub use rest::{RestBackend, RestConfig};
