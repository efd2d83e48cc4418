//! Domain layer: models and ports, free of any I/O or framework dependency.

pub mod errors;
pub mod models;
pub mod ports;

pub use errors::{DomainError, DomainResult};
