//! Deadline scheduler: schedule manager, state machine, and the
//! infrastructure that wires it to storage and HTTP.

pub mod domain;
pub mod http;
pub mod infrastructure;
pub mod services;

pub use domain::errors::{DomainError, DomainResult};
pub use services::{ManagerConfig, ScheduleManager};
