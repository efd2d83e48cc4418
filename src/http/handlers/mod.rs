//! HTTP request handlers, one module per resource.

pub mod blueprint;
pub mod event;
pub mod schedule;
