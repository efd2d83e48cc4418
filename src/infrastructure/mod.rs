//! Ambient infrastructure: configuration, logging, and persistence.

pub mod config;
pub mod logging;
pub mod store;
pub mod xml_codec;
