//! Ports: traits the domain depends on, implemented by `infrastructure`.

pub mod blueprint_store;

pub use blueprint_store::BlueprintStore;
