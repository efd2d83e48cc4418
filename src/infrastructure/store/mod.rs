//! SQLite-backed persistence adapter.

pub mod connection;
pub mod sqlite;

pub use connection::ConnectionError;
pub use sqlite::SqliteBlueprintStore;
