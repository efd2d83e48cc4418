//! Repository port for blueprint and event persistence.
//!
//! The sole I/O dependency of the schedule manager, narrow enough that
//! an in-memory test double can implement it without any async runtime
//! trickery.

use async_trait::async_trait;

use crate::domain::errors::DomainResult;
use crate::domain::models::{Blueprint, Event};

#[async_trait]
pub trait BlueprintStore: Send + Sync {
    /// Load every persisted blueprint. Returns an error only for a
    /// wholesale failure to reach the store; per-row decode failures
    /// should be skipped, not surfaced, so one corrupt row doesn't block
    /// startup load of the rest.
    async fn load_all_blueprints(&self) -> DomainResult<Vec<Blueprint>>;

    /// Load every persisted event, for startup replay.
    async fn load_all_events(&self) -> DomainResult<Vec<Event>>;

    /// Fetch a single blueprint by name.
    async fn get_by_name(&self, name: &str) -> DomainResult<Option<Blueprint>>;

    /// Persist (insert or overwrite) a blueprint.
    async fn save(&self, blueprint: &Blueprint) -> DomainResult<()>;

    /// Persist an event (best-effort; used for replay on restart).
    async fn save_event(&self, event: &Event) -> DomainResult<()>;
}
