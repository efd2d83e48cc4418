//! In-memory `BlueprintStore` test double, backed by a `Mutex`-guarded
//! `Vec` so tests can exercise round-tripping without a real database.

use std::sync::Mutex;

use async_trait::async_trait;
use deadline::domain::errors::DomainResult;
use deadline::domain::models::{Blueprint, Event};
use deadline::domain::ports::BlueprintStore;

#[derive(Default)]
pub struct InMemoryBlueprintStore {
    blueprints: Mutex<Vec<Blueprint>>,
    events: Mutex<Vec<Event>>,
}

impl InMemoryBlueprintStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl BlueprintStore for InMemoryBlueprintStore {
    async fn load_all_blueprints(&self) -> DomainResult<Vec<Blueprint>> {
        Ok(self.blueprints.lock().unwrap().clone())
    }

    async fn load_all_events(&self) -> DomainResult<Vec<Event>> {
        Ok(self.events.lock().unwrap().clone())
    }

    async fn get_by_name(&self, name: &str) -> DomainResult<Option<Blueprint>> {
        Ok(self
            .blueprints
            .lock()
            .unwrap()
            .iter()
            .find(|b| b.name == name)
            .cloned())
    }

    async fn save(&self, blueprint: &Blueprint) -> DomainResult<()> {
        let mut blueprints = self.blueprints.lock().unwrap();
        blueprints.retain(|b| b.name != blueprint.name);
        blueprints.push(blueprint.clone());
        Ok(())
    }

    async fn save_event(&self, event: &Event) -> DomainResult<()> {
        self.events.lock().unwrap().push(event.clone());
        Ok(())
    }
}
