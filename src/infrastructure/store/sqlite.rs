//! SQLite implementation of the `BlueprintStore` port.
//!
//! Blueprints are stored as their canonical XML encoding
//! (`infrastructure::xml_codec`) in a single TEXT column keyed by name —
//! the store is an opaque blob keeper, not a query engine over node/edge
//! structure.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::SqlitePool;

use crate::domain::errors::{DomainError, DomainResult};
use crate::domain::models::{Blueprint, Event};
use crate::domain::ports::BlueprintStore;
use crate::infrastructure::xml_codec;

#[derive(Clone)]
pub struct SqliteBlueprintStore {
    pool: SqlitePool,
}

impl SqliteBlueprintStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[derive(sqlx::FromRow)]
struct BlueprintRow {
    #[allow(dead_code)]
    name: String,
    xml: String,
}

#[derive(sqlx::FromRow)]
struct EventRow {
    name: String,
    payload: Option<String>,
    received_at: String,
}

fn row_to_event(row: EventRow) -> DomainResult<Event> {
    let payload = row
        .payload
        .map(|p| serde_json::from_str(&p))
        .transpose()?;
    let received_at = DateTime::parse_from_rfc3339(&row.received_at)
        .map_err(|e| DomainError::InternalInconsistency(format!("bad received_at: {e}")))?
        .with_timezone(&Utc);
    Ok(Event {
        name: row.name,
        payload,
        received_at,
    })
}

#[async_trait]
impl BlueprintStore for SqliteBlueprintStore {
    async fn load_all_blueprints(&self) -> DomainResult<Vec<Blueprint>> {
        let rows: Vec<BlueprintRow> = sqlx::query_as("SELECT name, xml FROM blueprints")
            .fetch_all(&self.pool)
            .await?;

        let mut blueprints = Vec::with_capacity(rows.len());
        for row in rows {
            match xml_codec::from_xml(&row.xml) {
                Ok(bp) => blueprints.push(bp),
                Err(err) => {
                    tracing::warn!(component = "store", blueprint = %row.name, error = %err, "skipping unparseable blueprint row");
                }
            }
        }
        Ok(blueprints)
    }

    async fn load_all_events(&self) -> DomainResult<Vec<Event>> {
        let rows: Vec<EventRow> =
            sqlx::query_as("SELECT name, payload, received_at FROM events ORDER BY id ASC")
                .fetch_all(&self.pool)
                .await?;

        let mut events = Vec::with_capacity(rows.len());
        for row in rows {
            let name = row.name.clone();
            match row_to_event(row) {
                Ok(event) => events.push(event),
                Err(err) => {
                    tracing::warn!(component = "store", event_name = %name, error = %err, "skipping unparseable event row");
                }
            }
        }
        Ok(events)
    }

    async fn get_by_name(&self, name: &str) -> DomainResult<Option<Blueprint>> {
        let row: Option<BlueprintRow> =
            sqlx::query_as("SELECT name, xml FROM blueprints WHERE name = ?")
                .bind(name)
                .fetch_optional(&self.pool)
                .await?;

        row.map(|r| xml_codec::from_xml(&r.xml)).transpose()
    }

    async fn save(&self, blueprint: &Blueprint) -> DomainResult<()> {
        let xml = xml_codec::to_xml(blueprint)?;
        sqlx::query(
            "INSERT INTO blueprints (name, xml, updated_at) VALUES (?1, ?2, ?3)
             ON CONFLICT(name) DO UPDATE SET xml = excluded.xml, updated_at = excluded.updated_at",
        )
        .bind(&blueprint.name)
        .bind(&xml)
        .bind(Utc::now().to_rfc3339())
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn save_event(&self, event: &Event) -> DomainResult<()> {
        let payload = event
            .payload
            .as_ref()
            .map(serde_json::to_string)
            .transpose()?;
        sqlx::query("INSERT INTO events (name, payload, received_at) VALUES (?1, ?2, ?3)")
            .bind(&event.name)
            .bind(&payload)
            .bind(event.received_at.to_rfc3339())
            .execute(&self.pool)
            .await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::models::{Node, NodeKind};
    use crate::infrastructure::store::connection;

    fn sample_blueprint(name: &str) -> Blueprint {
        Blueprint {
            name: name.to_string(),
            starts_at: Utc::now(),
            timing: "1h".to_string(),
            nodes: vec![Node {
                id: "extract".to_string(),
                kind: NodeKind::EventNode {
                    event_name: "extract".to_string(),
                    deadline: Some(std::time::Duration::from_secs(600)),
                },
                downstream: vec![],
            }],
        }
    }

    #[tokio::test]
    async fn save_and_load_round_trips() {
        let pool = connection::open_in_memory().await.expect("open");
        let store = SqliteBlueprintStore::new(pool);

        let bp = sample_blueprint("nightly-etl");
        store.save(&bp).await.expect("save");

        let loaded = store.get_by_name("nightly-etl").await.expect("get");
        assert_eq!(loaded, Some(bp));
    }

    #[tokio::test]
    async fn save_overwrites_existing_blueprint() {
        let pool = connection::open_in_memory().await.expect("open");
        let store = SqliteBlueprintStore::new(pool);

        let mut bp = sample_blueprint("nightly-etl");
        store.save(&bp).await.expect("save");

        bp.timing = "2h".to_string();
        store.save(&bp).await.expect("save again");

        let all = store.load_all_blueprints().await.expect("load all");
        assert_eq!(all.len(), 1);
        assert_eq!(all[0].timing, "2h");
    }

    #[tokio::test]
    async fn missing_blueprint_returns_none() {
        let pool = connection::open_in_memory().await.expect("open");
        let store = SqliteBlueprintStore::new(pool);
        assert_eq!(store.get_by_name("nope").await.expect("get"), None);
    }

    #[tokio::test]
    async fn events_persist_and_replay_in_order() {
        let pool = connection::open_in_memory().await.expect("open");
        let store = SqliteBlueprintStore::new(pool);

        let e1 = Event::new("extract", None);
        let e2 = Event::new("load", Some(serde_json::json!({"rows": 10})));
        store.save_event(&e1).await.expect("save e1");
        store.save_event(&e2).await.expect("save e2");

        let events = store.load_all_events().await.expect("load events");
        assert_eq!(events.len(), 2);
        assert_eq!(events[0].name, "extract");
        assert_eq!(events[1].name, "load");
        assert_eq!(events[1].payload, Some(serde_json::json!({"rows": 10})));
    }
}
