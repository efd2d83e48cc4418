//! Blueprint domain model: the declarative, persisted description of a
//! recurring schedule.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Stable identifier for a node, unique within its blueprint.
pub type NodeId = String;

/// A vertex of a blueprint's expected-event graph.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub enum NodeKind {
    /// Waits for an event with a specific name, with an optional
    /// per-node deadline expressed as an offset from schedule start.
    EventNode {
        event_name: String,
        deadline: Option<Duration>,
    },
    /// Terminal action descriptor, invoked when the schedule reaches an
    /// error-handled terminal state.
    HandlerNode { name: String, address: String },
}

/// A node in a blueprint's directed acyclic graph.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Node {
    pub id: NodeId,
    pub kind: NodeKind,
    /// Ordered ids of downstream neighbours.
    #[serde(default)]
    pub downstream: Vec<NodeId>,
}

impl Node {
    pub fn is_event_node(&self) -> bool {
        matches!(self.kind, NodeKind::EventNode { .. })
    }

    pub fn event_name(&self) -> Option<&str> {
        match &self.kind {
            NodeKind::EventNode { event_name, .. } => Some(event_name.as_str()),
            NodeKind::HandlerNode { .. } => None,
        }
    }

    pub fn deadline(&self) -> Option<Duration> {
        match &self.kind {
            NodeKind::EventNode { deadline, .. } => *deadline,
            NodeKind::HandlerNode { .. } => None,
        }
    }
}

/// Immutable declarative record describing a recurring schedule.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Blueprint {
    /// Unique name; names are unique across live schedules too.
    pub name: String,
    /// Absolute wall-clock timestamp (RFC3339) the first window opens at.
    pub starts_at: DateTime<Utc>,
    /// Recurrence cadence: a fixed alias (`minutely`, `hourly`, `daily`,
    /// `weekly`) or an explicit duration string (`15m`, `2h30m`).
    pub timing: String,
    /// Ordered node graph describing expected events and deadlines.
    pub nodes: Vec<Node>,
}

impl Blueprint {
    /// Event-nodes in graph order.
    pub fn event_nodes(&self) -> impl Iterator<Item = &Node> {
        self.nodes.iter().filter(|n| n.is_event_node())
    }

    /// Handler-nodes reachable (by one hop) from the given node id.
    pub fn handlers_downstream_of(&self, node_id: &str) -> Vec<&Node> {
        let Some(node) = self.nodes.iter().find(|n| n.id == node_id) else {
            return Vec::new();
        };
        node.downstream
            .iter()
            .filter_map(|id| self.nodes.iter().find(|n| &n.id == id))
            .filter(|n| matches!(n.kind, NodeKind::HandlerNode { .. }))
            .collect()
    }

    /// The distinct set of event names referenced by this blueprint's
    /// event-nodes — the schedule's subscription set.
    pub fn subscription_set(&self) -> Vec<String> {
        let mut names: Vec<String> = Vec::new();
        for node in self.event_nodes() {
            if let Some(name) = node.event_name() {
                if !names.iter().any(|n| n == name) {
                    names.push(name.to_string());
                }
            }
        }
        names
    }
}
