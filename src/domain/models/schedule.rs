//! Schedule state machine: the live instance of a blueprint for one window.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use super::blueprint::{Blueprint, Node, NodeId, NodeKind};
use super::event::Event;

/// Lifecycle state of a live schedule.
///
/// `Waiting -> Running -> {Ended, Failed}`. `Ended` and `Failed` are
/// terminal and absorbing: once reached, no further `event_occurred` or
/// `evaluate` call changes the schedule's state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScheduleState {
    Waiting,
    Running,
    Ended,
    Failed,
}

impl ScheduleState {
    pub fn is_terminal(self) -> bool {
        matches!(self, ScheduleState::Ended | ScheduleState::Failed)
    }
}

/// Arrival bookkeeping for a single event-node within one window.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ArrivalRecord {
    pub arrived: bool,
    pub arrived_at: Option<DateTime<Utc>>,
}

/// The outcome of an `evaluate` call: the (possibly unchanged) state, and
/// any event-nodes whose deadline was newly missed this tick (used to
/// drive handler dispatch — see `services::dispatch`).
#[derive(Debug, Clone, Default)]
pub struct EvaluationOutcome {
    pub state: ScheduleState,
    pub newly_failed_nodes: Vec<NodeId>,
}

/// The live instance of a blueprint for one window.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Schedule {
    pub name: String,
    pub start_time: DateTime<Utc>,
    pub state: ScheduleState,
    /// A copy of the blueprint's node graph, fixed for this window.
    pub nodes: Vec<Node>,
    /// Per-node arrival records; append-only within one window.
    pub arrivals: HashMap<NodeId, ArrivalRecord>,
}

impl Schedule {
    /// Construct a fresh `Waiting` instance for `blueprint`'s current
    /// window, starting at `start_time` (already normalized — see
    /// `services::timing::normalize_start_time`).
    pub fn new(blueprint: &Blueprint, start_time: DateTime<Utc>) -> Self {
        let arrivals = blueprint
            .event_nodes()
            .map(|n| (n.id.clone(), ArrivalRecord::default()))
            .collect();
        Self {
            name: blueprint.name.clone(),
            start_time,
            state: ScheduleState::Waiting,
            nodes: blueprint.nodes.clone(),
            arrivals,
        }
    }

    /// The distinct event names this schedule's event-nodes reference.
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

    fn event_nodes(&self) -> impl Iterator<Item = &Node> {
        self.nodes.iter().filter(|n| n.is_event_node())
    }

    /// Deliver an event to this schedule.
    ///
    /// Fills the arrival record of the first (in graph order) unfilled
    /// event-node whose name matches `event.name`. A terminal schedule
    /// never mutates. Re-delivering a name after all matching nodes are
    /// filled is a no-op (saturation is idempotent).
    pub fn event_occurred(&mut self, event: &Event) {
        if self.state.is_terminal() {
            return;
        }

        let target_id = self.event_nodes().find_map(|node| {
            if node.event_name() == Some(event.name.as_str()) {
                let filled = self
                    .arrivals
                    .get(&node.id)
                    .is_some_and(|rec| rec.arrived);
                if !filled {
                    return Some(node.id.clone());
                }
            }
            None
        });

        let Some(target_id) = target_id else {
            return;
        };

        if let Some(record) = self.arrivals.get_mut(&target_id) {
            record.arrived = true;
            record.arrived_at = Some(event.received_at);
        }

        if self.state == ScheduleState::Waiting {
            self.state = ScheduleState::Running;
        }
    }

    /// Re-evaluate this schedule against wall-clock time `now`.
    ///
    /// Pure with respect to the schedule's current arrival map and `now`;
    /// does not consume events. A schedule whose `start_time` is still in
    /// the future is a no-op (the window hasn't opened). Time comparisons
    /// are whole-second and deadline boundaries are inclusive: arriving
    /// exactly on the deadline is on-time.
    pub fn evaluate(&mut self, now: DateTime<Utc>) -> EvaluationOutcome {
        if self.state.is_terminal() || now < self.start_time {
            return EvaluationOutcome {
                state: self.state,
                newly_failed_nodes: Vec::new(),
            };
        }

        let now = truncate_to_second(now);
        let start = truncate_to_second(self.start_time);

        let mut newly_failed = Vec::new();
        let mut all_arrived = true;

        for node in self.event_nodes() {
            let Some(deadline) = node.deadline() else {
                let arrived = self
                    .arrivals
                    .get(&node.id)
                    .is_some_and(|rec| rec.arrived);
                all_arrived &= arrived;
                continue;
            };

            let record = self.arrivals.get(&node.id).cloned().unwrap_or_default();
            let boundary = start + chrono::Duration::from_std(deadline).unwrap_or(chrono::Duration::MAX);

            if !record.arrived {
                all_arrived = false;
                if now > boundary {
                    newly_failed.push(node.id.clone());
                }
            } else if let Some(arrived_at) = record.arrived_at {
                let arrived_at = truncate_to_second(arrived_at);
                if arrived_at > boundary {
                    newly_failed.push(node.id.clone());
                }
            }
        }

        if !newly_failed.is_empty() {
            self.state = ScheduleState::Failed;
        } else if all_arrived {
            self.state = ScheduleState::Ended;
        }

        EvaluationOutcome {
            state: self.state,
            newly_failed_nodes: newly_failed,
        }
    }

    /// Force this schedule into `Failed`, used by the recurrence
    /// replacement policy when a non-terminal instance is still live at
    /// the next window boundary.
    pub fn force_failed(&mut self) {
        if !self.state.is_terminal() {
            self.state = ScheduleState::Failed;
        }
    }

    /// Handler-nodes reachable from the given (just-failed) event-node.
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
}

fn truncate_to_second(dt: DateTime<Utc>) -> DateTime<Utc> {
    DateTime::from_timestamp(dt.timestamp(), 0).unwrap_or(dt)
}

/// JSON-serializable snapshot of a live schedule: name, start time,
/// overall state, and per-node arrival status.
#[derive(Debug, Clone, Serialize)]
pub struct ScheduleSnapshot {
    pub name: String,
    pub start_time: DateTime<Utc>,
    pub state: ScheduleState,
    pub arrivals: HashMap<NodeId, ArrivalRecord>,
}

impl From<&Schedule> for ScheduleSnapshot {
    fn from(s: &Schedule) -> Self {
        Self {
            name: s.name.clone(),
            start_time: s.start_time,
            state: s.state,
            arrivals: s.arrivals.clone(),
        }
    }
}
