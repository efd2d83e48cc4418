//! Domain models: the data shapes the core operates on.

pub mod blueprint;
pub mod config;
pub mod event;
pub mod schedule;

pub use blueprint::{Blueprint, Node, NodeId, NodeKind};
pub use config::Config;
pub use event::Event;
pub use schedule::{ArrivalRecord, EvaluationOutcome, Schedule, ScheduleSnapshot, ScheduleState};
