//! Handler-node dispatch.
//!
//! A handler-node is a terminal action descriptor invoked when the
//! schedule reaches an error-handled terminal state. No network
//! protocol is defined for the handler's `address`, so the production
//! dispatcher is a structured log record — a bounded, testable
//! stand-in rather than an invented network call.

use crate::domain::models::NodeKind;

pub trait HandlerDispatcher: Send + Sync {
    fn dispatch(&self, schedule_name: &str, handler_name: &str, handler_address: &str);
}

/// Logs a structured `error` record for each dispatch, with
/// `{component, schedule_name, handler_name, handler_address}` fields.
#[derive(Debug, Default)]
pub struct LoggingDispatcher;

impl HandlerDispatcher for LoggingDispatcher {
    fn dispatch(&self, schedule_name: &str, handler_name: &str, handler_address: &str) {
        tracing::error!(
            component = "dispatch",
            schedule_name,
            handler_name,
            handler_address,
            "handler invoked for failed schedule"
        );
    }
}

/// Dispatch every handler-node reachable from `node_id` in `schedule`'s
/// graph, via `dispatcher`.
pub fn dispatch_handlers(
    schedule: &crate::domain::models::Schedule,
    node_id: &str,
    dispatcher: &dyn HandlerDispatcher,
) {
    for handler in schedule.handlers_downstream_of(node_id) {
        if let NodeKind::HandlerNode { name, address } = &handler.kind {
            dispatcher.dispatch(&schedule.name, name, address);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::models::{Blueprint, Node, Schedule};
    use chrono::Utc;
    use std::sync::{Arc, Mutex};

    #[derive(Default)]
    struct RecordingDispatcher {
        calls: Arc<Mutex<Vec<(String, String, String)>>>,
    }

    impl HandlerDispatcher for RecordingDispatcher {
        fn dispatch(&self, schedule_name: &str, handler_name: &str, handler_address: &str) {
            self.calls.lock().unwrap().push((
                schedule_name.to_string(),
                handler_name.to_string(),
                handler_address.to_string(),
            ));
        }
    }

    #[test]
    fn dispatches_only_reachable_handlers() {
        let blueprint = Blueprint {
            name: "bp".to_string(),
            starts_at: Utc::now(),
            timing: "1h".to_string(),
            nodes: vec![
                Node {
                    id: "extract".to_string(),
                    kind: NodeKind::EventNode {
                        event_name: "extract".to_string(),
                        deadline: None,
                    },
                    downstream: vec!["on-fail".to_string()],
                },
                Node {
                    id: "on-fail".to_string(),
                    kind: NodeKind::HandlerNode {
                        name: "email".to_string(),
                        address: "ops@example.com".to_string(),
                    },
                    downstream: vec![],
                },
                Node {
                    id: "unrelated".to_string(),
                    kind: NodeKind::HandlerNode {
                        name: "sms".to_string(),
                        address: "+10000000000".to_string(),
                    },
                    downstream: vec![],
                },
            ],
        };
        let schedule = Schedule::new(&blueprint, Utc::now());

        let dispatcher = RecordingDispatcher::default();
        dispatch_handlers(&schedule, "extract", &dispatcher);

        let calls = dispatcher.calls.lock().unwrap();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0], ("bp".to_string(), "email".to_string(), "ops@example.com".to_string()));
    }
}
