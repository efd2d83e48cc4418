//! Property-based checks: start-time normalization idempotence,
//! delivery idempotence on saturated nodes, and state monotonicity.

use chrono::{DateTime, Duration as ChronoDuration, Utc};
use deadline::domain::models::{Event, Node, NodeKind, Schedule, ScheduleState};
use deadline::services::timing::normalize_start_time;
use proptest::prelude::*;
use std::time::Duration as StdDuration;

fn epoch_plus(seconds: i64) -> DateTime<Utc> {
    DateTime::from_timestamp(1_700_000_000, 0).unwrap() + ChronoDuration::seconds(seconds)
}

proptest! {
    #[test]
    fn normalization_is_idempotent(
        start_offset in -5_000_000i64..5_000_000i64,
        timing_secs in 1u64..100_000u64,
        now_offset in 0i64..5_000_000i64,
    ) {
        let starts_at = epoch_plus(start_offset);
        let now = epoch_plus(now_offset);
        let timing = StdDuration::from_secs(timing_secs);

        let once = normalize_start_time(starts_at, timing, now);
        let twice = normalize_start_time(once, timing, now);
        prop_assert_eq!(once, twice);
    }

    #[test]
    fn normalized_start_never_exceeds_now(
        start_offset in -5_000_000i64..5_000_000i64,
        timing_secs in 1u64..100_000u64,
        now_offset in 0i64..5_000_000i64,
    ) {
        let starts_at = epoch_plus(start_offset);
        let now = epoch_plus(now_offset);
        let timing = StdDuration::from_secs(timing_secs);

        let normalized = normalize_start_time(starts_at, timing, now);
        prop_assert!(normalized <= now || normalized == starts_at);
    }

    #[test]
    fn redelivery_after_saturation_is_a_no_op(deliveries in 2usize..8usize) {
        let start = epoch_plus(0);
        let blueprint_node = Node {
            id: "n".to_string(),
            kind: NodeKind::EventNode { event_name: "ping".to_string(), deadline: None },
            downstream: vec![],
        };
        let blueprint = deadline::domain::models::Blueprint {
            name: "b".to_string(),
            starts_at: start,
            timing: "1h".to_string(),
            nodes: vec![blueprint_node],
        };
        let mut schedule = Schedule::new(&blueprint, start);

        for _ in 0..deliveries {
            schedule.event_occurred(&Event::new("ping", None));
        }

        let record = schedule.arrivals.get("n").cloned().unwrap();
        prop_assert!(record.arrived);

        let first_arrived_at = record.arrived_at;
        schedule.event_occurred(&Event::new("ping", None));
        prop_assert_eq!(schedule.arrivals.get("n").unwrap().arrived_at, first_arrived_at);
    }

    #[test]
    fn state_never_moves_backward(evaluations in 1usize..20usize) {
        let start = epoch_plus(0);
        let node = Node {
            id: "n".to_string(),
            kind: NodeKind::EventNode {
                event_name: "ping".to_string(),
                deadline: Some(StdDuration::from_secs(10)),
            },
            downstream: vec![],
        };
        let blueprint = deadline::domain::models::Blueprint {
            name: "b".to_string(),
            starts_at: start,
            timing: "1h".to_string(),
            nodes: vec![node],
        };
        let mut schedule = Schedule::new(&blueprint, start);

        let mut seen_running = false;
        let mut seen_terminal = false;
        for i in 0..evaluations {
            if i == evaluations / 2 {
                schedule.event_occurred(&Event::new("ping", None));
            }
            let outcome = schedule.evaluate(start + ChronoDuration::seconds(i as i64));

            if outcome.state == ScheduleState::Running {
                seen_running = true;
            }
            if outcome.state.is_terminal() {
                prop_assert!(!seen_terminal || outcome.state == schedule.state);
                seen_terminal = true;
            } else if seen_terminal {
                prop_assert!(false, "state regressed out of a terminal state");
            }
            let _ = seen_running;
        }
    }
}
