//! Process-wide mapping from event name to the ordered set of live
//! schedules that reference it.
//!
//! The index holds schedule *names*, not ownership — lookups resolve
//! into the manager's schedule map, so the index and the schedule set
//! never have to agree on a shared refcount. Insertion order is
//! preserved per bucket and is the event-delivery order for that name.

use std::collections::HashMap;

#[derive(Debug, Default)]
pub struct SubscriptionIndex {
    buckets: HashMap<String, Vec<String>>,
}

impl SubscriptionIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert `schedule_name` into every bucket it subscribes to. A
    /// no-op for names already present in a bucket, so a schedule never
    /// appears twice in the same bucket.
    pub fn insert(&mut self, schedule_name: &str, subscriptions: &[String]) {
        for event_name in subscriptions {
            let bucket = self.buckets.entry(event_name.clone()).or_default();
            if !bucket.iter().any(|n| n == schedule_name) {
                bucket.push(schedule_name.to_string());
            }
        }
    }

    /// Remove every occurrence of `schedule_name` from every bucket.
    /// Buckets left empty are dropped to keep the index from growing
    /// unboundedly with one-shot event names.
    pub fn remove(&mut self, schedule_name: &str) {
        self.buckets.retain(|_, names| {
            names.retain(|n| n != schedule_name);
            !names.is_empty()
        });
    }

    /// The ordered list of schedule names subscribed to `event_name`.
    pub fn subscribers(&self, event_name: &str) -> &[String] {
        self.buckets
            .get(event_name)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    #[cfg(test)]
    pub fn contains(&self, event_name: &str, schedule_name: &str) -> bool {
        self.subscribers(event_name).iter().any(|n| n == schedule_name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn insert_is_idempotent_per_bucket() {
        let mut idx = SubscriptionIndex::new();
        let subs = vec!["extract".to_string(), "load".to_string()];
        idx.insert("nightly-etl", &subs);
        idx.insert("nightly-etl", &subs);
        assert_eq!(idx.subscribers("extract"), &["nightly-etl".to_string()]);
        assert_eq!(idx.subscribers("load"), &["nightly-etl".to_string()]);
    }

    #[test]
    fn remove_purges_every_bucket() {
        let mut idx = SubscriptionIndex::new();
        idx.insert("a", &["x".to_string(), "y".to_string()]);
        idx.insert("b", &["x".to_string()]);
        idx.remove("x");
        assert!(!idx.contains("x", "a"));
        assert!(!idx.contains("x", "b"));
        assert_eq!(idx.subscribers("y"), &["a".to_string()]);
    }

    #[test]
    fn delivery_order_is_insertion_order() {
        let mut idx = SubscriptionIndex::new();
        idx.insert("first", &["ping".to_string()]);
        idx.insert("second", &["ping".to_string()]);
        assert_eq!(
            idx.subscribers("ping"),
            &["first".to_string(), "second".to_string()]
        );
    }
}
