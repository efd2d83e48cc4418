//! The schedule manager: singleton owner of the live schedule set, the
//! subscription index, the recurrence timers, and the evaluation loop.
//!
//! Constructed once per process behind an `Arc` and shared into the
//! HTTP layer. Every mutation of the schedule set and subscription
//! index goes through a single `tokio::sync::RwLock`; recurrence timers
//! are individually cancellable background tasks raced against a
//! `oneshot` receiver, and the evaluation loop is a ticking task gated
//! by an `AtomicBool` run flag.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use tokio::sync::{oneshot, Mutex as AsyncMutex, RwLock};
use tokio::task::JoinHandle;

use crate::domain::errors::{DomainError, DomainResult};
use crate::domain::models::{Blueprint, Event, Schedule, ScheduleSnapshot};
use crate::domain::ports::BlueprintStore;
use crate::services::dispatch::{dispatch_handlers, HandlerDispatcher};
use crate::services::subscription_index::SubscriptionIndex;
use crate::services::timing;

struct ManagerState {
    schedules: HashMap<String, Schedule>,
    /// Cached (blueprint, parsed timing) pairs, used by the recurrence
    /// timers without re-hitting the store.
    blueprints: HashMap<String, (Blueprint, Duration)>,
    index: SubscriptionIndex,
}

struct RecurrenceTimer {
    cancel: oneshot::Sender<()>,
    handle: JoinHandle<()>,
}

/// Tuning knobs for the manager's background loops.
#[derive(Debug, Clone)]
pub struct ManagerConfig {
    pub eval_interval: Duration,
}

impl Default for ManagerConfig {
    fn default() -> Self {
        Self {
            eval_interval: Duration::from_secs(60),
        }
    }
}

/// Owns the schedule set, subscription index, recurrence timers, and
/// evaluation ticker. Constructed once per process and shared via `Arc`.
pub struct ScheduleManager {
    state: RwLock<ManagerState>,
    store: Arc<dyn BlueprintStore>,
    dispatcher: Arc<dyn HandlerDispatcher>,
    config: ManagerConfig,
    recurrence_timers: AsyncMutex<HashMap<String, RecurrenceTimer>>,
    eval_running: Arc<AtomicBool>,
    eval_handle: AsyncMutex<Option<JoinHandle<()>>>,
}

impl ScheduleManager {
    pub fn new(
        store: Arc<dyn BlueprintStore>,
        dispatcher: Arc<dyn HandlerDispatcher>,
        config: ManagerConfig,
    ) -> Arc<Self> {
        Arc::new(Self {
            state: RwLock::new(ManagerState {
                schedules: HashMap::new(),
                blueprints: HashMap::new(),
                index: SubscriptionIndex::new(),
            }),
            store,
            dispatcher,
            config,
            recurrence_timers: AsyncMutex::new(HashMap::new()),
            eval_running: Arc::new(AtomicBool::new(false)),
            eval_handle: AsyncMutex::new(None),
        })
    }

    /// Startup load: load all blueprints, materialize a live schedule
    /// for each, then load all persisted events and replay them through
    /// the subscription index. One bad blueprint does not prevent
    /// others from loading; store errors are logged and tolerated.
    pub async fn start(self: &Arc<Self>) {
        tracing::info!(component = "manager", "loading all schedules");

        match self.store.load_all_blueprints().await {
            Ok(blueprints) => {
                for blueprint in blueprints {
                    let name = blueprint.name.clone();
                    if let Err(err) = self.install_blueprint(blueprint).await {
                        tracing::warn!(
                            component = "manager",
                            schedule_name = %name,
                            error = %err,
                            "didn't create schedule from blueprint because of error"
                        );
                    }
                }
            }
            Err(err) => {
                tracing::warn!(component = "manager", error = %err, "couldn't load any blueprints");
            }
        }

        match self.store.load_all_events().await {
            Ok(events) => {
                for event in events {
                    self.deliver(&event).await;
                }
            }
            Err(err) => {
                tracing::warn!(component = "manager", error = %err, "couldn't load any events");
            }
        }

        let total = self.state.read().await.schedules.len();
        tracing::info!(component = "manager", total, "schedule load complete");

        self.start_eval_loop().await;
    }

    /// Cancel the evaluation ticker and every armed recurrence timer,
    /// and await their completion.
    pub async fn stop(&self) {
        self.eval_running.store(false, Ordering::SeqCst);
        if let Some(handle) = self.eval_handle.lock().await.take() {
            handle.abort();
            let _ = handle.await;
        }

        let mut timers = self.recurrence_timers.lock().await;
        for (_, timer) in timers.drain() {
            let _ = timer.cancel.send(());
            let _ = timer.handle.await;
        }
    }

    /// Persist a blueprint and materialize a live schedule for it.
    /// Save-then-install: if the store rejects the blueprint, no
    /// in-memory schedule is created.
    pub async fn register_blueprint(self: &Arc<Self>, blueprint: Blueprint) -> DomainResult<()> {
        validate_blueprint(&blueprint)?;
        timing::parse_timing(&blueprint.timing)?;

        self.store.save(&blueprint).await?;
        self.install_blueprint(blueprint).await
    }

    /// Cancel the blueprint's recurrence timer and drop its live
    /// schedule (if any) from the schedule set and subscription index.
    /// The store's copy of the blueprint is untouched.
    pub async fn deregister_blueprint(&self, name: &str) -> bool {
        self.cancel_recurrence(name).await;

        let mut state = self.state.write().await;
        state.blueprints.remove(name);
        state.index.remove(name);
        state.schedules.remove(name).is_some()
    }

    pub async fn get_blueprint(&self, name: &str) -> DomainResult<Option<Blueprint>> {
        self.store.get_by_name(name).await
    }

    pub async fn get_schedule(&self, name: &str) -> Option<ScheduleSnapshot> {
        let state = self.state.read().await;
        state.schedules.get(name).map(ScheduleSnapshot::from)
    }

    /// Ingest a live event: persist it (best-effort) and route it to
    /// every currently-live schedule whose subscription set contains
    /// `event.name`. Unknown event names are silently dropped.
    pub async fn ingest(&self, event: Event) {
        if let Err(err) = self.store.save_event(&event).await {
            tracing::warn!(component = "manager", event_name = %event.name, error = %err, "failed to persist event");
        }
        self.deliver(&event).await;
    }

    async fn deliver(&self, event: &Event) {
        let mut state = self.state.write().await;
        let names: Vec<String> = state.index.subscribers(&event.name).to_vec();
        for name in names {
            if let Some(schedule) = state.schedules.get_mut(&name) {
                schedule.event_occurred(event);
            }
        }
    }

    /// Re-evaluate every live schedule against wall-clock time, under a
    /// single write-lock pass so the tick observes a consistent
    /// snapshot. Terminal results are purged from the schedule set and
    /// subscription index; newly-failed deadline nodes trigger handler
    /// dispatch.
    pub async fn evaluate_all(&self) {
        let now = Utc::now();
        let mut terminal = Vec::new();
        let mut dispatches: Vec<(Schedule, String)> = Vec::new();

        {
            let mut state = self.state.write().await;
            for (name, schedule) in state.schedules.iter_mut() {
                let outcome = schedule.evaluate(now);

                tracing::debug!(
                    component = "manager",
                    schedule_name = %name,
                    state = ?outcome.state,
                    start_time = %schedule.start_time,
                    "evaluated schedule"
                );

                for node_id in outcome.newly_failed_nodes {
                    dispatches.push((schedule.clone(), node_id));
                }
                if outcome.state.is_terminal() {
                    terminal.push(name.clone());
                }
            }

            for name in &terminal {
                state.schedules.remove(name);
                state.index.remove(name);
            }
        }

        for (schedule, node_id) in dispatches {
            dispatch_handlers(&schedule, &node_id, self.dispatcher.as_ref());
        }
    }

    /// Shared by startup load and `register_blueprint`: normalize the
    /// start time, materialize the schedule, insert it atomically with
    /// its subscription-index entries, and (re-)arm its recurrence
    /// timer.
    async fn install_blueprint(self: &Arc<Self>, blueprint: Blueprint) -> DomainResult<()> {
        let timing_dur = timing::parse_timing(&blueprint.timing)?;
        let now = Utc::now();
        let start = timing::normalize_start_time(blueprint.starts_at, timing_dur, now);
        let schedule = Schedule::new(&blueprint, start);

        {
            let mut state = self.state.write().await;
            if state.schedules.contains_key(&blueprint.name) {
                tracing::info!(
                    component = "manager",
                    schedule_name = %blueprint.name,
                    "overwriting existing live schedule for re-registered blueprint"
                );
                state.index.remove(&blueprint.name);
            }
            state.index.insert(&blueprint.name, &schedule.subscription_set());
            state
                .blueprints
                .insert(blueprint.name.clone(), (blueprint.clone(), timing_dur));
            state.schedules.insert(blueprint.name.clone(), schedule);
        }

        self.cancel_recurrence(&blueprint.name).await;
        let fire_at = timing::next_boundary(start, timing_dur);
        self.arm_recurrence(blueprint.name, timing_dur, fire_at).await;

        Ok(())
    }

    /// Arm a single recurrence timer for `name`, firing at `fire_at`.
    /// Cancellable via a oneshot channel stored alongside the task's
    /// `JoinHandle`.
    async fn arm_recurrence(self: &Arc<Self>, name: String, timing_dur: Duration, fire_at: DateTime<Utc>) {
        let delay = fire_at
            .signed_duration_since(Utc::now())
            .to_std()
            .unwrap_or(Duration::ZERO);

        let (cancel_tx, cancel_rx) = oneshot::channel();
        let manager = Arc::clone(self);
        let task_name = name.clone();

        let handle = tokio::spawn(async move {
            tokio::select! {
                () = tokio::time::sleep(delay) => {
                    manager.fire_recurrence(task_name).await;
                }
                _ = cancel_rx => {}
            }
        });

        self.recurrence_timers
            .lock()
            .await
            .insert(name, RecurrenceTimer { cancel: cancel_tx, handle });
    }

    async fn cancel_recurrence(&self, name: &str) {
        if let Some(timer) = self.recurrence_timers.lock().await.remove(name) {
            let _ = timer.cancel.send(());
            let _ = timer.handle.await;
        }
    }

    /// Recurrence boundary fired: force-fail any still-non-terminal
    /// previous instance, install a fresh `Waiting` instance for the
    /// next window, and re-arm the timer.
    async fn fire_recurrence(self: Arc<Self>, name: String) {
        let cached = {
            let state = self.state.read().await;
            state.blueprints.get(&name).cloned()
        };
        let Some((blueprint, timing_dur)) = cached else {
            return; // deregistered since this timer was armed
        };

        let new_start;
        {
            let mut state = self.state.write().await;
            let prev_start = state.schedules.get(&name).map(|s| s.start_time);

            if let Some(existing) = state.schedules.get_mut(&name) {
                if !existing.state.is_terminal() {
                    tracing::warn!(
                        component = "manager",
                        schedule_name = %name,
                        "recurrence boundary reached with non-terminal schedule; forcing failed"
                    );
                    existing.force_failed();
                }
            }
            state.index.remove(&name);

            new_start = prev_start
                .map(|s| timing::next_boundary(s, timing_dur))
                .unwrap_or_else(|| timing::normalize_start_time(blueprint.starts_at, timing_dur, Utc::now()));

            let fresh = Schedule::new(&blueprint, new_start);
            state.index.insert(&name, &fresh.subscription_set());
            state.schedules.insert(name.clone(), fresh);
        }

        let fire_at = timing::next_boundary(new_start, timing_dur);
        self.arm_recurrence(name, timing_dur, fire_at).await;
    }

    async fn start_eval_loop(self: &Arc<Self>) {
        self.eval_running.store(true, Ordering::SeqCst);

        let manager = Arc::clone(self);
        let running = Arc::clone(&self.eval_running);
        let interval = self.config.eval_interval;

        let handle = tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            ticker.tick().await; // consume the immediate first tick
            loop {
                ticker.tick().await;
                if !running.load(Ordering::SeqCst) {
                    break;
                }
                tracing::info!(component = "manager", "starting to evaluate schedules");
                manager.evaluate_all().await;
                tracing::info!(component = "manager", "completed evaluating schedules");
            }
        });

        *self.eval_handle.lock().await = Some(handle);
    }
}

fn validate_blueprint(blueprint: &Blueprint) -> DomainResult<()> {
    if blueprint.name.trim().is_empty() {
        return Err(DomainError::ValidationFailed("blueprint name is empty".to_string()));
    }
    if blueprint.nodes.is_empty() {
        return Err(DomainError::ValidationFailed(
            "blueprint has no nodes".to_string(),
        ));
    }

    let mut seen = std::collections::HashSet::new();
    for node in &blueprint.nodes {
        if !seen.insert(node.id.as_str()) {
            return Err(DomainError::ValidationFailed(format!(
                "duplicate node id: {}",
                node.id
            )));
        }
    }
    for node in &blueprint.nodes {
        for downstream in &node.downstream {
            if !blueprint.nodes.iter().any(|n| &n.id == downstream) {
                return Err(DomainError::ValidationFailed(format!(
                    "node {} references unknown downstream id {}",
                    node.id, downstream
                )));
            }
        }
    }

    Ok(())
}
