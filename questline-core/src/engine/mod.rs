//! Dispatch entry point: trigger → candidates → conditions → actions.
//!
//! The engine is logically single-threaded. [`NarrativeEngine`] is a cheap
//! `Rc` handle so continuations and re-entrant `player_action` dispatches
//! can reach it; it is neither `Send` nor `Sync`.
//!
//! ## Dispatch pipeline
//!
//! For each candidate of the trigger type, in catalog order:
//!
//! 1. skip if non-repeatable and already completed
//! 2. skip if its actions are already executing further up the stack
//! 3. skip if its conditions fail
//! 4. skip if its trigger does not match the payload
//! 5. interpret its actions; if any produced an effect, record completion
//!    and notify `event_completed`
//!
//! All candidates see the one snapshot read at the start of the dispatch.

mod interpreter;

use std::cell::{Cell, RefCell};
use std::rc::{Rc, Weak};

use tracing::{debug, debug_span, info, warn};

use crate::action::Action;
use crate::catalog::{Event, EventCatalog};
use crate::completion;
use crate::condition::Condition;
use crate::config::EngineConfig;
use crate::hooks::EffectHooks;
use crate::metrics::{spans, CounterSnapshot, EngineCounters};
use crate::session::{GameSessionState, SessionStore};
use crate::trigger;
use crate::types::EventPayload;

// ---------------------------------------------------------------------------
// Dispatch Report
// ---------------------------------------------------------------------------

/// What happened during one `handle_trigger` call.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DispatchReport {
    /// Trigger type as submitted.
    pub trigger_type: String,
    /// The depth guard refused the dispatch.
    pub refused: bool,
    /// Candidates looked at.
    pub considered: usize,
    /// Skipped as already completed.
    pub skipped_completed: usize,
    /// Skipped because they were already executing (re-entrant cycle).
    pub skipped_in_flight: usize,
    /// Rejected by their conditions.
    pub rejected_by_conditions: usize,
    /// Rejected by trigger matching.
    pub rejected_by_trigger: usize,
    /// Matched but produced no effect.
    pub no_effect: usize,
    /// Ids of events that fired, in order (blank ids included).
    pub fired: Vec<String>,
}

impl DispatchReport {
    fn new(trigger_type: &str) -> Self {
        Self {
            trigger_type: trigger_type.to_string(),
            ..Self::default()
        }
    }

    /// Whether at least one event fired.
    #[must_use]
    pub fn any_fired(&self) -> bool {
        !self.fired.is_empty()
    }
}

// ---------------------------------------------------------------------------
// Engine
// ---------------------------------------------------------------------------

struct EngineInner {
    catalog: EventCatalog,
    hooks: Rc<dyn EffectHooks>,
    store: Rc<dyn SessionStore>,
    config: EngineConfig,
    counters: EngineCounters,
    depth: Cell<u32>,
    in_flight: RefCell<Vec<usize>>,
}

/// The narrative rule engine.
#[derive(Clone)]
pub struct NarrativeEngine {
    inner: Rc<EngineInner>,
}

/// Non-owning engine handle held by pending continuations.
#[derive(Clone)]
pub struct WeakEngine {
    inner: Weak<EngineInner>,
}

impl WeakEngine {
    /// The engine, if it is still alive.
    #[must_use]
    pub fn upgrade(&self) -> Option<NarrativeEngine> {
        self.inner.upgrade().map(|inner| NarrativeEngine { inner })
    }
}

impl std::fmt::Debug for NarrativeEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NarrativeEngine")
            .field("events", &self.inner.catalog.len())
            .field("depth", &self.inner.depth.get())
            .field("config", &self.inner.config)
            .finish_non_exhaustive()
    }
}

impl NarrativeEngine {
    /// Build an engine over a loaded catalog.
    ///
    /// Authored events carrying unknown type strings are reported once here
    /// when `diagnostics.warn_unknown_types` is set.
    pub fn new(
        catalog: EventCatalog,
        hooks: Rc<dyn EffectHooks>,
        store: Rc<dyn SessionStore>,
        config: EngineConfig,
    ) -> Self {
        if config.diagnostics.warn_unknown_types {
            for event in catalog.iter() {
                let unknown = event.unknown_types();
                if !unknown.is_empty() {
                    warn!(event = %event.id, ?unknown, "Event uses unknown types");
                }
            }
        }
        Self {
            inner: Rc::new(EngineInner {
                catalog,
                hooks,
                store,
                config,
                counters: EngineCounters::new(),
                depth: Cell::new(0),
                in_flight: RefCell::new(Vec::new()),
            }),
        }
    }

    /// The loaded catalog.
    #[must_use]
    pub fn catalog(&self) -> &EventCatalog {
        &self.inner.catalog
    }

    /// Active configuration.
    #[must_use]
    pub fn config(&self) -> &EngineConfig {
        &self.inner.config
    }

    /// Current counter values.
    #[must_use]
    pub fn counters(&self) -> CounterSnapshot {
        self.inner.counters.snapshot()
    }

    /// A handle that does not keep the engine alive.
    #[must_use]
    pub fn downgrade(&self) -> WeakEngine {
        WeakEngine {
            inner: Rc::downgrade(&self.inner),
        }
    }

    /// Dispatch an occurrence to every candidate event of `trigger_type`.
    pub fn handle_trigger(&self, trigger_type: &str, payload: &EventPayload) -> DispatchReport {
        let inner = &self.inner;
        let depth = inner.depth.get();
        if depth >= inner.config.dispatch.max_depth {
            EngineCounters::bump(&inner.counters.depth_limit_hits);
            warn!(
                trigger = trigger_type,
                depth,
                max_depth = inner.config.dispatch.max_depth,
                "Dispatch depth limit reached; trigger ignored"
            );
            return DispatchReport {
                refused: true,
                ..DispatchReport::new(trigger_type)
            };
        }

        let _depth = DepthGuard::enter(&inner.depth);
        let span = debug_span!(
            spans::DISPATCH,
            trigger = trigger_type,
            payload = payload.kind(),
            depth
        );
        let _entered = span.enter();
        EngineCounters::bump(&inner.counters.dispatches);

        let state = inner.store.snapshot();
        let mut report = DispatchReport::new(trigger_type);
        let mut ran_actions = false;

        for &index in inner.catalog.candidate_indices(trigger_type) {
            let event = inner.catalog.event_at(index);
            report.considered += 1;

            if completion::is_completed(event, &state) {
                self.trace_skip(event, "already completed");
                report.skipped_completed += 1;
                continue;
            }
            if inner.in_flight.borrow().contains(&index) {
                EngineCounters::bump(&inner.counters.cycles_skipped);
                warn!(
                    event = %event.id,
                    trigger = trigger_type,
                    "Event re-entered itself; skipped"
                );
                report.skipped_in_flight += 1;
                continue;
            }
            if !self.conditions_hold(event, &state) {
                self.trace_skip(event, "conditions failed");
                report.rejected_by_conditions += 1;
                continue;
            }
            if !self.trigger_matches(event, payload, &state) {
                self.trace_skip(event, "trigger mismatch");
                report.rejected_by_trigger += 1;
                continue;
            }

            if ran_actions && completion::is_recorded(event, inner.store.as_ref()) {
                self.trace_skip(event, "completed by a nested dispatch");
                report.skipped_completed += 1;
                continue;
            }

            let produced = {
                let _flight = FlightGuard::enter(&inner.in_flight, index);
                self.execute(&event.actions, &state)
            };
            ran_actions = true;
            if !produced {
                self.trace_skip(event, "no effect");
                report.no_effect += 1;
                continue;
            }

            completion::record(event, inner.store.as_ref());
            if event.has_id() {
                inner.hooks.event_completed(&event.id);
            }
            EngineCounters::bump(&inner.counters.events_fired);
            info!(
                event = %event.id,
                trigger = trigger_type,
                repeatable = event.repeatable,
                "Story event fired"
            );
            report.fired.push(event.id.clone());
        }

        report
    }

    /// Run an action list against current state, outside trigger matching.
    ///
    /// Returns whether any action produced an effect. Nothing is marked
    /// completed.
    pub fn perform_actions(&self, actions: &[Action]) -> bool {
        let span = debug_span!(spans::PERFORM, actions = actions.len());
        let _entered = span.enter();
        let state = self.inner.store.snapshot();
        self.execute(actions, &state)
    }

    /// Interpret `actions` in order against `state`.
    ///
    /// Every action runs; the result is the OR of their individual results.
    pub fn execute(&self, actions: &[Action], state: &GameSessionState) -> bool {
        actions
            .iter()
            .fold(false, |produced, action| self.run_action(action, state) | produced)
    }

    fn conditions_hold(&self, event: &Event, state: &GameSessionState) -> bool {
        event
            .conditions
            .iter()
            .all(|condition| self.condition_holds(condition, state))
    }

    /// Evaluate one condition, applying the unknown-type policy.
    fn condition_holds(&self, condition: &Condition, state: &GameSessionState) -> bool {
        match condition.evaluate(state) {
            Some(verdict) => verdict,
            None => {
                let policy = self.inner.config.dispatch.unknown_conditions;
                self.note_unknown("condition", condition_kind(condition), policy.verdict());
                policy.verdict()
            }
        }
    }

    fn trigger_matches(
        &self,
        event: &Event,
        payload: &EventPayload,
        state: &GameSessionState,
    ) -> bool {
        let policy = self.inner.config.dispatch.unknown_triggers;
        if let trigger::TriggerKind::Other(kind) = &event.trigger.kind {
            self.note_unknown("trigger", kind, policy.verdict());
        }
        trigger::matches_with(&event.trigger, payload, state, policy)
    }

    fn note_unknown(&self, what: &str, kind: &str, verdict: bool) {
        EngineCounters::bump(&self.inner.counters.unknown_evaluations);
        debug!(what, kind, verdict, "Unknown type evaluated by policy");
    }

    fn trace_skip(&self, event: &Event, reason: &str) {
        if self.inner.config.diagnostics.trace_dispatch {
            debug!(event = %event.id, reason, "Candidate skipped");
        }
    }
}

fn condition_kind(condition: &Condition) -> &str {
    match condition {
        Condition::Unknown(kind) => kind,
        _ => "known",
    }
}

// ---------------------------------------------------------------------------
// Re-entrancy guards
// ---------------------------------------------------------------------------

/// Increments the dispatch depth for its lifetime.
struct DepthGuard<'a>(&'a Cell<u32>);

impl<'a> DepthGuard<'a> {
    fn enter(depth: &'a Cell<u32>) -> Self {
        depth.set(depth.get() + 1);
        Self(depth)
    }
}

impl Drop for DepthGuard<'_> {
    fn drop(&mut self) {
        self.0.set(self.0.get().saturating_sub(1));
    }
}

/// Marks a catalog event as executing for its lifetime.
struct FlightGuard<'a> {
    in_flight: &'a RefCell<Vec<usize>>,
    index: usize,
}

impl<'a> FlightGuard<'a> {
    fn enter(in_flight: &'a RefCell<Vec<usize>>, index: usize) -> Self {
        in_flight.borrow_mut().push(index);
        Self { in_flight, index }
    }
}

impl Drop for FlightGuard<'_> {
    fn drop(&mut self) {
        let mut in_flight = self.in_flight.borrow_mut();
        if let Some(pos) = in_flight.iter().rposition(|&i| i == self.index) {
            in_flight.remove(pos);
        }
    }
}
