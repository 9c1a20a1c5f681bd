//! Runtime counters and tracing span names.
//!
//! Counters are plain atomics bumped on the dispatch path and read on
//! demand (debug overlays, authoring tools, tests).

use std::sync::atomic::{AtomicU64, Ordering};

// ---------------------------------------------------------------------------
// Counters
// ---------------------------------------------------------------------------

/// Monotonic counters for one engine instance.
#[derive(Debug)]
pub struct EngineCounters {
    /// `handle_trigger` calls that passed the depth guard.
    pub dispatches: AtomicU64,
    /// Events whose actions produced an effect.
    pub events_fired: AtomicU64,
    /// Individual actions interpreted, including nested ones.
    pub actions_executed: AtomicU64,
    /// Continuations resumed after an asynchronous effect.
    pub continuations_resumed: AtomicU64,
    /// Dispatches refused by the depth guard.
    pub depth_limit_hits: AtomicU64,
    /// Candidates skipped because they were already executing.
    pub cycles_skipped: AtomicU64,
    /// Unknown trigger or condition types evaluated.
    pub unknown_evaluations: AtomicU64,
}

impl EngineCounters {
    /// Create a new set of zeroed counters.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            dispatches: AtomicU64::new(0),
            events_fired: AtomicU64::new(0),
            actions_executed: AtomicU64::new(0),
            continuations_resumed: AtomicU64::new(0),
            depth_limit_hits: AtomicU64::new(0),
            cycles_skipped: AtomicU64::new(0),
            unknown_evaluations: AtomicU64::new(0),
        }
    }

    /// Add one to `counter`.
    pub(crate) fn bump(counter: &AtomicU64) {
        counter.fetch_add(1, Ordering::Relaxed);
    }

    /// Snapshot all counters.
    #[must_use]
    pub fn snapshot(&self) -> CounterSnapshot {
        CounterSnapshot {
            dispatches: self.dispatches.load(Ordering::Relaxed),
            events_fired: self.events_fired.load(Ordering::Relaxed),
            actions_executed: self.actions_executed.load(Ordering::Relaxed),
            continuations_resumed: self.continuations_resumed.load(Ordering::Relaxed),
            depth_limit_hits: self.depth_limit_hits.load(Ordering::Relaxed),
            cycles_skipped: self.cycles_skipped.load(Ordering::Relaxed),
            unknown_evaluations: self.unknown_evaluations.load(Ordering::Relaxed),
        }
    }
}

impl Default for EngineCounters {
    fn default() -> Self {
        Self::new()
    }
}

/// A snapshot of counter values at a point in time.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CounterSnapshot {
    /// Dispatches processed.
    pub dispatches: u64,
    /// Events fired.
    pub events_fired: u64,
    /// Actions interpreted.
    pub actions_executed: u64,
    /// Continuations resumed.
    pub continuations_resumed: u64,
    /// Depth-guard refusals.
    pub depth_limit_hits: u64,
    /// Re-entrant cycles skipped.
    pub cycles_skipped: u64,
    /// Unknown types evaluated.
    pub unknown_evaluations: u64,
}

// ---------------------------------------------------------------------------
// Tracing Span Names
// ---------------------------------------------------------------------------

/// Span names used with `tracing::span!`.
pub mod spans {
    /// One `handle_trigger` call.
    pub const DISPATCH: &str = "questline::dispatch";
    /// One `perform_actions` call.
    pub const PERFORM: &str = "questline::perform";
    /// A resumed continuation.
    pub const CONTINUATION: &str = "questline::continuation";
}
