//! Completion Tracker: which non-repeatable events have already fired.
//!
//! The record lives in the session store; the snapshot carries it back as
//! `completed_events`. Repeatable events and events with a blank id are
//! never recorded.

use crate::catalog::Event;
use crate::session::{GameSessionState, SessionStore};

/// Whether `event` must be skipped because it already fired.
#[must_use]
pub fn is_completed(event: &Event, state: &GameSessionState) -> bool {
    !event.repeatable && event.has_id() && state.completed_events.contains(&event.id)
}

/// Like [`is_completed`], but asks the store for its live record.
///
/// Needed once a dispatch has run actions: nested dispatches may have
/// recorded events since the dispatch snapshot was read.
#[must_use]
pub fn is_recorded(event: &Event, store: &dyn SessionStore) -> bool {
    !event.repeatable && event.has_id() && store.is_event_completed(&event.id)
}

/// Record that `event` fired; returns whether anything was written.
pub fn record(event: &Event, store: &dyn SessionStore) -> bool {
    if event.repeatable || !event.has_id() {
        return false;
    }
    store.mark_event_completed(&event.id);
    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::trigger::Trigger;
    use std::cell::RefCell;

    #[derive(Default)]
    struct Store(RefCell<GameSessionState>);

    impl SessionStore for Store {
        fn snapshot(&self) -> GameSessionState {
            self.0.borrow().clone()
        }

        fn mark_event_completed(&self, event_id: &str) {
            self.0.borrow_mut().completed_events.insert(event_id.to_string());
        }
    }

    fn event(id: &str, repeatable: bool) -> Event {
        Event {
            id: id.to_string(),
            trigger: Trigger::of_type("talk_to"),
            conditions: vec![],
            actions: vec![],
            repeatable,
        }
    }

    #[test]
    fn records_only_non_repeatable_named_events() {
        let store = Store::default();
        assert!(record(&event("once", false), &store));
        assert!(!record(&event("again", true), &store));
        assert!(!record(&event("  ", false), &store));

        let state = store.snapshot();
        assert!(is_completed(&event("once", false), &state));
        assert!(!is_completed(&event("again", true), &state));
        assert_eq!(state.completed_events.len(), 1);
    }

    #[test]
    fn live_record_is_seen_after_the_snapshot_was_taken() {
        let store = Store::default();
        let before = store.snapshot();
        record(&event("once", false), &store);

        assert!(!is_completed(&event("once", false), &before));
        assert!(is_recorded(&event("once", false), &store));
        assert!(!is_recorded(&event("once", true), &store));
        assert!(!is_recorded(&event("", false), &store));
    }

    #[test]
    fn repeatable_is_never_completed_even_if_recorded() {
        let mut state = GameSessionState::default();
        state.completed_events.insert("x".into());
        assert!(!is_completed(&event("x", true), &state));
        assert!(is_completed(&event("x", false), &state));
    }
}
