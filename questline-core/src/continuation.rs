//! Single-use completion tokens for asynchronous effects.
//!
//! A cinematic or system tutorial may finish arbitrarily later than the
//! dispatch that requested it. The engine hands the capability a
//! [`Completion`]; firing it resumes interpretation of the action's
//! `onComplete` list. The token's shared state moves `Pending → Resumed`
//! exactly once, so duplicate callbacks are ignored no matter how the host
//! stores or copies the callback.

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use tracing::debug;

/// Whether an asynchronous capability took ownership of the effect.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Playback {
    /// The effect started; the capability will fire the completion later.
    Started,
    /// The capability declined; the engine resumes immediately.
    Declined,
}

enum ContinuationState {
    Pending(Box<dyn FnOnce()>),
    Resumed,
}

type SharedState = Rc<RefCell<ContinuationState>>;

/// Move the state to `Resumed` and run the continuation if it was pending.
///
/// Returns `false` for a duplicate resume.
fn resume_once(state: &SharedState, label: &str) -> bool {
    let previous = std::mem::replace(&mut *state.borrow_mut(), ContinuationState::Resumed);
    match previous {
        ContinuationState::Pending(resume) => {
            resume();
            true
        }
        ContinuationState::Resumed => {
            debug!(scene = label, "Ignoring duplicate completion");
            false
        }
    }
}

/// Single-use token that resumes a suspended action list.
///
/// Not `Clone`: completing consumes it. Hosts whose APIs demand a reusable
/// callback can use [`Completion::into_callback`].
pub struct Completion {
    state: SharedState,
    label: String,
}

impl Completion {
    /// Wrap `resume` in a pending token labelled for diagnostics.
    pub fn new(label: impl Into<String>, resume: impl FnOnce() + 'static) -> Self {
        Self {
            state: Rc::new(RefCell::new(ContinuationState::Pending(Box::new(resume)))),
            label: label.into(),
        }
    }

    /// Resume the continuation.
    pub fn complete(self) {
        resume_once(&self.state, &self.label);
    }

    /// Convert into a callback that resumes on its first invocation only.
    pub fn into_callback(self) -> impl Fn() + 'static {
        let Self { state, label } = self;
        move || {
            resume_once(&state, &label);
        }
    }

    /// Whether the continuation has not run yet.
    #[must_use]
    pub fn is_pending(&self) -> bool {
        matches!(*self.state.borrow(), ContinuationState::Pending(_))
    }

    /// The scene or context this completion belongs to.
    #[must_use]
    pub fn label(&self) -> &str {
        &self.label
    }

    /// Engine-side handle used when the capability declines.
    pub(crate) fn guard(&self) -> ResumeGuard {
        ResumeGuard {
            state: Rc::clone(&self.state),
            label: self.label.clone(),
        }
    }
}

impl fmt::Debug for Completion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Completion")
            .field("label", &self.label)
            .field("pending", &self.is_pending())
            .finish()
    }
}

/// Second handle onto a completion's state, kept by the engine.
pub(crate) struct ResumeGuard {
    state: SharedState,
    label: String,
}

impl ResumeGuard {
    /// Resume unless the capability already did.
    pub(crate) fn resume(&self) -> bool {
        resume_once(&self.state, &self.label)
    }
}
