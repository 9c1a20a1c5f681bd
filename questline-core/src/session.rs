//! Session state snapshot and the store it is read from.
//!
//! The engine never mutates session state directly. It reads one
//! [`GameSessionState`] per dispatch and routes every change through the
//! effect capabilities; the only write it performs itself is recording a
//! completed event via [`SessionStore::mark_event_completed`].

use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};

use crate::types::same_id;

/// Read-only view of save-game state for one evaluation.
///
/// A snapshot may go stale as soon as an effect mutates the underlying
/// store, so it must not be retained beyond the call it was read for.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameSessionState {
    /// Quests currently in progress.
    pub active_quests: HashSet<String>,
    /// Quests finished successfully.
    pub completed_quests: HashSet<String>,
    /// Quests that were failed.
    pub failed_quests: HashSet<String>,
    /// Current stage per quest.
    pub quest_stages: HashMap<String, String>,
    /// Completed task ids per quest.
    pub completed_tasks: HashMap<String, HashSet<String>>,
    /// Milestones that have been set.
    pub milestones: HashSet<String>,
    /// Tutorials completed or seen.
    pub tutorials: HashSet<String>,
    /// Inventory quantities by item id.
    pub inventory: HashMap<String, u32>,
    /// Ids of non-repeatable events that already fired.
    pub completed_events: HashSet<String>,
    /// Room the player is in.
    pub current_room: Option<String>,
}

impl GameSessionState {
    /// Quantity held of `item_id`, matching the key case-insensitively.
    #[must_use]
    pub fn item_quantity(&self, item_id: &str) -> u32 {
        if let Some(quantity) = self.inventory.get(item_id) {
            return *quantity;
        }
        self.inventory
            .iter()
            .filter(|(key, _)| same_id(key, item_id))
            .map(|(_, quantity)| *quantity)
            .max()
            .unwrap_or(0)
    }

    /// Current stage of `quest_id`, if any.
    #[must_use]
    pub fn quest_stage(&self, quest_id: &str) -> Option<&str> {
        self.quest_stages.get(quest_id).map(String::as_str)
    }

    /// Whether `task_id` of `quest_id` is done.
    #[must_use]
    pub fn task_done(&self, quest_id: &str, task_id: &str) -> bool {
        self.completed_tasks
            .get(quest_id)
            .is_some_and(|tasks| tasks.contains(task_id))
    }

    /// A quest is "not started" when it is neither active, completed nor failed.
    #[must_use]
    pub fn quest_not_started(&self, quest_id: &str) -> bool {
        !self.active_quests.contains(quest_id)
            && !self.completed_quests.contains(quest_id)
            && !self.failed_quests.contains(quest_id)
    }
}

/// Source of snapshots and sink for event completion records.
///
/// Implementations use interior mutability; the engine calls them from the
/// single logical thread that owns session state.
pub trait SessionStore {
    /// Read a fresh snapshot of the session.
    fn snapshot(&self) -> GameSessionState;

    /// Persist that a non-repeatable event has fired.
    fn mark_event_completed(&self, event_id: &str);

    /// Whether `event_id` has been recorded as fired.
    ///
    /// Reads through to live state, unlike an earlier snapshot.
    fn is_event_completed(&self, event_id: &str) -> bool {
        self.snapshot().completed_events.contains(event_id)
    }
}
