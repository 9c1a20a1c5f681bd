//! Effect capabilities: every observable change the engine can cause.
//!
//! Each capability is owned by a different subsystem of the host game
//! (inventory ledger, quest journal, cinematic coordinator, ...). The
//! engine only ever calls through this trait; it never touches session
//! state itself. Every method has a default, so hosts implement only the
//! capabilities they support:
//!
//! - direct effects default to no-ops,
//! - [`EffectHooks::take_item`] defaults to `false` (nothing removed),
//! - asynchronous effects default to [`Playback::Declined`], which makes the
//!   engine run the continuation immediately.
//!
//! Implementations are called from the single logical thread that owns
//! session state and use interior mutability for their own bookkeeping.
//! They may call back into the engine (for example by completing a
//! [`Completion`] synchronously).

use crate::continuation::{Completion, Playback};
use crate::types::{AudioCommand, EventReward};

/// The capability set the engine is constructed with.
#[allow(unused_variables)]
pub trait EffectHooks {
    // -- asynchronous ------------------------------------------------------

    /// Play a cinematic and fire `done` when it finishes.
    fn play_cinematic(&self, scene_id: &str, done: Completion) -> Playback {
        Playback::Declined
    }

    /// Run a system tutorial and fire `done` when it finishes.
    fn system_tutorial(
        &self,
        scene_id: Option<&str>,
        context: Option<&str>,
        done: Completion,
    ) -> Playback {
        Playback::Declined
    }

    // -- presentation ------------------------------------------------------

    /// Show narration text.
    fn show_message(&self, text: &str, tap_to_dismiss: bool) {}

    /// Present and apply a reward bundle.
    fn grant_reward(&self, reward: &EventReward) {}

    /// Issue an audio-layer command.
    fn audio(&self, command: &AudioCommand) {}

    // -- world -------------------------------------------------------------

    /// Set a room-state flag, or toggle it when `value` is `None`.
    fn set_room_state(&self, room_id: Option<&str>, state_key: &str, value: Option<bool>) {}

    /// Spawn an encounter.
    fn spawn_encounter(&self, encounter_id: Option<&str>, room_id: Option<&str>) {}

    /// Place items on the floor of a room.
    fn spawn_ground_item(&self, room_id: Option<&str>, item_id: &str, quantity: u32) {}

    /// Allow the player to search a room.
    fn unlock_room_search(&self, room_id: Option<&str>, note: Option<&str>) {}

    // -- inventory and progression -----------------------------------------

    /// Add items to the inventory.
    fn give_item(&self, item_id: &str, quantity: u32) {}

    /// Remove items if at least `quantity` are held; returns whether it did.
    ///
    /// The check and the removal happen together inside the capability.
    fn take_item(&self, item_id: &str, quantity: u32) -> bool {
        false
    }

    /// Grant experience.
    fn give_xp(&self, amount: i64) {}

    /// A party member joined.
    fn party_member_joined(&self, member_id: &str) {}

    // -- quests and milestones ---------------------------------------------

    /// Start a quest.
    fn start_quest(&self, quest_id: &str) {}

    /// Complete a quest.
    fn complete_quest(&self, quest_id: &str) {}

    /// Fail a quest.
    fn fail_quest(&self, quest_id: &str, reason: &str) {}

    /// Move a quest to a stage.
    fn advance_quest_stage(&self, quest_id: Option<&str>, stage_id: Option<&str>) {}

    /// Mark a quest task done.
    fn update_quest_task(&self, quest_id: Option<&str>, task_id: Option<&str>) {}

    /// Generic "quest state changed" notification for observers.
    fn quest_updated(&self) {}

    /// A milestone was set.
    fn milestone_set(&self, milestone_id: &str) {}

    // -- engine bookkeeping ------------------------------------------------

    /// An event produced an effect.
    fn event_completed(&self, event_id: &str) {}
}

/// Capability set with every default in place.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopHooks;

impl EffectHooks for NoopHooks {}
