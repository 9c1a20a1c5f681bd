//! In-memory save game that the engine reads from and writes to.
//!
//! [`LocalSession`] is both the [`SessionStore`] and the [`EffectHooks`]
//! of a single-player session: every capability call is applied straight to
//! the session state or to the [`Progress`] ledger. Cinematics and system
//! tutorials are parked until the host calls
//! [`LocalSession::finish_next_scene`], unless the session was built with
//! [`LocalSession::auto_completing`].

use std::cell::RefCell;
use std::collections::{HashMap, HashSet, VecDeque};

use questline_core::types::{same_id, AudioCommand, EventReward};
use questline_core::{Completion, EffectHooks, GameSessionState, Playback, SessionStore};
use tracing::{debug, info};

// ---------------------------------------------------------------------------
// Progress Ledger
// ---------------------------------------------------------------------------

/// A line of narration shown to the player.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShownMessage {
    /// Narration text.
    pub text: String,
    /// Whether it waited for a tap.
    pub tap_to_dismiss: bool,
}

/// Items lying on the floor of a room.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GroundItem {
    /// Room the items were placed in; `None` if no room was known.
    pub room_id: Option<String>,
    /// Item id.
    pub item_id: String,
    /// Quantity.
    pub quantity: u32,
}

/// Everything the session tracks outside [`GameSessionState`].
#[derive(Debug, Clone, Default)]
pub struct Progress {
    /// Experience earned.
    pub xp: i64,
    /// Credits earned.
    pub credits: i64,
    /// Ability points earned.
    pub ap: i64,
    /// Party members, in join order.
    pub party: Vec<String>,
    /// Room flags keyed by `(room, state key)`.
    pub room_flags: HashMap<(String, String), bool>,
    /// Rooms the player may now search.
    pub searchable_rooms: HashSet<String>,
    /// Encounters spawned, as `(encounter, room)`.
    pub encounters: Vec<(Option<String>, Option<String>)>,
    /// Items placed on the floor.
    pub ground_items: Vec<GroundItem>,
    /// Narration in display order.
    pub messages: Vec<ShownMessage>,
    /// Audio commands in issue order.
    pub audio: Vec<AudioCommand>,
    /// Quest-updated notifications received.
    pub quest_updates: u32,
    /// Failure reasons per quest.
    pub failure_reasons: HashMap<String, String>,
}

impl Progress {
    /// Current value of a room flag; unset flags read as `false`.
    #[must_use]
    pub fn room_flag(&self, room_id: &str, state_key: &str) -> bool {
        self.room_flags
            .get(&(room_id.to_string(), state_key.to_string()))
            .copied()
            .unwrap_or(false)
    }
}

// ---------------------------------------------------------------------------
// Pending Scenes
// ---------------------------------------------------------------------------

/// What kind of asynchronous effect is waiting.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SceneKind {
    /// A cinematic cutscene.
    Cinematic,
    /// A system tutorial overlay.
    Tutorial,
}

struct PendingScene {
    kind: SceneKind,
    tutorial_id: Option<String>,
    done: Completion,
}

// ---------------------------------------------------------------------------
// Local Session
// ---------------------------------------------------------------------------

/// Single-player session state plus the effects that mutate it.
#[derive(Default)]
pub struct LocalSession {
    state: RefCell<GameSessionState>,
    progress: RefCell<Progress>,
    scenes: RefCell<VecDeque<PendingScene>>,
    auto_complete_scenes: bool,
}

impl LocalSession {
    /// Fresh session.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Session resumed from a saved state.
    #[must_use]
    pub fn with_state(state: GameSessionState) -> Self {
        Self {
            state: RefCell::new(state),
            ..Self::default()
        }
    }

    /// Finish every cinematic and tutorial as soon as it is requested.
    #[must_use]
    pub fn auto_completing(mut self) -> Self {
        self.auto_complete_scenes = true;
        self
    }

    /// Copy of the current session state.
    #[must_use]
    pub fn state(&self) -> GameSessionState {
        self.state.borrow().clone()
    }

    /// Copy of the progress ledger.
    #[must_use]
    pub fn progress(&self) -> Progress {
        self.progress.borrow().clone()
    }

    /// Mutate session state directly, as a save loader or debug console would.
    pub fn update_state(&self, apply: impl FnOnce(&mut GameSessionState)) {
        apply(&mut self.state.borrow_mut());
    }

    /// Record the room the player stands in.
    pub fn set_current_room(&self, room_id: &str) {
        self.state.borrow_mut().current_room = Some(room_id.to_string());
    }

    /// Number of cinematics and tutorials waiting to finish.
    #[must_use]
    pub fn pending_scenes(&self) -> usize {
        self.scenes.borrow().len()
    }

    /// Finish the oldest waiting scene and resume its continuation.
    ///
    /// Returns the scene's kind and label, or `None` if nothing was waiting.
    pub fn finish_next_scene(&self) -> Option<(SceneKind, String)> {
        let scene = self.scenes.borrow_mut().pop_front()?;
        Some(self.finish(scene))
    }

    fn finish(&self, scene: PendingScene) -> (SceneKind, String) {
        if let Some(tutorial) = &scene.tutorial_id {
            self.state.borrow_mut().tutorials.insert(tutorial.clone());
        }
        let label = scene.done.label().to_string();
        debug!(kind = ?scene.kind, scene = %label, "Scene finished");
        scene.done.complete();
        (scene.kind, label)
    }

    fn request_scene(
        &self,
        kind: SceneKind,
        tutorial_id: Option<&str>,
        done: Completion,
    ) -> Playback {
        let scene = PendingScene {
            kind,
            tutorial_id: tutorial_id.map(str::to_string),
            done,
        };
        if self.auto_complete_scenes {
            self.finish(scene);
        } else {
            self.scenes.borrow_mut().push_back(scene);
        }
        Playback::Started
    }

    fn add_items(&self, item_id: &str, quantity: u32) {
        let mut state = self.state.borrow_mut();
        let key = state
            .inventory
            .keys()
            .find(|held| same_id(held, item_id))
            .cloned()
            .unwrap_or_else(|| item_id.to_string());
        let held = state.inventory.entry(key).or_default();
        *held = held.saturating_add(quantity);
    }
}

impl SessionStore for LocalSession {
    fn snapshot(&self) -> GameSessionState {
        self.state()
    }

    fn mark_event_completed(&self, event_id: &str) {
        self.state
            .borrow_mut()
            .completed_events
            .insert(event_id.to_string());
    }

    fn is_event_completed(&self, event_id: &str) -> bool {
        self.state.borrow().completed_events.contains(event_id)
    }
}

impl EffectHooks for LocalSession {
    fn play_cinematic(&self, scene_id: &str, done: Completion) -> Playback {
        info!(scene = scene_id, "Cinematic requested");
        self.request_scene(SceneKind::Cinematic, None, done)
    }

    fn system_tutorial(
        &self,
        scene_id: Option<&str>,
        context: Option<&str>,
        done: Completion,
    ) -> Playback {
        info!(scene = ?scene_id, context = ?context, "System tutorial requested");
        self.request_scene(SceneKind::Tutorial, scene_id.or(context), done)
    }

    fn show_message(&self, text: &str, tap_to_dismiss: bool) {
        self.progress.borrow_mut().messages.push(ShownMessage {
            text: text.to_string(),
            tap_to_dismiss,
        });
    }

    fn grant_reward(&self, reward: &EventReward) {
        if reward.is_empty() {
            debug!("Empty reward granted; nothing to apply");
            return;
        }
        {
            let mut progress = self.progress.borrow_mut();
            progress.xp += reward.xp;
            progress.credits += reward.credits;
            progress.ap += reward.ap;
        }
        for item in &reward.items {
            self.add_items(&item.item_id, item.quantity);
        }
    }

    fn audio(&self, command: &AudioCommand) {
        self.progress.borrow_mut().audio.push(command.clone());
    }

    fn set_room_state(&self, room_id: Option<&str>, state_key: &str, value: Option<bool>) {
        let room = room_id
            .map(str::to_string)
            .or_else(|| self.state.borrow().current_room.clone())
            .unwrap_or_default();
        let mut progress = self.progress.borrow_mut();
        let flag = progress
            .room_flags
            .entry((room, state_key.to_string()))
            .or_default();
        *flag = value.unwrap_or(!*flag);
    }

    fn spawn_encounter(&self, encounter_id: Option<&str>, room_id: Option<&str>) {
        self.progress
            .borrow_mut()
            .encounters
            .push((encounter_id.map(str::to_string), room_id.map(str::to_string)));
    }

    fn spawn_ground_item(&self, room_id: Option<&str>, item_id: &str, quantity: u32) {
        let room_id = room_id
            .map(str::to_string)
            .or_else(|| self.state.borrow().current_room.clone());
        self.progress.borrow_mut().ground_items.push(GroundItem {
            room_id,
            item_id: item_id.to_string(),
            quantity,
        });
    }

    fn unlock_room_search(&self, room_id: Option<&str>, note: Option<&str>) {
        let room = room_id
            .map(str::to_string)
            .or_else(|| self.state.borrow().current_room.clone())
            .unwrap_or_default();
        debug!(room = %room, note = ?note, "Room search unlocked");
        self.progress.borrow_mut().searchable_rooms.insert(room);
    }

    fn give_item(&self, item_id: &str, quantity: u32) {
        self.add_items(item_id, quantity);
    }

    fn take_item(&self, item_id: &str, quantity: u32) -> bool {
        let mut state = self.state.borrow_mut();
        let Some(key) = state
            .inventory
            .iter()
            .find(|(held, count)| same_id(held, item_id) && **count >= quantity)
            .map(|(held, _)| held.clone())
        else {
            return false;
        };
        if let Some(count) = state.inventory.get_mut(&key) {
            *count -= quantity;
            if *count == 0 {
                state.inventory.remove(&key);
            }
        }
        true
    }

    fn give_xp(&self, amount: i64) {
        self.progress.borrow_mut().xp += amount;
    }

    fn party_member_joined(&self, member_id: &str) {
        let mut progress = self.progress.borrow_mut();
        if !progress.party.iter().any(|m| same_id(m, member_id)) {
            progress.party.push(member_id.to_string());
        }
    }

    fn start_quest(&self, quest_id: &str) {
        self.state.borrow_mut().active_quests.insert(quest_id.to_string());
    }

    fn complete_quest(&self, quest_id: &str) {
        let mut state = self.state.borrow_mut();
        state.active_quests.remove(quest_id);
        state.completed_quests.insert(quest_id.to_string());
    }

    fn fail_quest(&self, quest_id: &str, reason: &str) {
        {
            let mut state = self.state.borrow_mut();
            state.active_quests.remove(quest_id);
            state.failed_quests.insert(quest_id.to_string());
        }
        if !reason.is_empty() {
            self.progress
                .borrow_mut()
                .failure_reasons
                .insert(quest_id.to_string(), reason.to_string());
        }
    }

    fn advance_quest_stage(&self, quest_id: Option<&str>, stage_id: Option<&str>) {
        if let (Some(quest), Some(stage)) = (quest_id, stage_id) {
            self.state
                .borrow_mut()
                .quest_stages
                .insert(quest.to_string(), stage.to_string());
        }
    }

    fn update_quest_task(&self, quest_id: Option<&str>, task_id: Option<&str>) {
        if let (Some(quest), Some(task)) = (quest_id, task_id) {
            self.state
                .borrow_mut()
                .completed_tasks
                .entry(quest.to_string())
                .or_default()
                .insert(task.to_string());
        }
    }

    fn quest_updated(&self) {
        self.progress.borrow_mut().quest_updates += 1;
    }

    fn milestone_set(&self, milestone_id: &str) {
        self.state.borrow_mut().milestones.insert(milestone_id.to_string());
    }

    fn event_completed(&self, event_id: &str) {
        debug!(event = event_id, "Event recorded as completed");
    }
}
