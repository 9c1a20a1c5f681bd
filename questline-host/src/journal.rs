//! Capability-call journal.
//!
//! [`Recording`] wraps any [`EffectHooks`] implementation and logs each
//! call as a [`HookCall`] before forwarding it. Authoring tools use it to
//! show what an event did; tests use it to assert exact call sequences.

use std::cell::RefCell;

use questline_core::types::{AudioCommand, EventReward};
use questline_core::{Completion, EffectHooks, GameSessionState, Playback, SessionStore};

/// One capability invocation.
#[derive(Debug, Clone, PartialEq)]
#[allow(missing_docs)]
pub enum HookCall {
    PlayCinematic {
        scene_id: String,
        playback: Playback,
    },
    SystemTutorial {
        scene_id: Option<String>,
        context: Option<String>,
        playback: Playback,
    },
    ShowMessage {
        text: String,
        tap_to_dismiss: bool,
    },
    GrantReward(EventReward),
    Audio(AudioCommand),
    SetRoomState {
        room_id: Option<String>,
        state_key: String,
        value: Option<bool>,
    },
    SpawnEncounter {
        encounter_id: Option<String>,
        room_id: Option<String>,
    },
    SpawnGroundItem {
        room_id: Option<String>,
        item_id: String,
        quantity: u32,
    },
    UnlockRoomSearch {
        room_id: Option<String>,
        note: Option<String>,
    },
    GiveItem {
        item_id: String,
        quantity: u32,
    },
    /// `removed` is the capability's answer.
    TakeItem {
        item_id: String,
        quantity: u32,
        removed: bool,
    },
    GiveXp(i64),
    PartyMemberJoined(String),
    StartQuest(String),
    CompleteQuest(String),
    FailQuest {
        quest_id: String,
        reason: String,
    },
    AdvanceQuestStage {
        quest_id: Option<String>,
        stage_id: Option<String>,
    },
    UpdateQuestTask {
        quest_id: Option<String>,
        task_id: Option<String>,
    },
    QuestUpdated,
    MilestoneSet(String),
    EventCompleted(String),
}

impl HookCall {
    /// Whether this call changes the inventory.
    #[must_use]
    pub fn mutates_inventory(&self) -> bool {
        match self {
            Self::GiveItem { .. } | Self::GrantReward(_) => true,
            Self::TakeItem { removed, .. } => *removed,
            _ => false,
        }
    }
}

fn owned(value: Option<&str>) -> Option<String> {
    value.map(str::to_string)
}

/// Journaling wrapper around a capability set.
///
/// Also forwards [`SessionStore`] when the wrapped value is one, so a
/// single `Rc<Recording<LocalSession>>` can serve as both engine inputs.
#[derive(Default)]
pub struct Recording<H> {
    inner: H,
    calls: RefCell<Vec<HookCall>>,
}

impl<H: EffectHooks> Recording<H> {
    /// Start journaling calls made to `inner`.
    pub fn new(inner: H) -> Self {
        Self {
            inner,
            calls: RefCell::new(Vec::new()),
        }
    }

    /// The wrapped capability set.
    pub fn inner(&self) -> &H {
        &self.inner
    }

    /// Calls recorded so far, oldest first.
    #[must_use]
    pub fn calls(&self) -> Vec<HookCall> {
        self.calls.borrow().clone()
    }

    /// Drain the journal.
    pub fn take_calls(&self) -> Vec<HookCall> {
        std::mem::take(&mut *self.calls.borrow_mut())
    }

    /// Number of recorded calls that satisfy `filter`.
    pub fn count(&self, filter: impl Fn(&HookCall) -> bool) -> usize {
        self.calls.borrow().iter().filter(|&call| filter(call)).count()
    }

    fn record(&self, call: HookCall) {
        self.calls.borrow_mut().push(call);
    }
}

impl<H: EffectHooks> EffectHooks for Recording<H> {
    fn play_cinematic(&self, scene_id: &str, done: Completion) -> Playback {
        let index = self.calls.borrow().len();
        self.record(HookCall::PlayCinematic {
            scene_id: scene_id.to_string(),
            playback: Playback::Started,
        });
        let playback = self.inner.play_cinematic(scene_id, done);
        if let Some(HookCall::PlayCinematic { playback: slot, .. }) =
            self.calls.borrow_mut().get_mut(index)
        {
            *slot = playback;
        }
        playback
    }

    fn system_tutorial(
        &self,
        scene_id: Option<&str>,
        context: Option<&str>,
        done: Completion,
    ) -> Playback {
        let index = self.calls.borrow().len();
        self.record(HookCall::SystemTutorial {
            scene_id: owned(scene_id),
            context: owned(context),
            playback: Playback::Started,
        });
        let playback = self.inner.system_tutorial(scene_id, context, done);
        if let Some(HookCall::SystemTutorial { playback: slot, .. }) =
            self.calls.borrow_mut().get_mut(index)
        {
            *slot = playback;
        }
        playback
    }

    fn show_message(&self, text: &str, tap_to_dismiss: bool) {
        self.record(HookCall::ShowMessage {
            text: text.to_string(),
            tap_to_dismiss,
        });
        self.inner.show_message(text, tap_to_dismiss);
    }

    fn grant_reward(&self, reward: &EventReward) {
        self.record(HookCall::GrantReward(reward.clone()));
        self.inner.grant_reward(reward);
    }

    fn audio(&self, command: &AudioCommand) {
        self.record(HookCall::Audio(command.clone()));
        self.inner.audio(command);
    }

    fn set_room_state(&self, room_id: Option<&str>, state_key: &str, value: Option<bool>) {
        self.record(HookCall::SetRoomState {
            room_id: owned(room_id),
            state_key: state_key.to_string(),
            value,
        });
        self.inner.set_room_state(room_id, state_key, value);
    }

    fn spawn_encounter(&self, encounter_id: Option<&str>, room_id: Option<&str>) {
        self.record(HookCall::SpawnEncounter {
            encounter_id: owned(encounter_id),
            room_id: owned(room_id),
        });
        self.inner.spawn_encounter(encounter_id, room_id);
    }

    fn spawn_ground_item(&self, room_id: Option<&str>, item_id: &str, quantity: u32) {
        self.record(HookCall::SpawnGroundItem {
            room_id: owned(room_id),
            item_id: item_id.to_string(),
            quantity,
        });
        self.inner.spawn_ground_item(room_id, item_id, quantity);
    }

    fn unlock_room_search(&self, room_id: Option<&str>, note: Option<&str>) {
        self.record(HookCall::UnlockRoomSearch {
            room_id: owned(room_id),
            note: owned(note),
        });
        self.inner.unlock_room_search(room_id, note);
    }

    fn give_item(&self, item_id: &str, quantity: u32) {
        self.record(HookCall::GiveItem {
            item_id: item_id.to_string(),
            quantity,
        });
        self.inner.give_item(item_id, quantity);
    }

    fn take_item(&self, item_id: &str, quantity: u32) -> bool {
        let removed = self.inner.take_item(item_id, quantity);
        self.record(HookCall::TakeItem {
            item_id: item_id.to_string(),
            quantity,
            removed,
        });
        removed
    }

    fn give_xp(&self, amount: i64) {
        self.record(HookCall::GiveXp(amount));
        self.inner.give_xp(amount);
    }

    fn party_member_joined(&self, member_id: &str) {
        self.record(HookCall::PartyMemberJoined(member_id.to_string()));
        self.inner.party_member_joined(member_id);
    }

    fn start_quest(&self, quest_id: &str) {
        self.record(HookCall::StartQuest(quest_id.to_string()));
        self.inner.start_quest(quest_id);
    }

    fn complete_quest(&self, quest_id: &str) {
        self.record(HookCall::CompleteQuest(quest_id.to_string()));
        self.inner.complete_quest(quest_id);
    }

    fn fail_quest(&self, quest_id: &str, reason: &str) {
        self.record(HookCall::FailQuest {
            quest_id: quest_id.to_string(),
            reason: reason.to_string(),
        });
        self.inner.fail_quest(quest_id, reason);
    }

    fn advance_quest_stage(&self, quest_id: Option<&str>, stage_id: Option<&str>) {
        self.record(HookCall::AdvanceQuestStage {
            quest_id: owned(quest_id),
            stage_id: owned(stage_id),
        });
        self.inner.advance_quest_stage(quest_id, stage_id);
    }

    fn update_quest_task(&self, quest_id: Option<&str>, task_id: Option<&str>) {
        self.record(HookCall::UpdateQuestTask {
            quest_id: owned(quest_id),
            task_id: owned(task_id),
        });
        self.inner.update_quest_task(quest_id, task_id);
    }

    fn quest_updated(&self) {
        self.record(HookCall::QuestUpdated);
        self.inner.quest_updated();
    }

    fn milestone_set(&self, milestone_id: &str) {
        self.record(HookCall::MilestoneSet(milestone_id.to_string()));
        self.inner.milestone_set(milestone_id);
    }

    fn event_completed(&self, event_id: &str) {
        self.record(HookCall::EventCompleted(event_id.to_string()));
        self.inner.event_completed(event_id);
    }
}

impl<H: SessionStore> SessionStore for Recording<H> {
    fn snapshot(&self) -> GameSessionState {
        self.inner.snapshot()
    }

    fn mark_event_completed(&self, event_id: &str) {
        self.inner.mark_event_completed(event_id);
    }

    fn is_event_completed(&self, event_id: &str) -> bool {
        self.inner.is_event_completed(event_id)
    }
}
