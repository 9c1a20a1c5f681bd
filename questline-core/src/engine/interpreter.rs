//! Action interpreter.
//!
//! Each [`Action`] maps to at most one capability call. The return value
//! says whether the action produced an effect; the caller ORs these
//! together to decide whether the owning event counts as fired.

use tracing::{debug, debug_span};

use super::NarrativeEngine;
use crate::action::Action;
use crate::continuation::{Completion, Playback};
use crate::metrics::{spans, EngineCounters};
use crate::reward::to_reward;
use crate::session::GameSessionState;
use crate::types::{non_blank, EventPayload};

const TUTORIAL_LABEL: &str = "system_tutorial";

impl NarrativeEngine {
    /// Interpret one action against `state`.
    pub(super) fn run_action(&self, action: &Action, state: &GameSessionState) -> bool {
        let hooks = self.inner.hooks.as_ref();
        EngineCounters::bump(&self.inner.counters.actions_executed);
        if self.inner.config.diagnostics.trace_dispatch {
            debug!(action = action.label(), "Interpreting action");
        }

        match action {
            Action::SetMilestone { milestone } => {
                let Some(milestone) = milestone else {
                    return false;
                };
                hooks.milestone_set(milestone);
                hooks.quest_updated();
                true
            }
            Action::StartQuest { quest_id } => {
                let Some(quest_id) = quest_id else {
                    return false;
                };
                hooks.start_quest(quest_id);
                hooks.quest_updated();
                true
            }
            Action::CompleteQuest { quest_id } => {
                let Some(quest_id) = quest_id else {
                    return false;
                };
                hooks.complete_quest(quest_id);
                hooks.quest_updated();
                true
            }
            Action::FailQuest { quest_id, reason } => {
                let Some(quest_id) = quest_id else {
                    return false;
                };
                hooks.fail_quest(quest_id, reason);
                hooks.quest_updated();
                true
            }
            Action::AdvanceQuestStage { quest_id, stage_id } => {
                hooks.advance_quest_stage(quest_id.as_deref(), stage_id.as_deref());
                hooks.quest_updated();
                true
            }
            Action::UpdateQuestTask { quest_id, task_id } => {
                hooks.update_quest_task(quest_id.as_deref(), task_id.as_deref());
                hooks.quest_updated();
                true
            }
            Action::GiveItem { item_id, quantity } => {
                let Some(item_id) = item_id else {
                    return false;
                };
                hooks.give_item(item_id, *quantity);
                true
            }
            Action::TakeItem { item_id, quantity } => {
                let Some(item_id) = item_id else {
                    return false;
                };
                let taken = hooks.take_item(item_id, *quantity);
                if !taken {
                    debug!(item = %item_id, quantity, "Not enough held; take_item skipped");
                }
                taken
            }
            Action::SpawnGroundItem {
                room_id,
                item_id,
                quantity,
            } => {
                let Some(item_id) = item_id else {
                    return false;
                };
                hooks.spawn_ground_item(room_id.as_deref(), item_id, *quantity);
                true
            }
            Action::GiveXp { xp } => match xp {
                Some(amount) if *amount != 0 => {
                    hooks.give_xp(*amount);
                    true
                }
                _ => false,
            },
            Action::GiveReward(spec) => {
                hooks.grant_reward(&to_reward(spec));
                true
            }
            Action::ShowMessage {
                text,
                tap_to_dismiss,
            } => {
                let Some(text) = non_blank(text.as_deref()) else {
                    return false;
                };
                hooks.show_message(text, *tap_to_dismiss);
                true
            }
            Action::SetRoomState {
                room_id,
                state_key,
                value,
            } => {
                let Some(state_key) = state_key else {
                    return false;
                };
                hooks.set_room_state(room_id.as_deref(), state_key, *value);
                true
            }
            Action::SpawnEncounter {
                encounter_id,
                room_id,
            } => {
                hooks.spawn_encounter(encounter_id.as_deref(), room_id.as_deref());
                true
            }
            Action::PartyMemberJoined { member_id } => {
                let Some(member_id) = member_id else {
                    return false;
                };
                hooks.party_member_joined(member_id);
                true
            }
            Action::UnlockRoomSearch { room_id, note } => {
                hooks.unlock_room_search(room_id.as_deref(), note.as_deref());
                true
            }
            Action::Audio(command) => {
                hooks.audio(command);
                true
            }
            Action::Branch {
                test,
                then,
                otherwise,
            } => {
                let chosen = if self.condition_holds(test, state) {
                    then
                } else {
                    otherwise
                };
                self.execute(chosen, state)
            }
            Action::PlayCinematic {
                scene_id,
                on_complete,
            } => {
                let Some(scene_id) = scene_id else {
                    return self.execute(on_complete, state);
                };
                let done = self.continuation(scene_id, on_complete);
                let guard = done.guard();
                if hooks.play_cinematic(scene_id, done) == Playback::Declined {
                    guard.resume();
                }
                true
            }
            Action::SystemTutorial {
                scene_id,
                context,
                on_complete,
            } => {
                let label = scene_id
                    .as_deref()
                    .or(context.as_deref())
                    .unwrap_or(TUTORIAL_LABEL);
                let done = self.continuation(label, on_complete);
                let guard = done.guard();
                if hooks.system_tutorial(scene_id.as_deref(), context.as_deref(), done)
                    == Playback::Declined
                {
                    guard.resume();
                }
                true
            }
            Action::PlayerAction { action, item_id } => {
                let Some(action) = action else {
                    return false;
                };
                let payload = EventPayload::PlayerAction {
                    action: action.clone(),
                    item: item_id.clone(),
                };
                self.handle_trigger("player_action", &payload).any_fired()
            }
            Action::Unknown(kind) => {
                debug!(action = %kind, "Unknown action type; skipped");
                false
            }
        }
    }

    /// Token that interprets `on_complete` against a fresh snapshot when fired.
    fn continuation(&self, label: &str, on_complete: &[Action]) -> Completion {
        let engine = self.downgrade();
        let scene = label.to_string();
        let actions = on_complete.to_vec();
        Completion::new(label, move || match engine.upgrade() {
            Some(engine) => engine.resume(&scene, &actions),
            None => debug!(scene = %scene, "Engine dropped; late completion ignored"),
        })
    }

    fn resume(&self, scene: &str, actions: &[Action]) {
        let span = debug_span!(spans::CONTINUATION, scene, actions = actions.len());
        let _entered = span.enter();
        EngineCounters::bump(&self.inner.counters.continuations_resumed);
        let state = self.inner.store.snapshot();
        let produced = self.execute(actions, &state);
        debug!(scene, produced, "Continuation resumed");
    }
}
