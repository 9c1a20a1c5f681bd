//! The closed action vocabulary.
//!
//! Every authored action compiles to one [`Action`] variant. Direct effects
//! map onto a single capability call, branches hold a [`Condition`] and two
//! sub-lists, and asynchronous effects hold the continuation to run once the
//! capability reports completion.

use crate::condition::Condition;
use crate::definition::{first_present, type_key, ActionDefinition};
use crate::reward::RewardSpec;
use crate::types::{normalize_quantity, AudioCommand};

/// One compiled action.
#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    /// Set a milestone.
    SetMilestone {
        /// Milestone id.
        milestone: Option<String>,
    },
    /// Start a quest.
    StartQuest {
        /// Quest id.
        quest_id: Option<String>,
    },
    /// Complete a quest.
    CompleteQuest {
        /// Quest id.
        quest_id: Option<String>,
    },
    /// Fail a quest.
    FailQuest {
        /// Quest id.
        quest_id: Option<String>,
        /// Reason shown to the player.
        reason: String,
    },
    /// Move a quest to a stage.
    AdvanceQuestStage {
        /// Quest id.
        quest_id: Option<String>,
        /// Stage id.
        stage_id: Option<String>,
    },
    /// Mark a quest task done.
    UpdateQuestTask {
        /// Quest id.
        quest_id: Option<String>,
        /// Task id.
        task_id: Option<String>,
    },
    /// Add items to the inventory.
    GiveItem {
        /// Item id.
        item_id: Option<String>,
        /// Quantity, at least 1.
        quantity: u32,
    },
    /// Remove items if enough are held.
    TakeItem {
        /// Item id.
        item_id: Option<String>,
        /// Quantity, at least 1.
        quantity: u32,
    },
    /// Place items on the floor of a room.
    SpawnGroundItem {
        /// Room id; `None` means the current room.
        room_id: Option<String>,
        /// Item id.
        item_id: Option<String>,
        /// Quantity, at least 1.
        quantity: u32,
    },
    /// Grant experience.
    GiveXp {
        /// Amount.
        xp: Option<i64>,
    },
    /// Emit a merged reward.
    GiveReward(RewardSpec),
    /// Narrate text.
    ShowMessage {
        /// Text to show.
        text: Option<String>,
        /// Whether the message waits for a tap.
        tap_to_dismiss: bool,
    },
    /// Set (or, with no value, toggle) a room-state flag.
    SetRoomState {
        /// Room id; `None` means the current room.
        room_id: Option<String>,
        /// State key.
        state_key: Option<String>,
        /// New value; `None` toggles.
        value: Option<bool>,
    },
    /// Spawn an encounter.
    SpawnEncounter {
        /// Encounter id.
        encounter_id: Option<String>,
        /// Room id.
        room_id: Option<String>,
    },
    /// A party member joins.
    PartyMemberJoined {
        /// Member id.
        member_id: Option<String>,
    },
    /// Unlock searching a room.
    UnlockRoomSearch {
        /// Room id.
        room_id: Option<String>,
        /// Note attached to the unlock.
        note: Option<String>,
    },
    /// Audio-layer command.
    Audio(AudioCommand),
    /// Conditional branch.
    Branch {
        /// Condition tested against the snapshot.
        test: Condition,
        /// Run when the condition holds.
        then: Vec<Action>,
        /// Run when it does not.
        otherwise: Vec<Action>,
    },
    /// Play a cinematic, then run `on_complete`.
    PlayCinematic {
        /// Scene id.
        scene_id: Option<String>,
        /// Continuation.
        on_complete: Vec<Action>,
    },
    /// Run a system tutorial, then run `on_complete`.
    SystemTutorial {
        /// Tutorial scene id.
        scene_id: Option<String>,
        /// Tutorial context.
        context: Option<String>,
        /// Continuation.
        on_complete: Vec<Action>,
    },
    /// Re-raise a `player_action` trigger.
    PlayerAction {
        /// Action tag.
        action: Option<String>,
        /// Associated item.
        item_id: Option<String>,
    },
    /// Unrecognised type string; a no-op.
    Unknown(String),
}

impl Action {
    /// The condition tested by an `if_<condition>` type key, if `key` is one.
    fn branch_condition(key: &str, def: &ActionDefinition) -> Option<Condition> {
        let condition_key = key.strip_prefix("if_")?;
        Condition::parse(condition_key, &def.as_condition(condition_key))
    }

    /// Child action lists, for walkers.
    #[must_use]
    pub fn children(&self) -> Vec<&[Action]> {
        match self {
            Self::Branch { then, otherwise, .. } => vec![then.as_slice(), otherwise.as_slice()],
            Self::PlayCinematic { on_complete, .. } | Self::SystemTutorial { on_complete, .. } => {
                vec![on_complete.as_slice()]
            }
            _ => Vec::new(),
        }
    }

    /// Short label for logs.
    #[must_use]
    pub fn label(&self) -> &str {
        match self {
            Self::SetMilestone { .. } => "set_milestone",
            Self::StartQuest { .. } => "start_quest",
            Self::CompleteQuest { .. } => "complete_quest",
            Self::FailQuest { .. } => "fail_quest",
            Self::AdvanceQuestStage { .. } => "advance_quest_stage",
            Self::UpdateQuestTask { .. } => "update_quest_task",
            Self::GiveItem { .. } => "give_item",
            Self::TakeItem { .. } => "take_item",
            Self::SpawnGroundItem { .. } => "spawn_ground_item",
            Self::GiveXp { .. } => "give_xp",
            Self::GiveReward(_) => "give_reward",
            Self::ShowMessage { .. } => "show_message",
            Self::SetRoomState { .. } => "set_room_state",
            Self::SpawnEncounter { .. } => "spawn_encounter",
            Self::PartyMemberJoined { .. } => "party_member_joined",
            Self::UnlockRoomSearch { .. } => "unlock_room_search",
            Self::Audio(_) => "audio",
            Self::Branch { .. } => "branch",
            Self::PlayCinematic { .. } => "play_cinematic",
            Self::SystemTutorial { .. } => "system_tutorial",
            Self::PlayerAction { .. } => "player_action",
            Self::Unknown(kind) => kind,
        }
    }
}

fn compile_list(defs: Vec<ActionDefinition>) -> Vec<Action> {
    defs.into_iter().map(Action::from).collect()
}

impl From<ActionDefinition> for Action {
    fn from(def: ActionDefinition) -> Self {
        let key = type_key(&def.kind);
        let item_id = first_present(def.item_id.as_ref(), def.item.as_ref());
        let room_id = first_present(def.room_id.as_ref(), def.room.as_ref());
        let quantity = normalize_quantity(def.quantity);
        let quest =
            |shorthand: &Option<String>| first_present(shorthand.as_ref(), def.quest_id.as_ref());

        match key.as_str() {
            "set_milestone" => Self::SetMilestone {
                milestone: first_present(def.milestone.as_ref(), None),
            },
            "start_quest" => Self::StartQuest { quest_id: quest(&def.start_quest) },
            "complete_quest" => Self::CompleteQuest { quest_id: quest(&def.complete_quest) },
            "fail_quest" => Self::FailQuest {
                quest_id: quest(&def.fail_quest),
                reason: def.reason.clone().unwrap_or_default(),
            },
            "advance_quest_stage" | "set_quest_stage" => Self::AdvanceQuestStage {
                quest_id: quest(&None),
                stage_id: first_present(def.stage_id.as_ref(), None),
            },
            "complete_quest_task" | "update_quest_task" => Self::UpdateQuestTask {
                quest_id: quest(&None),
                task_id: first_present(def.task_id.as_ref(), None),
            },
            "give_item" => Self::GiveItem { item_id, quantity },
            "take_item" => Self::TakeItem { item_id, quantity },
            "spawn_ground_item" | "drop_item" => Self::SpawnGroundItem {
                room_id,
                item_id,
                quantity,
            },
            "give_xp" => Self::GiveXp { xp: def.xp },
            "give_reward" | "reward" | "grant_reward" => Self::GiveReward(RewardSpec::from(&def)),
            "show_message" | "narrate" | "narration" => Self::ShowMessage {
                text: first_present(def.message.as_ref(), def.text.as_ref()),
                tap_to_dismiss: def.tap_to_dismiss.unwrap_or(false),
            },
            "set_room_state" => Self::SetRoomState {
                room_id,
                state_key: first_present(def.state_key.as_ref(), None),
                value: Some(def.value.unwrap_or(true)),
            },
            "toggle_room_state" => Self::SetRoomState {
                room_id,
                state_key: first_present(def.state_key.as_ref(), None),
                value: None,
            },
            "spawn_encounter" | "start_encounter" => Self::SpawnEncounter {
                encounter_id: first_present(def.encounter_id.as_ref(), None),
                room_id,
            },
            "party_member_joined" | "add_party_member" => Self::PartyMemberJoined {
                member_id: first_present(def.member_id.as_ref(), None),
            },
            "unlock_room_search" => Self::UnlockRoomSearch {
                room_id,
                note: first_present(def.note.as_ref(), None),
            },
            "audio" | "play_audio" | "stop_audio" => Self::Audio(AudioCommand {
                layer: first_present(def.layer.as_ref(), None),
                cue_id: first_present(def.cue_id.as_ref(), None),
                gain: def.gain,
                fade_ms: def.fade_ms,
                looping: def.looping,
                stop: key == "stop_audio" || def.stop.unwrap_or(false),
            }),
            "play_cinematic" | "trigger_cutscene" => Self::PlayCinematic {
                scene_id: first_present(def.scene_id.as_ref(), None),
                on_complete: compile_list(def.on_complete),
            },
            "system_tutorial" => Self::SystemTutorial {
                scene_id: first_present(def.scene_id.as_ref(), None),
                context: first_present(def.context.as_ref(), None),
                on_complete: compile_list(def.on_complete),
            },
            "player_action" => Self::PlayerAction {
                action: first_present(def.action.as_ref(), None),
                item_id,
            },
            _ => match Self::branch_condition(&key, &def) {
                Some(test) => Self::Branch {
                    test,
                    then: compile_list(def.then),
                    otherwise: compile_list(def.else_do),
                },
                None => Self::Unknown(key),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn action(json: &str) -> Action {
        let def: ActionDefinition = serde_json::from_str(json).expect("json");
        Action::from(def)
    }

    #[test]
    fn quest_shorthand_wins_over_quest_id() {
        let a = action(
            r#"{"type": "start_quest", "startQuest": "gather_broken_gear", "questId": "x"}"#,
        );
        assert_eq!(
            a,
            Action::StartQuest {
                quest_id: Some("gather_broken_gear".into())
            }
        );
        let b = action(r#"{"type": "complete_quest", "questId": "x"}"#);
        assert_eq!(b, Action::CompleteQuest { quest_id: Some("x".into()) });
    }

    #[test]
    fn item_alias_and_quantity_floor() {
        let a = action(r#"{"type": "give_item", "item": "fuse", "quantity": 0}"#);
        assert_eq!(a, Action::GiveItem { item_id: Some("fuse".into()), quantity: 1 });
    }

    #[test]
    fn toggle_has_no_value() {
        let set = action(r#"{"type": "set_room_state", "stateKey": "lights"}"#);
        let toggle = action(r#"{"type": "toggle_room_state", "stateKey": "lights"}"#);
        assert!(matches!(set, Action::SetRoomState { value: Some(true), .. }));
        assert!(matches!(toggle, Action::SetRoomState { value: None, .. }));
    }

    #[test]
    fn conditional_compiles_to_branch() {
        let a = action(
            r#"{"type": "if_milestone_set", "milestone": "m",
                "do": [{"type": "give_xp", "xp": 5}],
                "elseDo": [{"type": "narrate", "text": "later"}]}"#,
        );
        let Action::Branch { test, then, otherwise } = a else {
            panic!("expected branch");
        };
        assert_eq!(test, Condition::MilestoneSet("m".into()));
        assert_eq!(then, vec![Action::GiveXp { xp: Some(5) }]);
        assert_eq!(otherwise.len(), 1);
    }

    #[test]
    fn unknown_conditional_is_unknown_action() {
        assert_eq!(action(r#"{"type": "if_weather"}"#), Action::Unknown("if_weather".into()));
        assert_eq!(action(r#"{"type": "Dance"}"#), Action::Unknown("dance".into()));
    }

    #[test]
    fn cinematic_keeps_continuation() {
        let a = action(
            r#"{"type": "trigger_cutscene", "sceneId": "scene_x",
                "onComplete": [{"type": "give_xp", "xp": 50}]}"#,
        );
        assert_eq!(a.label(), "play_cinematic");
        assert_eq!(a.children().len(), 1);
        assert_eq!(a.children()[0], &[Action::GiveXp { xp: Some(50) }][..]);
    }

    #[test]
    fn stop_audio_sets_stop() {
        let a = action(r#"{"type": "stop_audio", "layer": "ambience", "fadeMs": 300}"#);
        let Action::Audio(cmd) = a else {
            panic!("expected audio");
        };
        assert!(cmd.stop);
        assert_eq!(cmd.fade_ms, Some(300));
    }
}
