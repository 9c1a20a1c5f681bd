//! Trigger matching: does an occurrence satisfy an event's trigger?
//!
//! Dispatch happens on [`TriggerKind`], resolved once from the authored
//! type string. Matching is a pure function of the trigger, the payload and
//! the session snapshot.

use std::collections::HashSet;

use crate::config::UnknownTypePolicy;
use crate::definition::{first_present, type_key, TriggerDefinition};
use crate::session::GameSessionState;
use crate::types::{same_id, EncounterOutcome, EventPayload};

/// Trigger families the matcher understands.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TriggerKind {
    /// `talk_to`, `npc_interaction`, `dialogue_closed`, `dialogue_dismissed`.
    Npc,
    /// `enter_room`.
    EnterRoom,
    /// `player_action`.
    PlayerAction,
    /// `quest_stage_complete`.
    QuestStageComplete,
    /// `encounter_victory`, `encounter_defeat`, `encounter_retreat`.
    Encounter(EncounterOutcome),
    /// `item_acquired`.
    ItemAcquired,
    /// Anything else, kept verbatim for diagnostics.
    Other(String),
}

impl TriggerKind {
    /// Resolve a lower-cased type key.
    #[must_use]
    pub fn parse(key: &str) -> Self {
        match key {
            "talk_to" | "npc_interaction" | "dialogue_closed" | "dialogue_dismissed" => Self::Npc,
            "enter_room" => Self::EnterRoom,
            "player_action" => Self::PlayerAction,
            "quest_stage_complete" => Self::QuestStageComplete,
            "encounter_victory" => Self::Encounter(EncounterOutcome::Victory),
            "encounter_defeat" => Self::Encounter(EncounterOutcome::Defeat),
            "encounter_retreat" => Self::Encounter(EncounterOutcome::Retreat),
            "item_acquired" => Self::ItemAcquired,
            other => Self::Other(other.to_string()),
        }
    }

    /// Whether the type string was outside the known vocabulary.
    #[must_use]
    pub fn is_unknown(&self) -> bool {
        matches!(self, Self::Other(_))
    }
}

/// A compiled trigger description.
///
/// Only the fields relevant to `kind` are consulted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Trigger {
    /// Lower-cased type string; the catalog indexes on it.
    pub type_key: String,
    /// Resolved family.
    pub kind: TriggerKind,
    /// NPC name.
    pub npc: Option<String>,
    /// Room id (`roomId`, falling back to `room`).
    pub room_id: Option<String>,
    /// Player action tag.
    pub action: Option<String>,
    /// Item id (`itemId`, falling back to `item`).
    pub item_id: Option<String>,
    /// Quest id.
    pub quest_id: Option<String>,
    /// Enemy ids; empty means "any enemy".
    pub enemies: HashSet<String>,
}

impl Trigger {
    /// Build a trigger of the given type with no specifics.
    #[must_use]
    pub fn of_type(kind: &str) -> Self {
        Self::from(TriggerDefinition {
            kind: kind.to_string(),
            ..TriggerDefinition::default()
        })
    }
}

impl From<TriggerDefinition> for Trigger {
    fn from(def: TriggerDefinition) -> Self {
        let key = type_key(&def.kind);
        Self {
            kind: TriggerKind::parse(&key),
            type_key: key,
            npc: first_present(def.npc.as_ref(), None),
            room_id: first_present(def.room_id.as_ref(), def.room.as_ref()),
            action: first_present(def.action.as_ref(), None),
            item_id: first_present(def.item_id.as_ref(), def.item.as_ref()),
            quest_id: first_present(def.quest_id.as_ref(), None),
            enemies: def.enemies.into_iter().collect(),
        }
    }
}

/// Does `payload` satisfy `trigger`? Unknown trigger types match.
#[must_use]
pub fn matches(trigger: &Trigger, payload: &EventPayload, state: &GameSessionState) -> bool {
    matches_with(trigger, payload, state, UnknownTypePolicy::Allow)
}

/// [`matches`] with an explicit verdict for unknown trigger types.
#[must_use]
pub fn matches_with(
    trigger: &Trigger,
    payload: &EventPayload,
    state: &GameSessionState,
    unknown: UnknownTypePolicy,
) -> bool {
    match &trigger.kind {
        TriggerKind::Npc => match payload {
            EventPayload::TalkedTo { npc } => {
                trigger.npc.as_deref().is_some_and(|want| same_id(want, npc))
            }
            _ => false,
        },

        TriggerKind::EnterRoom => {
            let entered = match payload {
                EventPayload::EnteredRoom { room_id } => room_id.as_deref(),
                EventPayload::Empty => None,
                _ => return false,
            };
            let Some(want) = trigger.room_id.as_deref() else {
                return true;
            };
            entered
                .or(state.current_room.as_deref())
                .is_some_and(|room| room == want)
        }

        TriggerKind::PlayerAction => match payload {
            EventPayload::PlayerAction { action, item } => {
                let action_ok = trigger
                    .action
                    .as_deref()
                    .is_none_or(|want| same_id(want, action));
                let item_ok = trigger.item_id.as_deref().is_none_or(|want| {
                    item.as_deref().is_some_and(|have| same_id(want, have))
                });
                action_ok && item_ok
            }
            _ => false,
        },

        TriggerKind::QuestStageComplete => match payload {
            EventPayload::QuestStageReached { quest_id, .. } => {
                trigger.quest_id.as_deref() == Some(quest_id.as_str())
            }
            _ => false,
        },

        TriggerKind::Encounter(want) => {
            let enemy_ids = match payload {
                EventPayload::Encounter { enemy_ids, outcome } if outcome == want => enemy_ids,
                EventPayload::EnemyVictory { enemy_ids } if *want == EncounterOutcome::Victory => {
                    enemy_ids
                }
                _ => return false,
            };
            trigger.enemies.is_empty() || enemy_ids.iter().any(|id| trigger.enemies.contains(id))
        }

        TriggerKind::ItemAcquired => match payload {
            EventPayload::ItemAcquired { item_id, .. } => trigger
                .item_id
                .as_deref()
                .is_none_or(|want| same_id(want, item_id)),
            _ => false,
        },

        TriggerKind::Other(_) => unknown.verdict(),
    }
}
