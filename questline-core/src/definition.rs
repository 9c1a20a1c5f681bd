//! Authored-data records, as produced by the asset loader.
//!
//! These mirror the JSON shape content authors write: camelCase keys,
//! string `type` discriminators and a wide optional field set. Nothing in
//! the engine evaluates them directly; they are converted once into the
//! closed enums of [`crate::trigger`], [`crate::condition`] and
//! [`crate::action`] when the catalog is built.

use serde::{Deserialize, Serialize};

use crate::types::{EventReward, RewardItem};

/// One authored event.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct EventDefinition {
    /// Unique id; blank ids can never be marked completed.
    pub id: String,
    /// What the event listens for.
    pub trigger: TriggerDefinition,
    /// Preconditions, AND-ed.
    pub conditions: Vec<ConditionDefinition>,
    /// Effects, executed in order.
    pub actions: Vec<ActionDefinition>,
    /// Whether the event may fire more than once.
    pub repeatable: bool,
}

/// Authored trigger description.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TriggerDefinition {
    /// Trigger type, matched case-insensitively.
    #[serde(rename = "type")]
    pub kind: String,
    /// NPC name for dialogue triggers.
    pub npc: Option<String>,
    /// Room id for `enter_room`.
    pub room_id: Option<String>,
    /// Legacy alias of `roomId`.
    pub room: Option<String>,
    /// Action tag for `player_action`.
    pub action: Option<String>,
    /// Item id for `player_action` and `item_acquired`.
    pub item_id: Option<String>,
    /// Legacy alias of `itemId`.
    pub item: Option<String>,
    /// Quest id for `quest_stage_complete`.
    pub quest_id: Option<String>,
    /// Enemy ids for encounter triggers.
    pub enemies: Vec<String>,
}

/// Authored precondition.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ConditionDefinition {
    /// Condition type, matched case-insensitively.
    #[serde(rename = "type")]
    pub kind: String,
    /// Milestone id.
    pub milestone: Option<String>,
    /// Quest id.
    pub quest_id: Option<String>,
    /// Quest stage id.
    pub stage_id: Option<String>,
    /// Quest task id.
    pub task_id: Option<String>,
    /// Event id.
    pub event_id: Option<String>,
    /// Tutorial id.
    pub tutorial_id: Option<String>,
    /// Item id.
    pub item_id: Option<String>,
    /// Legacy alias of `itemId`.
    pub item: Option<String>,
    /// Minimum item quantity.
    pub quantity: Option<u32>,
}

/// Authored action.
///
/// The field set is the union of everything any action type reads; each
/// action type consults only its own fields.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ActionDefinition {
    /// Action type, matched case-insensitively.
    #[serde(rename = "type")]
    pub kind: String,

    /// Milestone id.
    pub milestone: Option<String>,
    /// Quest id.
    pub quest_id: Option<String>,
    /// Shorthand quest id for `start_quest`.
    pub start_quest: Option<String>,
    /// Shorthand quest id for `complete_quest`.
    pub complete_quest: Option<String>,
    /// Shorthand quest id for `fail_quest`.
    pub fail_quest: Option<String>,
    /// Failure reason for `fail_quest`.
    pub reason: Option<String>,
    /// Quest stage id.
    pub stage_id: Option<String>,
    /// Quest task id.
    pub task_id: Option<String>,
    /// Event id (conditional branches).
    pub event_id: Option<String>,
    /// Tutorial id (conditional branches).
    pub tutorial_id: Option<String>,

    /// Item id.
    pub item_id: Option<String>,
    /// Legacy alias of `itemId`.
    pub item: Option<String>,
    /// Item quantity.
    pub quantity: Option<u32>,

    /// Room id.
    pub room_id: Option<String>,
    /// Legacy alias of `roomId`.
    pub room: Option<String>,
    /// Room state key.
    pub state_key: Option<String>,
    /// Room state value; absent on `toggle_room_state`.
    pub value: Option<bool>,
    /// Encounter id.
    pub encounter_id: Option<String>,
    /// Party member id.
    pub member_id: Option<String>,
    /// Note attached to a room-search unlock.
    pub note: Option<String>,

    /// Cinematic or tutorial scene id.
    pub scene_id: Option<String>,
    /// Tutorial context.
    pub context: Option<String>,
    /// Narration text.
    pub message: Option<String>,
    /// Alias of `message`.
    pub text: Option<String>,
    /// Whether narration waits for a tap.
    pub tap_to_dismiss: Option<bool>,

    /// Audio layer.
    pub layer: Option<String>,
    /// Audio cue.
    pub cue_id: Option<String>,
    /// Audio gain.
    pub gain: Option<f32>,
    /// Audio fade in milliseconds.
    pub fade_ms: Option<u32>,
    /// Whether the cue loops.
    #[serde(rename = "loop")]
    pub looping: Option<bool>,
    /// Stop the audio layer.
    pub stop: Option<bool>,

    /// Shorthand reward xp; also the amount for `give_xp`.
    pub xp: Option<i64>,
    /// Shorthand reward credits.
    pub credits: Option<i64>,
    /// Shorthand reward ability points.
    pub ap: Option<i64>,
    /// Shorthand reward items.
    pub items: Option<Vec<RewardItem>>,
    /// Full reward template.
    pub reward: Option<EventReward>,

    /// Action tag re-raised by `player_action`.
    pub action: Option<String>,

    /// Branch taken when a conditional holds.
    #[serde(rename = "do")]
    pub then: Vec<ActionDefinition>,
    /// Branch taken when a conditional fails.
    pub else_do: Vec<ActionDefinition>,
    /// Continuation run after a cinematic or tutorial completes.
    pub on_complete: Vec<ActionDefinition>,
}

impl ActionDefinition {
    /// Build the condition record a conditional action (`if_<condition>`) tests.
    #[must_use]
    pub fn as_condition(&self, condition_kind: &str) -> ConditionDefinition {
        ConditionDefinition {
            kind: condition_kind.to_string(),
            milestone: self.milestone.clone(),
            quest_id: self.quest_id.clone(),
            stage_id: self.stage_id.clone(),
            task_id: self.task_id.clone(),
            event_id: self.event_id.clone(),
            tutorial_id: self.tutorial_id.clone(),
            item_id: self.item_id.clone(),
            item: self.item.clone(),
            quantity: self.quantity,
        }
    }
}

/// Normalise an authored type string for dispatch.
#[must_use]
pub fn type_key(kind: &str) -> String {
    kind.trim().to_ascii_lowercase()
}

/// Prefer the canonical field, fall back to its alias; blanks count as absent.
pub(crate) fn first_present(primary: Option<&String>, alias: Option<&String>) -> Option<String> {
    [primary, alias]
        .into_iter()
        .flatten()
        .map(|value| value.trim())
        .find(|value| !value.is_empty())
        .map(str::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_nested_action_lists() {
        let json = r#"{
            "type": "if_quest_active",
            "questId": "gather_broken_gear",
            "do": [{"type": "give_item", "item": "gear"}],
            "elseDo": [{"type": "show_message", "text": "Not yet."}]
        }"#;
        let def: ActionDefinition = serde_json::from_str(json).expect("json");
        assert_eq!(def.kind, "if_quest_active");
        assert_eq!(def.then.len(), 1);
        assert_eq!(def.then[0].item.as_deref(), Some("gear"));
        assert_eq!(def.else_do[0].text.as_deref(), Some("Not yet."));
        assert!(def.on_complete.is_empty());
    }

    #[test]
    fn conditional_fields_carry_over() {
        let def = ActionDefinition {
            kind: "if_item".into(),
            item_id: Some("ration_pack".into()),
            quantity: Some(2),
            ..ActionDefinition::default()
        };
        let cond = def.as_condition("item");
        assert_eq!(cond.kind, "item");
        assert_eq!(cond.item_id.as_deref(), Some("ration_pack"));
        assert_eq!(cond.quantity, Some(2));
    }

    #[test]
    fn first_present_skips_blanks() {
        let blank = String::from("  ");
        let alias = String::from("town_9");
        assert_eq!(first_present(Some(&blank), Some(&alias)), Some("town_9".into()));
        assert_eq!(first_present(None, None), None);
    }

    #[test]
    fn type_key_lowercases() {
        assert_eq!(type_key(" Talk_To "), "talk_to");
    }
}
