//! Core value types shared by the matcher, evaluator and interpreter.
//!
//! All types are serializable so hosts can journal or replay dispatches.

use serde::{Deserialize, Serialize};
use std::fmt;

// ---------------------------------------------------------------------------
// Payloads
// ---------------------------------------------------------------------------

/// How an encounter ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EncounterOutcome {
    /// The party won.
    Victory,
    /// The party lost.
    Defeat,
    /// The party fled.
    Retreat,
}

impl fmt::Display for EncounterOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Victory => write!(f, "victory"),
            Self::Defeat => write!(f, "defeat"),
            Self::Retreat => write!(f, "retreat"),
        }
    }
}

/// Concrete data describing the occurrence that caused a dispatch.
///
/// The payload shape constrains which trigger types can match it; a
/// mismatch is a non-match, never an error.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum EventPayload {
    /// No data attached.
    #[default]
    Empty,
    /// The player spoke to (or closed dialogue with) an NPC.
    TalkedTo {
        /// NPC name as known to the dialogue system.
        npc: String,
    },
    /// A free-form player action tag, optionally tied to an item.
    PlayerAction {
        /// Action tag, e.g. `"search"` or `"use_item"`.
        action: String,
        /// Item the action was performed with, if any.
        item: Option<String>,
    },
    /// The player entered a room.
    EnteredRoom {
        /// Room id; `None` means "the current room".
        room_id: Option<String>,
    },
    /// A quest reached a stage.
    QuestStageReached {
        /// Quest id.
        quest_id: String,
        /// Stage id that was reached.
        stage_id: String,
    },
    /// An item entered the inventory.
    ItemAcquired {
        /// Item id.
        item_id: String,
        /// Quantity acquired.
        quantity: u32,
    },
    /// An encounter finished.
    Encounter {
        /// Ids of the enemies that took part.
        enemy_ids: Vec<String>,
        /// How it ended.
        outcome: EncounterOutcome,
    },
    /// Dedicated victory report from the combat layer.
    EnemyVictory {
        /// Ids of the defeated enemies.
        enemy_ids: Vec<String>,
    },
}

impl EventPayload {
    /// Short label for logs.
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Empty => "empty",
            Self::TalkedTo { .. } => "talked_to",
            Self::PlayerAction { .. } => "player_action",
            Self::EnteredRoom { .. } => "entered_room",
            Self::QuestStageReached { .. } => "quest_stage_reached",
            Self::ItemAcquired { .. } => "item_acquired",
            Self::Encounter { .. } => "encounter",
            Self::EnemyVictory { .. } => "enemy_victory",
        }
    }
}

// ---------------------------------------------------------------------------
// Rewards
// ---------------------------------------------------------------------------

/// One item line inside a reward.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RewardItem {
    /// Item id.
    #[serde(alias = "item")]
    pub item_id: String,
    /// Quantity granted.
    #[serde(default = "default_quantity")]
    pub quantity: u32,
}

/// A bundle of rewards emitted through the reward capability.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct EventReward {
    /// Experience points.
    pub xp: i64,
    /// Currency.
    pub credits: i64,
    /// Ability points.
    pub ap: i64,
    /// Items granted.
    pub items: Vec<RewardItem>,
}

impl EventReward {
    /// Whether the reward grants nothing.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.xp == 0 && self.credits == 0 && self.ap == 0 && self.items.is_empty()
    }
}

// ---------------------------------------------------------------------------
// Audio
// ---------------------------------------------------------------------------

/// Parameters of an audio-layer command.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct AudioCommand {
    /// Mixer layer, e.g. `"ambience"`.
    pub layer: Option<String>,
    /// Cue to play.
    pub cue_id: Option<String>,
    /// Target gain.
    pub gain: Option<f32>,
    /// Fade duration in milliseconds.
    pub fade_ms: Option<u32>,
    /// Whether the cue loops.
    pub looping: Option<bool>,
    /// Stop the layer instead of playing.
    pub stop: bool,
}

/// Authored quantities default to 1.
pub(crate) fn default_quantity() -> u32 {
    1
}

/// Floor a quantity at 1.
#[must_use]
pub fn normalize_quantity(quantity: Option<u32>) -> u32 {
    quantity.unwrap_or(1).max(1)
}

/// Case-insensitive string equality.
#[must_use]
pub fn same_id(a: &str, b: &str) -> bool {
    a.eq_ignore_ascii_case(b)
}

/// Treat empty and whitespace-only strings as absent.
#[must_use]
pub fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}
