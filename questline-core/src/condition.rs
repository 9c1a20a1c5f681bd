//! Condition Evaluator: read-only preconditions over the session snapshot.
//!
//! A condition list is an implicit AND; the empty list holds vacuously.

use crate::config::UnknownTypePolicy;
use crate::definition::{first_present, type_key, ConditionDefinition};
use crate::session::GameSessionState;
use crate::types::{normalize_quantity, same_id};

/// A compiled precondition.
///
/// Missing ids compile to empty strings, which never name real state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Condition {
    /// Milestone has been set.
    MilestoneSet(String),
    /// Milestone has not been set.
    MilestoneNotSet(String),
    /// Quest is in progress.
    QuestActive(String),
    /// Quest is neither active, completed nor failed.
    QuestNotStarted(String),
    /// Quest has been completed.
    QuestCompleted(String),
    /// Quest has not been completed.
    QuestNotCompleted(String),
    /// Quest has been failed.
    QuestFailed(String),
    /// Quest sits at the given stage (case-insensitive).
    QuestStage {
        /// Quest id.
        quest_id: String,
        /// Expected stage id.
        stage_id: String,
    },
    /// Quest is not at the given stage; vacuously true when either id is blank.
    QuestStageNot {
        /// Quest id.
        quest_id: String,
        /// Excluded stage id.
        stage_id: String,
    },
    /// Quest task is done.
    QuestTaskDone {
        /// Quest id.
        quest_id: String,
        /// Task id.
        task_id: String,
    },
    /// Quest task is not done.
    QuestTaskNotDone {
        /// Quest id.
        quest_id: String,
        /// Task id.
        task_id: String,
    },
    /// A non-repeatable event has fired.
    EventCompleted(String),
    /// A non-repeatable event has not fired.
    EventNotCompleted(String),
    /// Tutorial was completed or seen.
    TutorialCompleted(String),
    /// Tutorial was neither completed nor seen.
    TutorialNotCompleted(String),
    /// Inventory holds at least `quantity` of the item.
    HasItem {
        /// Item id, compared case-insensitively.
        item_id: String,
        /// Minimum quantity, at least 1.
        quantity: u32,
    },
    /// Inventory holds fewer than `quantity` of the item.
    LacksItem {
        /// Item id, compared case-insensitively.
        item_id: String,
        /// Threshold quantity, at least 1.
        quantity: u32,
    },
    /// Unrecognised type string.
    Unknown(String),
}

impl Condition {
    /// Compile from a lower-cased type key and its authored fields, or
    /// `None` if the key is outside the vocabulary.
    #[must_use]
    pub fn parse(key: &str, def: &ConditionDefinition) -> Option<Self> {
        let field =
            |value: &Option<String>| first_present(value.as_ref(), None).unwrap_or_default();
        let quest = field(&def.quest_id);
        let item_id = first_present(def.item_id.as_ref(), def.item.as_ref()).unwrap_or_default();
        let quantity = normalize_quantity(def.quantity);

        let condition = match key {
            "milestone_set" | "milestone" | "has_milestone" => {
                Self::MilestoneSet(field(&def.milestone))
            }
            "milestone_not_set" => Self::MilestoneNotSet(field(&def.milestone)),
            "quest_active" => Self::QuestActive(quest),
            "quest_not_started" => Self::QuestNotStarted(quest),
            "quest_completed" => Self::QuestCompleted(quest),
            "quest_not_completed" => Self::QuestNotCompleted(quest),
            "quest_failed" => Self::QuestFailed(quest),
            "quest_stage" | "quest_stage_equals" => Self::QuestStage {
                quest_id: quest,
                stage_id: field(&def.stage_id),
            },
            "quest_stage_not" | "quest_stage_not_equals" => Self::QuestStageNot {
                quest_id: quest,
                stage_id: field(&def.stage_id),
            },
            "quest_task_done" | "quest_task_complete" => Self::QuestTaskDone {
                quest_id: quest,
                task_id: field(&def.task_id),
            },
            "quest_task_not_done" => Self::QuestTaskNotDone {
                quest_id: quest,
                task_id: field(&def.task_id),
            },
            "event_completed" => Self::EventCompleted(field(&def.event_id)),
            "event_not_completed" => Self::EventNotCompleted(field(&def.event_id)),
            "tutorial_completed" | "tutorial_seen" => {
                Self::TutorialCompleted(field(&def.tutorial_id))
            }
            "tutorial_not_completed" => Self::TutorialNotCompleted(field(&def.tutorial_id)),
            "item" | "has_item" => Self::HasItem { item_id, quantity },
            "item_not" | "missing_item" => Self::LacksItem { item_id, quantity },
            _ => return None,
        };
        Some(condition)
    }

    /// Evaluate against a snapshot; `None` for unknown types.
    #[must_use]
    pub fn evaluate(&self, state: &GameSessionState) -> Option<bool> {
        let verdict = match self {
            Self::MilestoneSet(id) => state.milestones.contains(id),
            Self::MilestoneNotSet(id) => !state.milestones.contains(id),
            Self::QuestActive(id) => state.active_quests.contains(id),
            Self::QuestNotStarted(id) => state.quest_not_started(id),
            Self::QuestCompleted(id) => state.completed_quests.contains(id),
            Self::QuestNotCompleted(id) => !state.completed_quests.contains(id),
            Self::QuestFailed(id) => state.failed_quests.contains(id),
            Self::QuestStage { quest_id, stage_id } => {
                !quest_id.is_empty()
                    && !stage_id.is_empty()
                    && state
                        .quest_stage(quest_id)
                        .is_some_and(|current| same_id(current, stage_id))
            }
            Self::QuestStageNot { quest_id, stage_id } => {
                quest_id.is_empty()
                    || stage_id.is_empty()
                    || !state
                        .quest_stage(quest_id)
                        .is_some_and(|current| same_id(current, stage_id))
            }
            Self::QuestTaskDone { quest_id, task_id } => state.task_done(quest_id, task_id),
            Self::QuestTaskNotDone { quest_id, task_id } => !state.task_done(quest_id, task_id),
            Self::EventCompleted(id) => state.completed_events.contains(id),
            Self::EventNotCompleted(id) => !state.completed_events.contains(id),
            Self::TutorialCompleted(id) => state.tutorials.contains(id),
            Self::TutorialNotCompleted(id) => !state.tutorials.contains(id),
            Self::HasItem { item_id, quantity } => state.item_quantity(item_id) >= *quantity,
            Self::LacksItem { item_id, quantity } => state.item_quantity(item_id) < *quantity,
            Self::Unknown(_) => return None,
        };
        Some(verdict)
    }

    /// Evaluate, resolving unknown types through `unknown`.
    #[must_use]
    pub fn holds(&self, state: &GameSessionState, unknown: UnknownTypePolicy) -> bool {
        self.evaluate(state).unwrap_or_else(|| unknown.verdict())
    }
}

impl From<ConditionDefinition> for Condition {
    fn from(def: ConditionDefinition) -> Self {
        let key = type_key(&def.kind);
        Self::parse(&key, &def).unwrap_or(Self::Unknown(key))
    }
}

/// Conjunction of `conditions`; unknown types pass.
#[must_use]
pub fn satisfied(conditions: &[Condition], state: &GameSessionState) -> bool {
    satisfied_with(conditions, state, UnknownTypePolicy::Allow)
}

/// [`satisfied`] with an explicit verdict for unknown condition types.
#[must_use]
pub fn satisfied_with(
    conditions: &[Condition],
    state: &GameSessionState,
    unknown: UnknownTypePolicy,
) -> bool {
    conditions.iter().all(|c| c.holds(state, unknown))
}
