//! Event Catalog: the load-once list of authored events.
//!
//! Events are indexed by lower-cased trigger type so a dispatch only looks
//! at its own candidates, in catalog order.

use std::collections::{HashMap, HashSet};

use serde::Deserialize;
use tracing::info;

use crate::action::Action;
use crate::condition::Condition;
use crate::definition::{type_key, EventDefinition};
use crate::error::{QuestlineError, Result};
use crate::trigger::{Trigger, TriggerKind};

/// One authored story event, compiled.
#[derive(Debug, Clone, PartialEq)]
pub struct Event {
    /// Unique id; blank ids are never marked completed.
    pub id: String,
    /// What the event listens for.
    pub trigger: Trigger,
    /// Preconditions, AND-ed.
    pub conditions: Vec<Condition>,
    /// Effects, in order.
    pub actions: Vec<Action>,
    /// Whether the event may fire more than once.
    pub repeatable: bool,
}

impl Event {
    /// Whether the id is blank.
    #[must_use]
    pub fn has_id(&self) -> bool {
        !self.id.trim().is_empty()
    }

    /// Every type string in this event that fell outside the vocabulary.
    #[must_use]
    pub fn unknown_types(&self) -> Vec<String> {
        let mut unknown = Vec::new();
        if let TriggerKind::Other(kind) = &self.trigger.kind {
            unknown.push(format!("trigger:{kind}"));
        }
        for condition in &self.conditions {
            if let Condition::Unknown(kind) = condition {
                unknown.push(format!("condition:{kind}"));
            }
        }
        collect_unknown_actions(&self.actions, &mut unknown);
        unknown
    }
}

fn collect_unknown_actions(actions: &[Action], out: &mut Vec<String>) {
    for action in actions {
        if let Action::Unknown(kind) = action {
            out.push(format!("action:{kind}"));
        }
        for child in action.children() {
            collect_unknown_actions(child, out);
        }
    }
}

impl From<EventDefinition> for Event {
    fn from(def: EventDefinition) -> Self {
        Self {
            id: def.id.trim().to_string(),
            trigger: Trigger::from(def.trigger),
            conditions: def.conditions.into_iter().map(Condition::from).collect(),
            actions: def.actions.into_iter().map(Action::from).collect(),
            repeatable: def.repeatable,
        }
    }
}

/// Accepted top-level JSON shapes.
#[derive(Deserialize)]
#[serde(untagged)]
enum CatalogDocument {
    List(Vec<EventDefinition>),
    Wrapped { events: Vec<EventDefinition> },
}

/// Immutable, indexed event list.
#[derive(Debug, Clone, Default)]
pub struct EventCatalog {
    events: Vec<Event>,
    by_trigger: HashMap<String, Vec<usize>>,
}

impl EventCatalog {
    /// Index `events`.
    ///
    /// # Errors
    /// Returns `QuestlineError::DuplicateEventId` if two events share a
    /// non-blank id.
    pub fn new(events: Vec<Event>) -> Result<Self> {
        let mut seen = HashSet::new();
        let mut by_trigger: HashMap<String, Vec<usize>> = HashMap::new();
        for (index, event) in events.iter().enumerate() {
            if event.has_id() && !seen.insert(event.id.as_str()) {
                return Err(QuestlineError::DuplicateEventId(event.id.clone()));
            }
            by_trigger
                .entry(event.trigger.type_key.clone())
                .or_default()
                .push(index);
        }
        info!(
            events = events.len(),
            trigger_types = by_trigger.len(),
            "Event catalog indexed"
        );
        Ok(Self { events, by_trigger })
    }

    /// Compile and index authored definitions.
    ///
    /// # Errors
    /// See [`EventCatalog::new`].
    pub fn from_definitions(definitions: Vec<EventDefinition>) -> Result<Self> {
        Self::new(definitions.into_iter().map(Event::from).collect())
    }

    /// Parse a JSON array of events, or an object with an `events` array.
    ///
    /// # Errors
    /// Returns `QuestlineError::Definition` on malformed JSON and
    /// `QuestlineError::DuplicateEventId` on id collisions.
    pub fn from_json(json: &str) -> Result<Self> {
        let definitions = match serde_json::from_str::<CatalogDocument>(json)? {
            CatalogDocument::List(list) => list,
            CatalogDocument::Wrapped { events } => events,
        };
        Self::from_definitions(definitions)
    }

    /// Candidate events for a trigger type, in catalog order.
    pub fn candidates(&self, trigger_type: &str) -> impl Iterator<Item = &Event> {
        self.candidate_indices(trigger_type)
            .iter()
            .map(|&index| &self.events[index])
    }

    /// Catalog positions of the candidates for a trigger type.
    pub(crate) fn candidate_indices(&self, trigger_type: &str) -> &[usize] {
        self.by_trigger
            .get(&type_key(trigger_type))
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    /// Event at a catalog position.
    pub(crate) fn event_at(&self, index: usize) -> &Event {
        &self.events[index]
    }

    /// Look up an event by id.
    #[must_use]
    pub fn get(&self, id: &str) -> Option<&Event> {
        self.events.iter().find(|e| e.has_id() && e.id == id)
    }

    /// All events, in catalog order.
    pub fn iter(&self) -> impl Iterator<Item = &Event> {
        self.events.iter()
    }

    /// Number of events.
    #[must_use]
    pub fn len(&self) -> usize {
        self.events.len()
    }

    /// Whether the catalog is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const JSON: &str = r#"[
        {"id": "a", "trigger": {"type": "item_acquired"},
         "actions": [{"type": "give_xp", "xp": 1}]},
        {"id": "b", "trigger": {"type": "talk_to", "npc": "jed"}},
        {"id": "c", "trigger": {"type": "Item_Acquired", "itemId": "circuit_board"}}
    ]"#;

    #[test]
    fn indexes_by_lowercase_trigger_type_in_order() {
        let catalog = EventCatalog::from_json(JSON).expect("catalog");
        assert_eq!(catalog.len(), 3);
        let ids: Vec<&str> = catalog.candidates("ITEM_ACQUIRED").map(|e| e.id.as_str()).collect();
        assert_eq!(ids, vec!["a", "c"]);
        assert_eq!(catalog.candidates("enter_room").count(), 0);
    }

    #[test]
    fn accepts_wrapped_document() {
        let wrapped = format!(r#"{{"events": {JSON}}}"#);
        let catalog = EventCatalog::from_json(&wrapped).expect("catalog");
        assert!(catalog.get("b").is_some());
    }

    #[test]
    fn rejects_duplicate_ids_but_allows_blank_ones() {
        let dup = r#"[{"id": "x", "trigger": {"type": "a"}},
                      {"id": "x", "trigger": {"type": "b"}}]"#;
        assert!(matches!(
            EventCatalog::from_json(dup),
            Err(QuestlineError::DuplicateEventId(id)) if id == "x"
        ));
        let blanks = r#"[{"id": "", "trigger": {"type": "a"}}, {"trigger": {"type": "a"}}]"#;
        let catalog = EventCatalog::from_json(blanks).expect("blank ids are allowed");
        assert_eq!(catalog.candidates("a").count(), 2);
        assert!(catalog.get("").is_none());
    }

    #[test]
    fn malformed_json_is_definition_error() {
        assert!(matches!(
            EventCatalog::from_json("{not json"),
            Err(QuestlineError::Definition(_))
        ));
    }

    #[test]
    fn reports_unknown_types() {
        let json = r#"[{"id": "u", "trigger": {"type": "moon"},
            "conditions": [{"type": "weather"}],
            "actions": [{"type": "if_quest_active", "questId": "q", "do": [{"type": "dance"}]}]}]"#;
        let catalog = EventCatalog::from_json(json).expect("catalog");
        let event = catalog.get("u").expect("event");
        assert_eq!(
            event.unknown_types(),
            vec!["trigger:moon", "condition:weather", "action:dance"]
        );
    }
}
