//! Occurrence hooks for the host game's own systems.
//!
//! Each helper turns one upstream happening (dialogue, room entry, combat
//! outcome, pickup) into the matching trigger dispatch. In a full game these
//! calls live in the dialogue system, the room-entry handler, the combat
//! reporter and the inventory ledger.

use questline_core::types::{EncounterOutcome, EventPayload};
use questline_core::{DispatchReport, NarrativeEngine};

use crate::session::LocalSession;

/// The player started talking to an NPC.
pub fn on_talk_to(engine: &NarrativeEngine, npc: &str) -> DispatchReport {
    engine.handle_trigger(
        "talk_to",
        &EventPayload::TalkedTo {
            npc: npc.to_string(),
        },
    )
}

/// A dialogue with an NPC was closed.
pub fn on_dialogue_closed(engine: &NarrativeEngine, npc: &str) -> DispatchReport {
    engine.handle_trigger(
        "dialogue_closed",
        &EventPayload::TalkedTo {
            npc: npc.to_string(),
        },
    )
}

/// The player entered a room. `None` means the session's current room.
///
/// A named room becomes the session's current room before the dispatch,
/// so room-scoped actions without an explicit room land there.
pub fn on_enter_room(
    engine: &NarrativeEngine,
    session: &LocalSession,
    room_id: Option<&str>,
) -> DispatchReport {
    if let Some(room_id) = room_id {
        session.set_current_room(room_id);
    }
    engine.handle_trigger(
        "enter_room",
        &EventPayload::EnteredRoom {
            room_id: room_id.map(str::to_string),
        },
    )
}

/// The player performed a tagged action, optionally with an item.
pub fn on_player_action(
    engine: &NarrativeEngine,
    action: &str,
    item: Option<&str>,
) -> DispatchReport {
    engine.handle_trigger(
        "player_action",
        &EventPayload::PlayerAction {
            action: action.to_string(),
            item: item.map(str::to_string),
        },
    )
}

/// A quest reached a stage.
pub fn on_quest_stage_reached(
    engine: &NarrativeEngine,
    quest_id: &str,
    stage_id: &str,
) -> DispatchReport {
    engine.handle_trigger(
        "quest_stage_complete",
        &EventPayload::QuestStageReached {
            quest_id: quest_id.to_string(),
            stage_id: stage_id.to_string(),
        },
    )
}

/// Items entered the inventory.
pub fn on_item_acquired(engine: &NarrativeEngine, item_id: &str, quantity: u32) -> DispatchReport {
    engine.handle_trigger(
        "item_acquired",
        &EventPayload::ItemAcquired {
            item_id: item_id.to_string(),
            quantity,
        },
    )
}

/// An encounter ended. Dispatches the trigger type matching `outcome`.
pub fn on_encounter_outcome(
    engine: &NarrativeEngine,
    enemy_ids: &[&str],
    outcome: EncounterOutcome,
) -> DispatchReport {
    engine.handle_trigger(
        encounter_trigger(outcome),
        &EventPayload::Encounter {
            enemy_ids: enemy_ids.iter().map(|id| (*id).to_string()).collect(),
            outcome,
        },
    )
}

/// Trigger type raised for an encounter outcome.
#[must_use]
pub fn encounter_trigger(outcome: EncounterOutcome) -> &'static str {
    match outcome {
        EncounterOutcome::Victory => "encounter_victory",
        EncounterOutcome::Defeat => "encounter_defeat",
        EncounterOutcome::Retreat => "encounter_retreat",
    }
}

#[cfg(test)]
mod tests {
    use std::rc::Rc;

    use questline_core::EventCatalog;

    use super::*;
    use crate::config::HostConfig;

    #[test]
    fn entering_a_room_makes_it_current_before_dispatch() {
        let catalog = EventCatalog::from_json(
            r#"[{"id": "dark", "trigger": {"type": "enter_room", "roomId": "cellar"},
                 "actions": [{"type": "toggle_room_state", "stateKey": "lights"}]}]"#,
        )
        .expect("catalog");
        let session = Rc::new(LocalSession::new());
        let engine = HostConfig::default().start(catalog, Rc::clone(&session));

        assert!(on_enter_room(&engine, &session, Some("cellar")).any_fired());
        assert_eq!(session.state().current_room.as_deref(), Some("cellar"));
        assert!(session.progress().room_flag("cellar", "lights"));
    }

    #[test]
    fn unnamed_entry_keeps_the_current_room() {
        let session = Rc::new(LocalSession::new());
        session.set_current_room("town_9");
        let engine = HostConfig::default().start(EventCatalog::default(), Rc::clone(&session));

        assert!(!on_enter_room(&engine, &session, None).any_fired());
        assert_eq!(session.state().current_room.as_deref(), Some("town_9"));
    }

    #[test]
    fn encounter_outcomes_map_to_trigger_types() {
        assert_eq!(encounter_trigger(EncounterOutcome::Victory), "encounter_victory");
        assert_eq!(encounter_trigger(EncounterOutcome::Defeat), "encounter_defeat");
        assert_eq!(encounter_trigger(EncounterOutcome::Retreat), "encounter_retreat");
    }
}
