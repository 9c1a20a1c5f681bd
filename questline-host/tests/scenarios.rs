//! End-to-end story scenarios: catalog JSON in, capability calls out.
//!
//! Each test wires a `NarrativeEngine` to a journaled `LocalSession` and
//! drives it through the occurrence helpers the way a game would.

use std::cell::RefCell;
use std::rc::Rc;

use questline_core::definition::ActionDefinition;
use questline_core::types::{EncounterOutcome, EventReward, RewardItem};
use questline_core::{Action, Completion, EffectHooks, EventCatalog, NarrativeEngine, Playback};
use questline_host::triggers::{
    on_dialogue_closed, on_encounter_outcome, on_enter_room, on_item_acquired, on_player_action,
    on_quest_stage_reached, on_talk_to,
};
use questline_host::{ContentProfile, HookCall, HostConfig, LocalSession, Recording, SceneKind};

type Journal = Rc<Recording<LocalSession>>;

fn start(json: &str) -> (NarrativeEngine, Journal) {
    start_with(json, LocalSession::new(), &HostConfig::default())
}

fn start_with(
    json: &str,
    session: LocalSession,
    config: &HostConfig,
) -> (NarrativeEngine, Journal) {
    let catalog = EventCatalog::from_json(json).expect("catalog");
    let journal = Rc::new(Recording::new(session));
    let engine = NarrativeEngine::new(
        catalog,
        journal.clone(),
        journal.clone(),
        config.engine.clone(),
    );
    (engine, journal)
}

fn actions(json: &str) -> Vec<Action> {
    let defs: Vec<ActionDefinition> = serde_json::from_str(json).expect("actions");
    defs.into_iter().map(Action::from).collect()
}

// ---------------------------------------------------------------------------
// Completion idempotence
// ---------------------------------------------------------------------------

#[test]
fn talking_to_jed_starts_the_quest_once() {
    let (engine, journal) = start(
        r#"[{"id": "jed_intro",
             "trigger": {"type": "talk_to", "npc": "jed"},
             "conditions": [],
             "actions": [{"type": "start_quest", "startQuest": "gather_broken_gear"}],
             "repeatable": false}]"#,
    );

    assert!(on_talk_to(&engine, "Jed").any_fired());
    assert!(!on_talk_to(&engine, "Jed").any_fired());

    let started =
        journal.count(|c| matches!(c, HookCall::StartQuest(q) if q == "gather_broken_gear"));
    assert_eq!(started, 1);
    let state = journal.inner().state();
    assert!(state.active_quests.contains("gather_broken_gear"));
    assert!(state.completed_events.contains("jed_intro"));
}

#[test]
fn repeatable_events_refire_on_every_match() {
    let (engine, journal) = start(
        r#"[{"id": "vendor_bark", "repeatable": true,
             "trigger": {"type": "dialogue_closed", "npc": "vendor"},
             "actions": [{"type": "narrate", "text": "Come back anytime."}]}]"#,
    );
    for _ in 0..4 {
        assert!(on_dialogue_closed(&engine, "VENDOR").any_fired());
    }
    assert_eq!(journal.inner().progress().messages.len(), 4);
    assert!(journal.inner().state().completed_events.is_empty());
}

#[test]
fn milestone_condition_stops_a_repeatable_room_event() {
    let (engine, journal) = start(
        r#"[{"id": "lights_out", "repeatable": true,
             "trigger": {"type": "enter_room", "roomId": "town_9"},
             "conditions": [{"type": "milestone_not_set", "milestone": "ms_lights_out_complete"}],
             "actions": [
                {"type": "toggle_room_state", "stateKey": "lights"},
                {"type": "set_milestone", "milestone": "ms_lights_out_complete"}
             ]}]"#,
    );

    assert!(on_enter_room(&engine, journal.inner(), Some("town_9")).any_fired());
    let second = on_enter_room(&engine, journal.inner(), Some("town_9"));
    assert!(!second.any_fired());
    assert_eq!(second.rejected_by_conditions, 1);

    assert!(journal.inner().progress().room_flag("town_9", "lights"));
    assert_eq!(journal.count(|c| matches!(c, HookCall::MilestoneSet(_))), 1);
}

#[test]
fn room_entry_falls_back_to_the_current_room() {
    let session = LocalSession::new();
    session.set_current_room("town_9");
    let (engine, journal) = start_with(
        r#"[{"id": "arrive", "trigger": {"type": "enter_room", "room": "town_9"},
             "actions": [{"type": "give_xp", "xp": 5}]}]"#,
        session,
        &HostConfig::default(),
    );
    assert!(on_enter_room(&engine, journal.inner(), None).any_fired());
}

// ---------------------------------------------------------------------------
// Inventory
// ---------------------------------------------------------------------------

#[test]
fn taking_a_missing_item_changes_nothing() {
    let (engine, journal) = start("[]");
    let take = actions(r#"[{"type": "take_item", "itemId": "ration_pack", "quantity": 1}]"#);

    assert!(!engine.perform_actions(&take));
    assert_eq!(
        journal.calls(),
        vec![HookCall::TakeItem {
            item_id: "ration_pack".into(),
            quantity: 1,
            removed: false
        }]
    );
    assert_eq!(journal.count(HookCall::mutates_inventory), 0);
}

#[test]
fn trade_chain_consumes_then_grants() {
    let (engine, journal) = start(
        r#"[{"id": "trade_fuse", "repeatable": true,
             "trigger": {"type": "player_action", "action": "trade", "item": "fuse"},
             "conditions": [{"type": "has_item", "item": "fuse", "quantity": 2}],
             "actions": [
                {"type": "take_item", "item": "fuse", "quantity": 2},
                {"type": "give_item", "itemId": "circuit_board"}
             ]}]"#,
    );
    journal.inner().give_item("fuse", 3);

    assert!(on_player_action(&engine, "TRADE", Some("Fuse")).any_fired());
    let again = on_player_action(&engine, "trade", Some("fuse"));
    assert_eq!(again.rejected_by_conditions, 1);

    let state = journal.inner().state();
    assert_eq!(state.item_quantity("fuse"), 1);
    assert_eq!(state.item_quantity("circuit_board"), 1);
}

#[test]
fn both_item_candidates_are_considered() {
    let (engine, journal) = start(
        r#"[
            {"id": "any_pickup", "trigger": {"type": "item_acquired", "itemId": ""},
             "actions": [{"type": "narrate", "text": "Got something."}]},
            {"id": "board_pickup", "trigger": {"type": "item_acquired", "itemId": "circuit_board"},
             "conditions": [{"type": "quest_active", "questId": "repair_generator"}],
             "actions": [{"type": "advance_quest_stage",
                          "questId": "repair_generator", "stageId": "install"}]}
        ]"#,
    );

    let first = on_item_acquired(&engine, "circuit_board", 1);
    assert_eq!(first.considered, 2);
    assert_eq!(first.fired, vec!["any_pickup"]);
    assert_eq!(first.rejected_by_conditions, 1);

    journal.inner().start_quest("repair_generator");
    let second = on_item_acquired(&engine, "Circuit_Board", 1);
    assert_eq!(second.considered, 2);
    assert_eq!(second.skipped_completed, 1);
    assert_eq!(second.fired, vec!["board_pickup"]);
    assert_eq!(
        journal.inner().state().quest_stage("repair_generator"),
        Some("install")
    );
}

// ---------------------------------------------------------------------------
// Branches
// ---------------------------------------------------------------------------

#[test]
fn false_branch_without_else_is_silent() {
    let (engine, journal) = start("[]");
    let branch = actions(
        r#"[{"type": "if_quest_active", "questId": "gather_broken_gear",
             "do": [{"type": "give_xp", "xp": 10}]}]"#,
    );
    assert!(!engine.perform_actions(&branch));
    assert!(journal.calls().is_empty());
}

#[test]
fn else_branch_runs_when_condition_fails() {
    let (engine, journal) = start("[]");
    let branch = actions(
        r#"[{"type": "if_milestone_set", "milestone": "met_mara",
             "do": [{"type": "narrate", "text": "Welcome back."}],
             "elseDo": [{"type": "narrate", "text": "Who are you?"}]}]"#,
    );
    assert!(engine.perform_actions(&branch));
    journal.inner().milestone_set("met_mara");
    assert!(engine.perform_actions(&branch));

    let texts: Vec<String> = journal
        .inner()
        .progress()
        .messages
        .into_iter()
        .map(|m| m.text)
        .collect();
    assert_eq!(texts, vec!["Who are you?", "Welcome back."]);
}

// ---------------------------------------------------------------------------
// Continuations
// ---------------------------------------------------------------------------

/// Capability set whose cinematic player fires its callback twice.
#[derive(Default)]
struct StutteringPlayer {
    xp: RefCell<Vec<i64>>,
}

impl EffectHooks for StutteringPlayer {
    fn play_cinematic(&self, _scene_id: &str, done: Completion) -> Playback {
        let callback = done.into_callback();
        callback();
        callback();
        Playback::Started
    }

    fn give_xp(&self, amount: i64) {
        self.xp.borrow_mut().push(amount);
    }
}

#[test]
fn duplicate_cinematic_callbacks_resume_once() {
    let catalog = EventCatalog::from_json("[]").expect("catalog");
    let hooks = Rc::new(StutteringPlayer::default());
    let store = Rc::new(LocalSession::new());
    let engine = NarrativeEngine::new(catalog, hooks.clone(), store, HostConfig::default().engine);

    let cinematic = actions(
        r#"[{"type": "play_cinematic", "sceneId": "scene_x",
             "onComplete": [{"type": "give_xp", "xp": 50}]}]"#,
    );
    assert!(engine.perform_actions(&cinematic));
    assert_eq!(*hooks.xp.borrow(), vec![50]);
    assert_eq!(engine.counters().continuations_resumed, 1);
}

#[test]
fn victory_cutscene_rewards_after_it_finishes() {
    let (engine, journal) = start(
        r#"[{"id": "scrapper_down",
             "trigger": {"type": "encounter_victory", "enemies": ["scrapper_boss"]},
             "actions": [
                {"type": "trigger_cutscene", "sceneId": "scene_scrapper_falls",
                 "onComplete": [
                    {"type": "give_reward", "xp": 10, "reward": {"xp": 5, "credits": 20}},
                    {"type": "complete_quest", "completeQuest": "clear_the_yard"}
                 ]}
             ]}]"#,
    );
    journal.inner().start_quest("clear_the_yard");

    let retreat = on_encounter_outcome(&engine, &["scrapper_boss"], EncounterOutcome::Retreat);
    assert!(!retreat.any_fired());

    let fought = ["grunt", "scrapper_boss"];
    let report = on_encounter_outcome(&engine, &fought, EncounterOutcome::Victory);
    assert_eq!(report.fired, vec!["scrapper_down"]);
    assert_eq!(journal.inner().pending_scenes(), 1);
    assert_eq!(journal.inner().progress().xp, 0);

    let finished = journal.inner().finish_next_scene();
    assert_eq!(finished, Some((SceneKind::Cinematic, "scene_scrapper_falls".to_string())));
    assert_eq!(
        journal.count(|c| matches!(c, HookCall::GrantReward(_))),
        1
    );
    assert!(journal.calls().contains(&HookCall::GrantReward(EventReward {
        xp: 10,
        credits: 20,
        ap: 0,
        items: Vec::<RewardItem>::new(),
    })));
    let progress = journal.inner().progress();
    assert_eq!((progress.xp, progress.credits), (10, 20));
    assert!(journal.inner().state().completed_quests.contains("clear_the_yard"));
}

#[test]
fn tutorial_continuation_sees_the_tutorial_as_completed() {
    let (engine, journal) = start(
        r#"[{"id": "first_search",
             "trigger": {"type": "player_action", "action": "search"},
             "actions": [
                {"type": "system_tutorial", "sceneId": "tut_search",
                 "onComplete": [
                    {"type": "if_tutorial_completed", "tutorialId": "tut_search",
                     "do": [{"type": "unlock_room_search", "roomId": "storage"}]}
                 ]}
             ]}]"#,
    );
    assert!(on_player_action(&engine, "search", None).any_fired());
    assert!(journal.inner().progress().searchable_rooms.is_empty());

    journal.inner().finish_next_scene();
    assert!(journal.inner().progress().searchable_rooms.contains("storage"));
}

#[test]
fn authoring_profile_finishes_scenes_inline() {
    let config = HostConfig::for_profile(ContentProfile::Authoring);
    let (engine, journal) = start_with(
        r#"[{"id": "intro", "trigger": {"type": "talk_to", "npc": "jed"},
             "actions": [{"type": "play_cinematic", "sceneId": "scene_intro",
                          "onComplete": [{"type": "give_xp", "xp": 50}]}]}]"#,
        config.new_session(),
        &config,
    );
    assert!(on_talk_to(&engine, "jed").any_fired());
    assert_eq!(journal.inner().pending_scenes(), 0);
    assert_eq!(journal.inner().progress().xp, 50);
}

// ---------------------------------------------------------------------------
// Re-entrant chains
// ---------------------------------------------------------------------------

#[test]
fn stage_reached_chains_through_player_action() {
    let (engine, journal) = start(
        r#"[
            {"id": "stage_done",
             "trigger": {"type": "quest_stage_complete", "questId": "repair_generator"},
             "actions": [{"type": "player_action", "action": "generator_online"}]},
            {"id": "lights_on", "trigger": {"type": "player_action", "action": "generator_online"},
             "actions": [{"type": "set_room_state", "roomId": "town_9", "stateKey": "lights"},
                         {"type": "add_party_member", "memberId": "mara"}]}
        ]"#,
    );
    let wrong_quest = on_quest_stage_reached(&engine, "REPAIR_GENERATOR", "done");
    assert!(!wrong_quest.any_fired());

    let report = on_quest_stage_reached(&engine, "repair_generator", "done");
    assert_eq!(report.fired, vec!["stage_done"]);
    let progress = journal.inner().progress();
    assert!(progress.room_flag("town_9", "lights"));
    assert_eq!(progress.party, vec!["mara"]);

    let completed = journal.inner().state().completed_events;
    assert!(completed.contains("stage_done") && completed.contains("lights_on"));
}

#[test]
fn authoring_profile_rejects_unknown_trigger_types() {
    let json = r#"[{"id": "typo", "trigger": {"type": "talk_too", "npc": "jed"},
                    "actions": [{"type": "give_xp", "xp": 1}]}]"#;

    let (release, _) = start(json);
    assert!(release.handle_trigger("talk_too", &questline_core::EventPayload::Empty).any_fired());

    let config = HostConfig::for_profile(ContentProfile::Authoring);
    let (strict, journal) = start_with(json, config.new_session(), &config);
    let report = strict.handle_trigger("talk_too", &questline_core::EventPayload::Empty);
    assert_eq!(report.rejected_by_trigger, 1);
    assert!(journal.calls().is_empty());
}
