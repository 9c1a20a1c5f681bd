//! # Questline Core Library
//!
//! Game-agnostic narrative rule engine for story-driven games.
//!
//! Authored story events are data: each one names a **trigger** it listens
//! for, a list of **conditions** over save-game state, and an ordered list of
//! **actions**. When the host reports an occurrence (the player talked to an
//! NPC, entered a room, won a fight), the [`NarrativeEngine`] finds the
//! matching events and interprets their actions through a set of
//! [`EffectHooks`] supplied by the host.
//!
//! - **Triggers**: talk/dialogue, room entry, player actions, quest stages,
//!   encounter outcomes, item pickups
//! - **Conditions**: milestones, quest lifecycle and stages, tasks, tutorials,
//!   completed events, inventory
//! - **Actions**: direct effects, conditional branches, and asynchronous
//!   cinematics whose continuation resumes at most once
//!
//! ## Threading
//!
//! The engine is single-threaded by construction (`Rc` handles, `!Send`).
//! It must run on the thread that owns session state.

#![deny(clippy::unwrap_used)]
#![deny(missing_docs)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod action;
pub mod catalog;
pub mod completion;
pub mod condition;
pub mod config;
pub mod continuation;
pub mod definition;
pub mod engine;
pub mod error;
pub mod hooks;
pub mod metrics;
pub mod reward;
pub mod session;
pub mod trigger;
pub mod types;

pub use action::Action;
pub use catalog::{Event, EventCatalog};
pub use condition::Condition;
pub use config::EngineConfig;
pub use continuation::{Completion, Playback};
pub use engine::{DispatchReport, NarrativeEngine, WeakEngine};
pub use error::{QuestlineError, Result};
pub use hooks::{EffectHooks, NoopHooks};
pub use session::{GameSessionState, SessionStore};
pub use trigger::Trigger;
pub use types::*;
