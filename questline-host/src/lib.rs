//! # questline-host: Reference Host for Questline
//!
//! This crate provides the integration layer between the game-agnostic
//! `questline-core` engine and a running game session.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────┐
//! │                 Host game                     │
//! │  dialogue · rooms · combat · inventory        │
//! │        │                                      │
//! │        ▼  triggers::on_*                      │
//! │  ┌────────────────────────────────────────┐   │
//! │  │          questline-core                │   │
//! │  │   NarrativeEngine ── EffectHooks ──┐   │   │
//! │  └────────────────────────────────────┼───┘   │
//! │                                       ▼       │
//! │      Recording<LocalSession>  (journal)       │
//! └──────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - `session`: in-memory save game implementing both engine seams
//! - `journal`: capability-call recorder
//! - `triggers`: helpers mapping game happenings to dispatches
//! - `config`: content profiles, TOML loading and tracing setup

#![deny(clippy::unwrap_used)]
#![deny(missing_docs)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod config;
pub mod journal;
pub mod session;
pub mod triggers;

pub use config::{init_tracing, ContentProfile, HostConfig};
pub use journal::{HookCall, Recording};
pub use session::{LocalSession, Progress, SceneKind};
