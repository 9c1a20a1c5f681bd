//! Host-side configuration: content profiles and logging setup.
//!
//! A [`ContentProfile`] picks engine settings suited to how content is
//! being run. Shipping builds keep the permissive defaults; authoring
//! builds fail loudly on typos in authored type strings and trace every
//! dispatch decision.

use std::rc::Rc;

use questline_core::config::{EngineConfig, GeneralConfig, UnknownTypePolicy};
use questline_core::{EventCatalog, NarrativeEngine, QuestlineError, Result};
use serde::{Deserialize, Serialize};
use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::session::LocalSession;

// ---------------------------------------------------------------------------
// Content Profiles
// ---------------------------------------------------------------------------

/// How authored content is being run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContentProfile {
    /// Shipping build: unknown types keep their permissive defaults.
    #[default]
    Release,
    /// Writers' build: unknown types are rejected and dispatch is traced.
    Authoring,
}

impl ContentProfile {
    /// Get a human-readable description.
    #[must_use]
    pub fn description(self) -> &'static str {
        match self {
            Self::Release => "Release: permissive unknown types, scenes driven by the game",
            Self::Authoring => "Authoring: strict unknown types, dispatch tracing, instant scenes",
        }
    }
}

// ---------------------------------------------------------------------------
// Host Configuration
// ---------------------------------------------------------------------------

/// Engine configuration plus host-only settings.
#[derive(Debug, Clone)]
pub struct HostConfig {
    /// Active profile.
    pub profile: ContentProfile,
    /// Engine settings.
    pub engine: EngineConfig,
    /// Finish cinematics and tutorials as soon as they are requested.
    pub auto_complete_scenes: bool,
}

#[derive(Debug, Default, Deserialize)]
struct HostSection {
    #[serde(default)]
    profile: ContentProfile,
    auto_complete_scenes: Option<bool>,
}

impl HostConfig {
    /// Create a config tuned for the given profile.
    #[must_use]
    pub fn for_profile(profile: ContentProfile) -> Self {
        let mut engine = EngineConfig::default();
        let auto_complete_scenes = match profile {
            ContentProfile::Release => false,
            ContentProfile::Authoring => {
                engine.general.log_level = "debug".to_string();
                engine.dispatch.unknown_triggers = UnknownTypePolicy::Deny;
                engine.dispatch.unknown_conditions = UnknownTypePolicy::Deny;
                engine.diagnostics.warn_unknown_types = true;
                engine.diagnostics.trace_dispatch = true;
                true
            }
        };
        Self {
            profile,
            engine,
            auto_complete_scenes,
        }
    }

    /// Load from TOML.
    ///
    /// `[host] profile` selects the preset; any engine section present in
    /// the document (`[general]`, `[dispatch]`, `[diagnostics]`) replaces
    /// the preset's version of that section.
    ///
    /// # Errors
    /// Returns `QuestlineError::Config` if the TOML is invalid or fails validation.
    pub fn from_toml(toml_str: &str) -> Result<Self> {
        let table: toml::Table = toml::from_str(toml_str).map_err(config_error)?;
        let host: HostSection = match table.get("host") {
            Some(section) => section.clone().try_into().map_err(config_error)?,
            None => HostSection::default(),
        };
        let authored = EngineConfig::from_toml(toml_str)?;

        let mut config = Self::for_profile(host.profile);
        if table.contains_key("general") {
            config.engine.general = authored.general;
        }
        if table.contains_key("dispatch") {
            config.engine.dispatch = authored.dispatch;
        }
        if table.contains_key("diagnostics") {
            config.engine.diagnostics = authored.diagnostics;
        }
        if let Some(auto) = host.auto_complete_scenes {
            config.auto_complete_scenes = auto;
        }
        config.engine.validate()?;
        Ok(config)
    }

    /// Load from a TOML file.
    ///
    /// # Errors
    /// Returns an error if the file cannot be read or parsed.
    pub fn from_file(path: &std::path::Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml(&content)
    }

    /// A fresh session honoring `auto_complete_scenes`.
    #[must_use]
    pub fn new_session(&self) -> LocalSession {
        let session = LocalSession::new();
        if self.auto_complete_scenes {
            session.auto_completing()
        } else {
            session
        }
    }

    /// Wire an engine to `session` with this configuration.
    #[must_use]
    pub fn start(&self, catalog: EventCatalog, session: Rc<LocalSession>) -> NarrativeEngine {
        info!(
            profile = self.profile.description(),
            events = catalog.len(),
            auto_complete_scenes = self.auto_complete_scenes,
            "Starting narrative engine"
        );
        NarrativeEngine::new(catalog, session.clone(), session, self.engine.clone())
    }
}

impl Default for HostConfig {
    fn default() -> Self {
        Self::for_profile(ContentProfile::default())
    }
}

fn config_error(err: impl std::fmt::Display) -> QuestlineError {
    QuestlineError::Config(err.to_string())
}

// ---------------------------------------------------------------------------
// Logging
// ---------------------------------------------------------------------------

/// Install a global `tracing` subscriber.
///
/// `RUST_LOG` wins over `general.log_level` when set.
///
/// # Errors
/// Returns `QuestlineError::Config` if a global subscriber is already installed.
pub fn init_tracing(general: &GeneralConfig) -> Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&general.log_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .try_init()
        .map_err(config_error)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn release_profile_keeps_permissive_defaults() {
        let config = HostConfig::for_profile(ContentProfile::Release);
        assert_eq!(config.engine.dispatch.unknown_triggers, UnknownTypePolicy::Allow);
        assert!(!config.engine.diagnostics.trace_dispatch);
        assert!(!config.auto_complete_scenes);
    }

    #[test]
    fn authoring_profile_is_strict() {
        let config = HostConfig::for_profile(ContentProfile::Authoring);
        assert_eq!(config.engine.dispatch.unknown_conditions, UnknownTypePolicy::Deny);
        assert!(config.engine.diagnostics.trace_dispatch);
        assert_eq!(config.engine.general.log_level, "debug");
    }

    #[test]
    fn toml_sections_override_the_preset() {
        let config = HostConfig::from_toml(
            r#"
            [host]
            profile = "authoring"
            auto_complete_scenes = false

            [dispatch]
            max_depth = 3
            "#,
        )
        .expect("config");
        assert_eq!(config.profile, ContentProfile::Authoring);
        assert!(!config.auto_complete_scenes);
        assert_eq!(config.engine.dispatch.max_depth, 3);
        // [dispatch] replaced the preset, so its policies are back to defaults.
        assert_eq!(config.engine.dispatch.unknown_triggers, UnknownTypePolicy::Allow);
        // [diagnostics] was absent, so the preset stands.
        assert!(config.engine.diagnostics.trace_dispatch);
    }

    #[test]
    fn profiles_describe_themselves() {
        assert!(ContentProfile::Release.description().starts_with("Release"));
        assert!(ContentProfile::Authoring.description().contains("strict"));
    }

    #[test]
    fn start_wires_the_session_as_store() {
        let config = HostConfig::for_profile(ContentProfile::Authoring);
        let session = Rc::new(config.new_session());
        let catalog = EventCatalog::from_json(
            r#"[{"id": "hi", "trigger": {"type": "talk_to", "npc": "jed"},
                 "actions": [{"type": "give_xp", "xp": 3}]}]"#,
        )
        .expect("catalog");
        let engine = config.start(catalog, Rc::clone(&session));

        let payload = questline_core::types::EventPayload::TalkedTo { npc: "jed".into() };
        assert!(engine.handle_trigger("talk_to", &payload).any_fired());
        assert_eq!(session.progress().xp, 3);
        assert!(session.state().completed_events.contains("hi"));
    }

    #[test]
    fn empty_toml_is_release() {
        let config = HostConfig::from_toml("").expect("config");
        assert_eq!(config.profile, ContentProfile::Release);
    }

    #[test]
    fn rejects_bad_profile_and_zero_depth() {
        assert!(HostConfig::from_toml("[host]\nprofile = \"turbo\"").is_err());
        assert!(HostConfig::from_toml("[dispatch]\nmax_depth = 0").is_err());
    }

    #[test]
    fn loads_from_file() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("questline.toml");
        std::fs::write(&path, "[host]\nprofile = \"authoring\"\n").expect("write");
        let config = HostConfig::from_file(&path).expect("config");
        assert_eq!(config.profile, ContentProfile::Authoring);
        assert!(config.auto_complete_scenes);
    }
}
