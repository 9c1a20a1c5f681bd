//! Configuration for the Questline engine.
//!
//! Maps directly to `questline.toml`. Every section and field is optional;
//! an empty document yields the defaults below.

use serde::{Deserialize, Serialize};

use crate::error::{QuestlineError, Result};

/// Top-level engine configuration, loadable from TOML.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EngineConfig {
    /// General settings.
    #[serde(default)]
    pub general: GeneralConfig,
    /// Trigger dispatch behavior.
    #[serde(default)]
    pub dispatch: DispatchConfig,
    /// Diagnostic logging of authored content.
    #[serde(default)]
    pub diagnostics: DiagnosticsConfig,
}

impl EngineConfig {
    /// Load configuration from a TOML string.
    ///
    /// # Errors
    /// Returns `QuestlineError::Config` if the TOML is invalid or fails validation.
    pub fn from_toml(toml_str: &str) -> Result<Self> {
        let config: Self =
            toml::from_str(toml_str).map_err(|e| QuestlineError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a TOML file.
    ///
    /// # Errors
    /// Returns an error if the file cannot be read or parsed.
    pub fn from_file(path: &std::path::Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml(&content)
    }

    /// Check invariants serde cannot express.
    ///
    /// # Errors
    /// Returns `QuestlineError::Config` when `dispatch.max_depth` is zero.
    pub fn validate(&self) -> Result<()> {
        if self.dispatch.max_depth == 0 {
            return Err(QuestlineError::Config(
                "dispatch.max_depth must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Sub-configs
// ---------------------------------------------------------------------------

/// General system settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeneralConfig {
    /// Log level directive: trace, debug, info, warn, error.
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
        }
    }
}

/// How the engine treats authored type strings it does not recognise.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UnknownTypePolicy {
    /// Unknown triggers match and unknown conditions pass.
    #[default]
    Allow,
    /// Unknown triggers never match and unknown conditions fail.
    Deny,
}

impl UnknownTypePolicy {
    /// The boolean an unknown trigger or condition evaluates to.
    #[must_use]
    pub fn verdict(self) -> bool {
        matches!(self, Self::Allow)
    }
}

/// Trigger dispatch settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DispatchConfig {
    /// Maximum nesting of re-entrant `handle_trigger` calls.
    #[serde(default = "default_max_depth")]
    pub max_depth: u32,
    /// Policy for trigger types outside the known vocabulary.
    #[serde(default)]
    pub unknown_triggers: UnknownTypePolicy,
    /// Policy for condition types outside the known vocabulary.
    #[serde(default)]
    pub unknown_conditions: UnknownTypePolicy,
}

impl Default for DispatchConfig {
    fn default() -> Self {
        Self {
            max_depth: default_max_depth(),
            unknown_triggers: UnknownTypePolicy::Allow,
            unknown_conditions: UnknownTypePolicy::Allow,
        }
    }
}

/// Diagnostic logging settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DiagnosticsConfig {
    /// Emit a warning whenever authored data carries an unknown type string.
    #[serde(default = "default_true")]
    pub warn_unknown_types: bool,
    /// Log every candidate decision at debug level.
    #[serde(default)]
    pub trace_dispatch: bool,
}

impl Default for DiagnosticsConfig {
    fn default() -> Self {
        Self {
            warn_unknown_types: true,
            trace_dispatch: false,
        }
    }
}

// ---------------------------------------------------------------------------
// Serde default helpers
// ---------------------------------------------------------------------------

fn default_true() -> bool { true }
fn default_log_level() -> String { "info".to_string() }
fn default_max_depth() -> u32 { 8 }

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_document_yields_defaults() {
        let config = EngineConfig::from_toml("").expect("empty toml");
        assert_eq!(config.general.log_level, "info");
        assert_eq!(config.dispatch.max_depth, 8);
        assert_eq!(config.dispatch.unknown_triggers, UnknownTypePolicy::Allow);
        assert!(config.diagnostics.warn_unknown_types);
        assert!(!config.diagnostics.trace_dispatch);
    }

    #[test]
    fn parses_policies() {
        let config = EngineConfig::from_toml(
            r#"
            [dispatch]
            max_depth = 3
            unknown_triggers = "deny"
            "#,
        )
        .expect("valid toml");
        assert_eq!(config.dispatch.max_depth, 3);
        assert_eq!(config.dispatch.unknown_triggers, UnknownTypePolicy::Deny);
        assert_eq!(config.dispatch.unknown_conditions, UnknownTypePolicy::Allow);
        assert!(!config.dispatch.unknown_triggers.verdict());
    }

    #[test]
    fn zero_depth_is_rejected() {
        let err = EngineConfig::from_toml("[dispatch]\nmax_depth = 0\n");
        assert!(matches!(err, Err(QuestlineError::Config(_))));
    }

    #[test]
    fn invalid_toml_is_config_error() {
        let err = EngineConfig::from_toml("[dispatch\n");
        assert!(matches!(err, Err(QuestlineError::Config(_))));
    }
}
