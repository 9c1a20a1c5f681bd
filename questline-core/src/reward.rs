//! Reward Merger: combines inline shorthand fields with a reward template.
//!
//! Authored content either embeds a full `reward` object or spreads
//! `xp`/`credits`/`ap`/`items` directly on the action. Each shorthand field
//! that is present overrides the template independently.

use crate::definition::ActionDefinition;
use crate::types::{EventReward, RewardItem};

/// The reward-bearing fields of an action.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RewardSpec {
    /// Base template; all-zero when absent.
    pub base: Option<EventReward>,
    /// Override for `xp`.
    pub xp: Option<i64>,
    /// Override for `credits`.
    pub credits: Option<i64>,
    /// Override for `ap`.
    pub ap: Option<i64>,
    /// Override for `items`.
    pub items: Option<Vec<RewardItem>>,
}

impl From<&ActionDefinition> for RewardSpec {
    fn from(def: &ActionDefinition) -> Self {
        Self {
            base: def.reward.clone(),
            xp: def.xp,
            credits: def.credits,
            ap: def.ap,
            items: def.items.clone(),
        }
    }
}

/// Merge `spec` into a concrete reward, field by field.
#[must_use]
pub fn to_reward(spec: &RewardSpec) -> EventReward {
    let mut reward = spec.base.clone().unwrap_or_default();
    if let Some(xp) = spec.xp {
        reward.xp = xp;
    }
    if let Some(credits) = spec.credits {
        reward.credits = credits;
    }
    if let Some(ap) = spec.ap {
        reward.ap = ap;
    }
    if let Some(items) = &spec.items {
        reward.items.clone_from(items);
    }
    reward
}
