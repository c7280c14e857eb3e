use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::ids::TourId;
use crate::tour::state::UserPreferences;

/// Durable tour record; the only data that survives a restart.
///
/// Serialized as:
///
/// ```json
/// { "completedTours": ["a", "b"],
///   "userPreferences": { "autoStart": true, "skipTutorials": false, "hasSeenWelcome": true } }
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TourProgress {
    pub completed_tours: BTreeSet<TourId>,
    pub user_preferences: UserPreferences,
}

impl TourProgress {
    /// True when the record is exactly what a fresh session starts with:
    /// no completed tours and default preferences.
    pub fn is_bootstrap_default(&self) -> bool {
        *self == Self::default()
    }
}
