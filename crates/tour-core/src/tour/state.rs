use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::ids::TourId;
use crate::tour::progress::TourProgress;

/// Durable user preferences controlling when tours may run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct UserPreferences {
    pub auto_start: bool,
    pub skip_tutorials: bool,
    pub has_seen_welcome: bool,
}

impl Default for UserPreferences {
    fn default() -> Self {
        Self {
            auto_start: true,
            skip_tutorials: false,
            has_seen_welcome: false,
        }
    }
}

/// Addresses a single field of [`UserPreferences`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum PreferenceKey {
    AutoStart,
    SkipTutorials,
    HasSeenWelcome,
}

impl PreferenceKey {
    pub const ALL: [PreferenceKey; 3] = [
        PreferenceKey::AutoStart,
        PreferenceKey::SkipTutorials,
        PreferenceKey::HasSeenWelcome,
    ];
}

impl UserPreferences {
    pub fn get(&self, key: PreferenceKey) -> bool {
        match key {
            PreferenceKey::AutoStart => self.auto_start,
            PreferenceKey::SkipTutorials => self.skip_tutorials,
            PreferenceKey::HasSeenWelcome => self.has_seen_welcome,
        }
    }

    pub fn set(&mut self, key: PreferenceKey, value: bool) {
        match key {
            PreferenceKey::AutoStart => self.auto_start = value,
            PreferenceKey::SkipTutorials => self.skip_tutorials = value,
            PreferenceKey::HasSeenWelcome => self.has_seen_welcome = value,
        }
    }
}

/// Engine-owned tour state, one instance per session.
///
/// Invariant: `is_active == false` iff `current_step == 0`, `total_steps == 0`
/// and `current_tour_id` is `None`. While active, `current_step < total_steps`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TourState {
    pub is_active: bool,
    pub current_tour_id: Option<TourId>,
    pub current_step: usize,
    pub total_steps: usize,
    pub completed_tours: BTreeSet<TourId>,
    pub user_preferences: UserPreferences,
    pub is_navigating: bool,
}

impl TourState {
    pub fn is_tour_completed(&self, tour_id: &TourId) -> bool {
        self.completed_tours.contains(tour_id)
    }

    /// Durable subset of the state.
    pub fn progress(&self) -> TourProgress {
        TourProgress {
            completed_tours: self.completed_tours.clone(),
            user_preferences: self.user_preferences,
        }
    }

    pub(crate) fn clear_activation(&mut self) {
        self.is_active = false;
        self.current_tour_id = None;
        self.current_step = 0;
        self.total_steps = 0;
        self.is_navigating = false;
    }
}
