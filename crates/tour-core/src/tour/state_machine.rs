//! Tour state machine.
//!
//! Defines a pure state transition function for tour activation and step
//! movement. Navigation waits, hooks and persistence are side effects executed
//! by the orchestrator; this module only decides what the next state is.

use tracing::debug;

use crate::ids::TourId;
use crate::tour::state::{PreferenceKey, TourState};

/// Events that drive the tour state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TourEvent {
    /// Activate a tour with the given number of steps.
    Start { tour_id: TourId, total_steps: usize },
    /// Move to the next step, completing the tour past the last one.
    Advance,
    /// Move to the previous step, floored at the first one.
    Back,
    /// User dismissed the tour.
    Skip,
    /// Programmatic termination.
    End,
    /// A navigation wait began.
    NavigationStarted,
    /// A navigation wait resolved (reached, timed out or cancelled).
    NavigationSettled,
    SetPreference { key: PreferenceKey, value: bool },
    MarkCompleted { tour_id: TourId },
}

/// Why an active tour returned to idle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FinishReason {
    Completed,
    Skipped,
    Ended,
}

/// Side-effects produced by state transitions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TourAction {
    Started { tour_id: TourId },
    Finished { tour_id: TourId, reason: FinishReason },
    /// Durable fields changed and should be written behind.
    PersistProgress,
}

/// Pure tour state machine: no side effects.
pub struct TourStateMachine;

impl TourStateMachine {
    pub fn transition(mut state: TourState, event: TourEvent) -> (TourState, Vec<TourAction>) {
        match event {
            TourEvent::Start {
                tour_id,
                total_steps,
            } => {
                if let Some(reason) = Self::start_blocker(&state, &tour_id, total_steps) {
                    debug!(tour_id = %tour_id, reason, "tour start ignored");
                    return (state, Vec::new());
                }
                state.is_active = true;
                state.current_tour_id = Some(tour_id.clone());
                state.current_step = 0;
                state.total_steps = total_steps;
                state.is_navigating = false;
                (state, vec![TourAction::Started { tour_id }])
            }
            TourEvent::Advance if state.is_active => {
                let next = state.current_step + 1;
                if next >= state.total_steps {
                    return Self::finish(state, FinishReason::Completed);
                }
                state.current_step = next;
                (state, Vec::new())
            }
            TourEvent::Back if state.is_active => {
                state.current_step = state.current_step.saturating_sub(1);
                (state, Vec::new())
            }
            TourEvent::Skip if state.is_active => {
                state.user_preferences.has_seen_welcome = true;
                Self::finish(state, FinishReason::Skipped)
            }
            TourEvent::End if state.is_active => {
                state.user_preferences.has_seen_welcome = true;
                Self::finish(state, FinishReason::Ended)
            }
            TourEvent::NavigationStarted if state.is_active => {
                state.is_navigating = true;
                (state, Vec::new())
            }
            TourEvent::NavigationSettled => {
                state.is_navigating = false;
                (state, Vec::new())
            }
            TourEvent::SetPreference { key, value } => {
                state.user_preferences.set(key, value);
                (state, vec![TourAction::PersistProgress])
            }
            TourEvent::MarkCompleted { tour_id } => {
                state.completed_tours.insert(tour_id);
                (state, vec![TourAction::PersistProgress])
            }
            event => {
                debug!(?event, "tour event ignored while idle");
                (state, Vec::new())
            }
        }
    }

    fn start_blocker(state: &TourState, tour_id: &TourId, total_steps: usize) -> Option<&'static str> {
        if state.user_preferences.skip_tutorials {
            Some("tutorials disabled")
        } else if state.is_tour_completed(tour_id) {
            Some("already completed")
        } else if state.is_active {
            Some("another tour is active")
        } else if total_steps == 0 {
            Some("empty step list")
        } else {
            None
        }
    }

    fn finish(mut state: TourState, reason: FinishReason) -> (TourState, Vec<TourAction>) {
        let mut actions = Vec::new();
        if let Some(tour_id) = state.current_tour_id.take() {
            state.completed_tours.insert(tour_id.clone());
            actions.push(TourAction::Finished { tour_id, reason });
        }
        state.clear_activation();
        actions.push(TourAction::PersistProgress);
        (state, actions)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn started(total_steps: usize) -> TourState {
        let (state, _) = TourStateMachine::transition(
            TourState::default(),
            TourEvent::Start {
                tour_id: "demo".into(),
                total_steps,
            },
        );
        state
    }

    #[test]
    fn start_activates_at_first_step() {
        let (state, actions) = TourStateMachine::transition(
            TourState::default(),
            TourEvent::Start {
                tour_id: "demo".into(),
                total_steps: 3,
            },
        );

        assert!(state.is_active);
        assert_eq!(state.current_step, 0);
        assert_eq!(state.total_steps, 3);
        assert_eq!(state.current_tour_id, Some("demo".into()));
        assert_eq!(
            actions,
            vec![TourAction::Started {
                tour_id: "demo".into()
            }]
        );
    }

    #[test]
    fn start_is_noop_when_tutorials_skipped() {
        let mut initial = TourState::default();
        initial.user_preferences.skip_tutorials = true;

        let (state, actions) = TourStateMachine::transition(
            initial.clone(),
            TourEvent::Start {
                tour_id: "demo".into(),
                total_steps: 3,
            },
        );

        assert_eq!(state, initial);
        assert!(actions.is_empty());
    }

    #[test]
    fn start_is_noop_for_completed_tour() {
        let mut initial = TourState::default();
        initial.completed_tours.insert("demo".into());

        let (state, actions) = TourStateMachine::transition(
            initial.clone(),
            TourEvent::Start {
                tour_id: "demo".into(),
                total_steps: 2,
            },
        );

        assert_eq!(state, initial);
        assert!(actions.is_empty());
    }

    #[test]
    fn start_is_noop_for_empty_steps() {
        let (state, actions) = TourStateMachine::transition(
            TourState::default(),
            TourEvent::Start {
                tour_id: "demo".into(),
                total_steps: 0,
            },
        );

        assert_eq!(state, TourState::default());
        assert!(actions.is_empty());
    }

    #[test]
    fn first_tour_wins_when_already_active() {
        let active = started(3);
        let (state, actions) = TourStateMachine::transition(
            active.clone(),
            TourEvent::Start {
                tour_id: "other".into(),
                total_steps: 5,
            },
        );

        assert_eq!(state, active);
        assert!(actions.is_empty());
    }

    #[test]
    fn advance_past_last_step_completes_tour() {
        let mut state = started(2);
        let actions;
        (state, _) = TourStateMachine::transition(state, TourEvent::Advance);
        assert_eq!(state.current_step, 1);

        (state, actions) = TourStateMachine::transition(state, TourEvent::Advance);
        assert!(!state.is_active);
        assert_eq!(state.current_step, 0);
        assert_eq!(state.total_steps, 0);
        assert!(state.current_tour_id.is_none());
        assert!(state.is_tour_completed(&"demo".into()));
        assert!(!state.user_preferences.has_seen_welcome);
        assert_eq!(
            actions,
            vec![
                TourAction::Finished {
                    tour_id: "demo".into(),
                    reason: FinishReason::Completed
                },
                TourAction::PersistProgress
            ]
        );
    }

    #[test]
    fn back_is_floored_at_zero() {
        let (state, actions) = TourStateMachine::transition(started(3), TourEvent::Back);
        assert_eq!(state.current_step, 0);
        assert!(state.is_active);
        assert!(actions.is_empty());
    }

    #[test]
    fn skip_marks_completed_and_welcome_seen() {
        let (state, actions) = TourStateMachine::transition(started(3), TourEvent::Skip);

        assert!(!state.is_active);
        assert!(state.is_tour_completed(&"demo".into()));
        assert!(state.user_preferences.has_seen_welcome);
        assert!(actions.contains(&TourAction::PersistProgress));
    }

    #[test]
    fn idle_events_are_ignored() {
        for event in [
            TourEvent::Advance,
            TourEvent::Back,
            TourEvent::Skip,
            TourEvent::End,
            TourEvent::NavigationStarted,
        ] {
            let (state, actions) = TourStateMachine::transition(TourState::default(), event);
            assert_eq!(state, TourState::default());
            assert!(actions.is_empty());
        }
    }

    #[test]
    fn mark_completed_is_idempotent() {
        let event = TourEvent::MarkCompleted {
            tour_id: "demo".into(),
        };
        let (state, _) = TourStateMachine::transition(TourState::default(), event.clone());
        let (state, actions) = TourStateMachine::transition(state, event);

        assert_eq!(state.completed_tours.len(), 1);
        assert_eq!(actions, vec![TourAction::PersistProgress]);
    }

    #[test]
    fn navigation_flag_only_set_while_active() {
        let (state, _) = TourStateMachine::transition(started(2), TourEvent::NavigationStarted);
        assert!(state.is_navigating);

        let (state, _) = TourStateMachine::transition(state, TourEvent::End);
        assert!(!state.is_navigating);
    }
}
