use std::collections::HashSet;
use std::sync::{Arc, Mutex as StdMutex, PoisonError};

use tokio::sync::{Mutex, MutexGuard, TryLockError};
use tokio_util::sync::CancellationToken;
use tour_core::{PreferenceKey, TourError, TourState, TourStep};

/// Authoritative in-memory tour session: state plus the active step list.
pub(crate) struct Session {
    pub(crate) state: TourState,
    pub(crate) steps: Arc<[TourStep]>,
}

/// Shared tour context containing the session and the transition lock.
///
/// ## Lock Ordering
/// When acquiring both locks, acquire `transition_lock` first, then `session`.
/// - `transition_lock`: held for the whole of one step transition, including
///   navigation waits. Only `end_tour` waits for it; every other transition
///   tries it and is rejected when it is held.
/// - `session`: short critical sections for reading and committing state.
///   Never held across a navigation wait.
pub(crate) struct TourContext {
    session: Mutex<Session>,
    transition_lock: Mutex<()>,
    /// Token of the in-flight navigation wait; replaced after every cancel.
    cancel: StdMutex<CancellationToken>,
    /// Preferences changed in memory; hydration keeps these and loads the rest.
    touched_preferences: StdMutex<HashSet<PreferenceKey>>,
}

impl TourContext {
    pub(crate) fn new() -> Self {
        Self {
            session: Mutex::new(Session {
                state: TourState::default(),
                steps: Arc::from(Vec::new()),
            }),
            transition_lock: Mutex::new(()),
            cancel: StdMutex::new(CancellationToken::new()),
            touched_preferences: StdMutex::new(HashSet::new()),
        }
    }

    pub(crate) async fn get_state(&self) -> TourState {
        self.session.lock().await.state.clone()
    }

    /// State and active steps read under one lock.
    pub(crate) async fn snapshot(&self) -> (TourState, Arc<[TourStep]>) {
        let session = self.session.lock().await;
        (session.state.clone(), Arc::clone(&session.steps))
    }

    pub(crate) async fn lock_session(&self) -> MutexGuard<'_, Session> {
        self.session.lock().await
    }

    /// Claims the transition lock or rejects the call if a transition is in flight.
    pub(crate) fn try_begin_transition(&self) -> Result<MutexGuard<'_, ()>, TourError> {
        self.transition_lock
            .try_lock()
            .map_err(|_: TryLockError| TourError::TransitionInProgress)
    }

    /// Waits for any in-flight transition to finish.
    pub(crate) async fn begin_transition(&self) -> MutexGuard<'_, ()> {
        self.transition_lock.lock().await
    }

    pub(crate) fn cancellation(&self) -> CancellationToken {
        self.cancel
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Cancels the current navigation wait, if any, and arms a fresh token.
    pub(crate) fn cancel_in_flight(&self) {
        let mut token = self.cancel.lock().unwrap_or_else(PoisonError::into_inner);
        token.cancel();
        *token = CancellationToken::new();
    }

    pub(crate) fn mark_preference_touched(&self, key: PreferenceKey) {
        self.touched_preferences
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(key);
    }

    pub(crate) fn preference_touched(&self, key: PreferenceKey) -> bool {
        self.touched_preferences
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .contains(&key)
    }
}
