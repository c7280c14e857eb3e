//! Tour engine.
//!
//! This module coordinates the tour state machine and its side effects:
//! navigation waits, step hooks, write-behind persistence and state events.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, info_span, warn, Instrument};

use tour_core::ports::{NavigationPort, TourEventPort, TourPersistencePort};
use tour_core::tour::{TourAction, TourEvent, TourStateMachine};
use tour_core::{
    Location, NavigationOutcome, PreferenceKey, TourError, TourId, TourState, TourStep,
};

use crate::usecases::tour::context::TourContext;
use crate::usecases::tour::NavigationWait;

/// Ports the engine drives.
pub struct TourEngineDeps {
    pub navigation: Arc<dyn NavigationPort>,
    pub persistence: Arc<dyn TourPersistencePort>,
    pub event_port: Arc<dyn TourEventPort>,
}

/// Owned tour engine; one instance per session, injected at the application root.
pub struct TourEngine {
    context: TourContext,
    hydrated: AtomicBool,
    navigation_wait: NavigationWait,

    navigation: Arc<dyn NavigationPort>,
    persistence: Arc<dyn TourPersistencePort>,
    event_port: Arc<dyn TourEventPort>,
}

/// Resume point of the skip-forward loop.
struct Landing {
    /// Start event of a tour that is not visible yet.
    start: Option<TourEvent>,
    /// Last step evaluated; `None` before the first one.
    pending: Option<usize>,
}

impl Landing {
    fn start(event: TourEvent) -> Self {
        Self {
            start: Some(event),
            pending: None,
        }
    }

    fn after(index: usize) -> Self {
        Self {
            start: None,
            pending: Some(index),
        }
    }

    /// Step whose location must be reached before it can be displayed.
    fn target(&self) -> usize {
        self.pending.map_or(0, |index| index + 1)
    }
}

impl TourEngine {
    pub fn new(deps: TourEngineDeps, navigation_wait: NavigationWait) -> Self {
        Self {
            context: TourContext::new(),
            hydrated: AtomicBool::new(false),
            navigation_wait,
            navigation: deps.navigation,
            persistence: deps.persistence,
            event_port: deps.event_port,
        }
    }

    pub async fn state(&self) -> TourState {
        self.context.get_state().await
    }

    /// Activates `tour_id` at its first displayable step, navigating first when
    /// that step is bound to another location. The tour becomes visible only
    /// once that step is reached.
    ///
    /// Returns the unchanged state when tutorials are disabled, the tour was
    /// already completed, another tour is active or `steps` is empty.
    pub async fn start_tour(
        &self,
        tour_id: impl Into<TourId>,
        steps: Vec<TourStep>,
    ) -> Result<TourState, TourError> {
        let _transition = self.context.try_begin_transition()?;
        let cancel = self.context.cancellation();
        let tour_id = tour_id.into();

        let span = info_span!("usecase.tour_engine.start_tour", tour_id = %tour_id, steps = steps.len());
        async {
            let event = TourEvent::Start {
                tour_id,
                total_steps: steps.len(),
            };
            let current = self.context.get_state().await;
            let (_, actions) = TourStateMachine::transition(current.clone(), event.clone());
            if actions.is_empty() {
                return Ok(current);
            }
            self.land(Arc::from(steps), Landing::start(event), cancel)
                .await
        }
        .instrument(span)
        .await
    }

    /// Advances to the next displayable step, navigating first when the step
    /// being entered is bound to another location.
    pub async fn next_step(&self) -> Result<TourState, TourError> {
        let _transition = self.context.try_begin_transition()?;
        let cancel = self.context.cancellation();

        let span = info_span!("usecase.tour_engine.next_step");
        async {
            let (state, steps) = self.context.snapshot().await;
            if !state.is_active {
                debug!("next step ignored, no active tour");
                return Ok(state);
            }
            if let Some(step) = steps.get(state.current_step) {
                step.run_after_hook();
            }
            self.land(steps, Landing::after(state.current_step), cancel)
                .await
        }
        .instrument(span)
        .await
    }

    /// Moves back one step without navigating; the host stays on its current page.
    pub async fn previous_step(&self) -> Result<TourState, TourError> {
        let _transition = self.context.try_begin_transition()?;

        let (state, steps) = self.context.snapshot().await;
        if !state.is_active || state.current_step == 0 {
            return Ok(state);
        }
        if let Some(step) = steps.get(state.current_step) {
            step.run_after_hook();
        }
        let next = self.dispatch(TourEvent::Back).await;
        if next.is_active {
            if let Some(step) = steps.get(next.current_step) {
                step.run_before_hook();
            }
        }
        Ok(next)
    }

    /// User dismissal: the tour is recorded as completed and the welcome flag set.
    pub async fn skip_tour(&self) -> Result<TourState, TourError> {
        let _transition = self.context.try_begin_transition()?;
        Ok(self.dispatch(TourEvent::Skip).await)
    }

    /// Programmatic termination. Cancels any in-flight navigation wait first,
    /// then waits for that transition to unwind before ending the tour.
    pub async fn end_tour(&self) -> TourState {
        self.context.cancel_in_flight();
        let _transition = self.context.begin_transition().await;
        self.dispatch(TourEvent::End).await
    }

    pub async fn set_user_preference(&self, key: PreferenceKey, value: bool) -> TourState {
        self.dispatch(TourEvent::SetPreference { key, value }).await
    }

    /// Idempotent: marking a tour twice keeps a single entry.
    pub async fn mark_tour_completed(&self, tour_id: impl Into<TourId>) -> TourState {
        self.dispatch(TourEvent::MarkCompleted {
            tour_id: tour_id.into(),
        })
        .await
    }

    pub async fn is_tour_completed(&self, tour_id: &TourId) -> bool {
        self.context.get_state().await.is_tour_completed(tour_id)
    }

    pub async fn get_current_step(&self) -> Option<TourStep> {
        let (state, steps) = self.context.snapshot().await;
        if !state.is_active {
            return None;
        }
        steps.get(state.current_step).cloned()
    }

    /// Starts the welcome tour only for users who opted in and have not seen it.
    pub async fn maybe_auto_start(
        &self,
        tour_id: impl Into<TourId>,
        steps: Vec<TourStep>,
    ) -> Result<TourState, TourError> {
        let state = self.context.get_state().await;
        let prefs = state.user_preferences;
        if !prefs.auto_start || prefs.has_seen_welcome {
            debug!(
                auto_start = prefs.auto_start,
                has_seen_welcome = prefs.has_seen_welcome,
                "auto start skipped"
            );
            return Ok(state);
        }
        self.start_tour(tour_id, steps).await
    }

    /// Loads durable progress once. Later calls return the current state untouched.
    pub async fn hydrate(&self) -> TourState {
        if self.hydrated.swap(true, Ordering::SeqCst) {
            debug!("tour state already hydrated");
            return self.context.get_state().await;
        }

        let Some(progress) = self.persistence.load().await else {
            debug!("no stored tour progress, keeping defaults");
            return self.context.get_state().await;
        };

        let state = {
            let mut session = self.context.lock_session().await;
            let merged = &mut session.state;
            merged
                .completed_tours
                .extend(progress.completed_tours.iter().cloned());
            for key in PreferenceKey::ALL {
                if self.context.preference_touched(key) {
                    debug!(?key, "preference changed before hydration, keeping in-memory value");
                } else {
                    merged
                        .user_preferences
                        .set(key, progress.user_preferences.get(key));
                }
            }
            merged.clone()
        };
        info!(
            completed_tours = state.completed_tours.len(),
            "tour progress hydrated"
        );
        // A save scheduled before hydration would otherwise write the pre-merge record.
        if state.progress() != progress {
            self.persistence.save(state.progress());
        }
        self.event_port.emit_tour_state_changed(state.clone()).await;
        state
    }

    /// Runs [`TourEngine::hydrate`] in the background right after construction.
    pub fn spawn_hydration(self: &Arc<Self>) -> JoinHandle<()> {
        let engine = Arc::clone(self);
        tokio::spawn(
            async move {
                engine.hydrate().await;
            }
            .instrument(info_span!("usecase.tour_engine.hydrate")),
        )
    }

    /// Flushes any pending progress write.
    pub async fn shutdown(&self) {
        info!("tour engine shutting down");
        self.persistence.flush().await;
    }

    /// Skip-forward loop. Works on a pending index and commits only the step
    /// finally landed on, so skipped steps and steps whose location has not
    /// been reached are never observable.
    async fn land(
        &self,
        steps: Arc<[TourStep]>,
        mut landing: Landing,
        cancel: CancellationToken,
    ) -> Result<TourState, TourError> {
        loop {
            let committed = landing.start.is_none();
            if let Some(location) = steps
                .get(landing.target())
                .and_then(|s| s.navigate_to.as_ref())
            {
                if self.navigation.current_location() != *location {
                    match self.navigate(location, &cancel, committed).await {
                        NavigationOutcome::Reached => {}
                        NavigationOutcome::Cancelled => {
                            debug!(location = %location, "navigation cancelled, discarding transition");
                            return Ok(self.context.get_state().await);
                        }
                        NavigationOutcome::TimedOut => {
                            return Err(self.end_after_timeout(location, committed).await);
                        }
                    }
                }
            }
            if cancel.is_cancelled() {
                return Ok(self.context.get_state().await);
            }

            let (next, actions, skipped) = {
                let mut session = self.context.lock_session().await;
                let fresh = session.state.clone();
                let (mut base, mut actions) = match &landing.start {
                    Some(event) => {
                        let (started, actions) =
                            TourStateMachine::transition(fresh, event.clone());
                        if actions.is_empty() {
                            debug!("tour start blocked while navigating");
                            return Ok(started);
                        }
                        (started, actions)
                    }
                    None if !fresh.is_active => return Ok(fresh),
                    None => (fresh, Vec::new()),
                };
                let next = match landing.pending {
                    Some(index) => {
                        base.current_step = index;
                        let (next, more) = TourStateMachine::transition(base, TourEvent::Advance);
                        actions.extend(more);
                        next
                    }
                    None => base,
                };
                let skipped = next.is_active
                    && steps
                        .get(next.current_step)
                        .map(TourStep::should_skip)
                        .unwrap_or(false);
                if !skipped {
                    session.state = next.clone();
                    if !committed {
                        session.steps = Arc::clone(&steps);
                    }
                }
                (next, actions, skipped)
            };

            if skipped {
                debug!(step = next.current_step, "step skipped by condition");
                landing.pending = Some(next.current_step);
                continue;
            }

            info!(
                step = next.current_step,
                active = next.is_active,
                "tour step landed"
            );
            self.execute_actions(&next, actions);
            self.event_port.emit_tour_state_changed(next.clone()).await;
            if next.is_active {
                if let Some(step) = steps.get(next.current_step) {
                    step.run_before_hook();
                }
            }
            return Ok(next);
        }
    }

    /// Waits for `location`. The navigating flag is only tracked for a tour
    /// that is already visible.
    async fn navigate(
        &self,
        location: &Location,
        cancel: &CancellationToken,
        track: bool,
    ) -> NavigationOutcome {
        if track {
            self.dispatch(TourEvent::NavigationStarted).await;
        }
        info!(location = %location, "navigating before step");
        self.navigation.request_navigate(location);

        let outcome = self
            .navigation_wait
            .wait_for(self.navigation.as_ref(), location, cancel)
            .await;
        debug!(location = %location, ?outcome, "navigation wait resolved");

        if track {
            self.dispatch(TourEvent::NavigationSettled).await;
        }
        outcome
    }

    async fn end_after_timeout(&self, location: &Location, committed: bool) -> TourError {
        let waited_ms = u64::try_from(self.navigation_wait.timeout().as_millis()).unwrap_or(u64::MAX);
        if committed {
            warn!(location = %location, waited_ms, "navigation timed out, ending tour");
            self.dispatch(TourEvent::End).await;
        } else {
            warn!(location = %location, waited_ms, "navigation timed out, tour not started");
        }
        TourError::NavigationTimeout {
            location: location.clone(),
            waited_ms,
        }
    }

    /// Applies one event, commits the result and runs its side effects.
    async fn dispatch(&self, event: TourEvent) -> TourState {
        let (next, actions) = {
            let mut session = self.context.lock_session().await;
            let from = session.state.clone();
            let (next, actions) = TourStateMachine::transition(from.clone(), event);
            if next == from {
                return next;
            }
            for key in PreferenceKey::ALL {
                if next.user_preferences.get(key) != from.user_preferences.get(key) {
                    self.context.mark_preference_touched(key);
                }
            }
            session.state = next.clone();
            (next, actions)
        };
        self.execute_actions(&next, actions);
        self.event_port.emit_tour_state_changed(next.clone()).await;
        next
    }

    fn execute_actions(&self, state: &TourState, actions: Vec<TourAction>) {
        for action in actions {
            match action {
                TourAction::Started { tour_id } => {
                    info!(tour_id = %tour_id, total_steps = state.total_steps, "tour started");
                }
                TourAction::Finished { tour_id, reason } => {
                    info!(tour_id = %tour_id, ?reason, "tour finished");
                }
                TourAction::PersistProgress => {
                    self.persistence.save(state.progress());
                }
            }
        }
    }
}
