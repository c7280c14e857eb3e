//! In-process router used by the demo host and by tests.
//!
//! Navigation requests resolve after a fixed latency, mimicking a client-side
//! router that renders the next page asynchronously. Locations marked
//! unreachable never resolve, which exercises the engine's timeout path.

use std::collections::HashSet;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, RwLock};
use std::time::Duration;

use tokio::runtime::Handle;
use tracing::{debug, warn};
use tour_core::ports::NavigationPort;
use tour_core::Location;

#[derive(Clone)]
pub struct SimulatedRouter {
    inner: Arc<RouterState>,
}

struct RouterState {
    location: RwLock<Location>,
    latency: Duration,
    unreachable: Mutex<HashSet<Location>>,
    requests: Mutex<Vec<Location>>,
}

impl SimulatedRouter {
    pub fn new(initial: impl Into<Location>, latency: Duration) -> Self {
        Self {
            inner: Arc::new(RouterState {
                location: RwLock::new(initial.into()),
                latency,
                unreachable: Mutex::new(HashSet::new()),
                requests: Mutex::new(Vec::new()),
            }),
        }
    }

    /// Moves to `location` immediately, as if the user navigated by hand.
    pub fn set_location(&self, location: impl Into<Location>) {
        self.inner.set_location(location.into());
    }

    /// Requests to `location` are recorded but never resolve.
    pub fn mark_unreachable(&self, location: impl Into<Location>) {
        lock(&self.inner.unreachable).insert(location.into());
    }

    /// Every location requested so far, in order.
    pub fn requested_locations(&self) -> Vec<Location> {
        lock(&self.inner.requests).clone()
    }
}

impl RouterState {
    fn set_location(&self, location: Location) {
        let mut current = self
            .location
            .write()
            .unwrap_or_else(PoisonError::into_inner);
        debug!(from = %current, to = %location, "router location changed");
        *current = location;
    }
}

impl NavigationPort for SimulatedRouter {
    fn current_location(&self) -> Location {
        self.inner
            .location
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    fn request_navigate(&self, to: &Location) {
        lock(&self.inner.requests).push(to.clone());

        if lock(&self.inner.unreachable).contains(to) {
            warn!(location = %to, "route is unreachable, navigation will not resolve");
            return;
        }

        if self.inner.latency.is_zero() {
            self.inner.set_location(to.clone());
            return;
        }

        let Ok(runtime) = Handle::try_current() else {
            self.inner.set_location(to.clone());
            return;
        };
        let state = Arc::clone(&self.inner);
        let to = to.clone();
        runtime.spawn(async move {
            tokio::time::sleep(state.latency).await;
            state.set_location(to);
        });
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}
