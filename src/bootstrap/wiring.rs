//! Dependency wiring for the demo host.
//!
//! Builds the concrete adapters from configuration and injects them into an
//! owned [`TourEngine`]. This is the only place that knows which
//! implementation backs each port.

use std::sync::Arc;
use std::time::Duration;

use tour_app::{NavigationWait, TourEngine, TourEngineDeps};
use tour_core::TourConfig;
use tour_infra::{
    DebouncedTourPersistence, FileKeyValueStore, SimulatedRouter, TracingTourEventPort,
};
use tracing::info;

use super::app_dirs::default_storage_dir;

/// Location the simulated router starts on.
pub const INITIAL_LOCATION: &str = "/";

/// Everything the host needs after wiring.
pub struct TourRuntime {
    pub engine: Arc<TourEngine>,
    pub router: SimulatedRouter,
    pub persistence: Arc<DebouncedTourPersistence>,
}

pub fn wire_runtime(config: &TourConfig, route_latency: Duration) -> anyhow::Result<TourRuntime> {
    let storage_dir = match &config.persistence.storage_dir {
        Some(dir) => dir.clone(),
        None => default_storage_dir()?,
    };
    info!(
        storage_dir = %storage_dir.display(),
        storage_key = %config.persistence.storage_key,
        "wiring tour engine"
    );

    let store = Arc::new(FileKeyValueStore::new(storage_dir));
    let persistence = Arc::new(DebouncedTourPersistence::from_config(
        store,
        &config.persistence,
    ));
    let router = SimulatedRouter::new(INITIAL_LOCATION, route_latency);

    let engine = TourEngine::new(
        TourEngineDeps {
            navigation: Arc::new(router.clone()),
            persistence: persistence.clone(),
            event_port: Arc::new(TracingTourEventPort),
        },
        NavigationWait::from_config(&config.navigation),
    );

    Ok(TourRuntime {
        engine: Arc::new(engine),
        router,
        persistence,
    })
}
