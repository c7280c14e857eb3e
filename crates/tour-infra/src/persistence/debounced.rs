//! Debounced tour persistence.
//!
//! Write-behind cache over a [`KeyValueStorePort`]: the engine's in-memory state
//! is authoritative, `save` only records the latest progress and (re)schedules a
//! timer. When the debounce window passes without another save, the latest
//! progress is serialized and written once.
//!
//! Reads and writes never surface errors. A failed write switches the store to
//! in-memory-only mode for the rest of the session.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use async_trait::async_trait;
use tokio::runtime::Handle;
use tokio::task::AbortHandle;
use tracing::{debug, warn};
use tour_core::config::PersistenceConfig;
use tour_core::ports::{KeyValueStorePort, TourPersistencePort};
use tour_core::TourProgress;

pub struct DebouncedTourPersistence {
    inner: Arc<Inner>,
}

struct Inner {
    store: Arc<dyn KeyValueStorePort>,
    key: String,
    debounce: Duration,
    pending: Mutex<PendingWrite>,
    /// Serializes writes so a later flush never lands before an earlier one.
    write_lock: tokio::sync::Mutex<()>,
    first_save: AtomicBool,
    degraded: AtomicBool,
}

#[derive(Default)]
struct PendingWrite {
    latest: Option<TourProgress>,
    /// Bumped on every save/flush/clear; a timer only writes if it still owns the latest generation.
    generation: u64,
    timer: Option<AbortHandle>,
}

impl DebouncedTourPersistence {
    pub fn new(store: Arc<dyn KeyValueStorePort>, key: impl Into<String>, debounce: Duration) -> Self {
        Self {
            inner: Arc::new(Inner {
                store,
                key: key.into(),
                debounce,
                pending: Mutex::new(PendingWrite::default()),
                write_lock: tokio::sync::Mutex::new(()),
                first_save: AtomicBool::new(true),
                degraded: AtomicBool::new(false),
            }),
        }
    }

    pub fn from_config(store: Arc<dyn KeyValueStorePort>, config: &PersistenceConfig) -> Self {
        Self::new(store, config.storage_key.clone(), config.debounce)
    }

    /// True once a write has failed; later saves are dropped.
    pub fn is_degraded(&self) -> bool {
        self.inner.degraded.load(Ordering::SeqCst)
    }

    pub fn has_pending_write(&self) -> bool {
        self.inner.lock_pending().latest.is_some()
    }
}

impl Inner {
    fn lock_pending(&self) -> MutexGuard<'_, PendingWrite> {
        self.pending.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Takes the pending progress and invalidates any scheduled timer.
    fn take_pending(&self) -> Option<TourProgress> {
        let mut pending = self.lock_pending();
        pending.generation = pending.generation.wrapping_add(1);
        if let Some(timer) = pending.timer.take() {
            timer.abort();
        }
        pending.latest.take()
    }

    async fn write_after_debounce(self: Arc<Self>, generation: u64) {
        tokio::time::sleep(self.debounce).await;

        let _write_guard = self.write_lock.lock().await;
        let progress = {
            let mut pending = self.lock_pending();
            if pending.generation != generation {
                return;
            }
            pending.timer = None;
            pending.latest.take()
        };

        if let Some(progress) = progress {
            self.write(&progress).await;
        }
    }

    async fn write(&self, progress: &TourProgress) {
        if self.degraded.load(Ordering::SeqCst) {
            debug!(key = %self.key, "tour store degraded, write dropped");
            return;
        }

        let json = match serde_json::to_string(progress) {
            Ok(json) => json,
            Err(err) => {
                warn!(key = %self.key, error = %err, "failed to serialize tour progress");
                return;
            }
        };

        match self.store.set(&self.key, &json).await {
            Ok(()) => debug!(
                key = %self.key,
                completed_tours = progress.completed_tours.len(),
                "tour progress persisted"
            ),
            Err(err) => {
                warn!(
                    key = %self.key,
                    error = %err,
                    "failed to persist tour progress, continuing in memory only"
                );
                self.degraded.store(true, Ordering::SeqCst);
            }
        }
    }
}

#[async_trait]
impl TourPersistencePort for DebouncedTourPersistence {
    async fn load(&self) -> Option<TourProgress> {
        let raw = match self.inner.store.get(&self.inner.key).await {
            Ok(Some(raw)) => raw,
            Ok(None) => {
                debug!(key = %self.inner.key, "no stored tour progress");
                return None;
            }
            Err(err) => {
                warn!(key = %self.inner.key, error = %err, "failed to read tour progress");
                return None;
            }
        };

        if raw.trim().is_empty() {
            return None;
        }

        match serde_json::from_str::<TourProgress>(&raw) {
            Ok(progress) => Some(progress),
            Err(err) => {
                warn!(
                    key = %self.inner.key,
                    error = %err,
                    "stored tour progress is malformed, using defaults"
                );
                None
            }
        }
    }

    fn save(&self, progress: TourProgress) {
        let inner = &self.inner;
        if inner.degraded.load(Ordering::SeqCst) {
            debug!(key = %inner.key, "tour store degraded, save dropped");
            return;
        }
        // Guard against clobbering stored data with defaults before hydration finishes.
        if inner.first_save.swap(false, Ordering::SeqCst) && progress.is_bootstrap_default() {
            debug!(key = %inner.key, "skipping first save of bootstrap defaults");
            return;
        }

        let Ok(runtime) = Handle::try_current() else {
            warn!(key = %inner.key, "no async runtime, tour progress kept in memory only");
            return;
        };

        let mut pending = inner.lock_pending();
        pending.generation = pending.generation.wrapping_add(1);
        if let Some(timer) = pending.timer.take() {
            timer.abort();
        }
        pending.latest = Some(progress);
        let task = runtime.spawn(Arc::clone(inner).write_after_debounce(pending.generation));
        pending.timer = Some(task.abort_handle());
    }

    async fn flush(&self) {
        let _write_guard = self.inner.write_lock.lock().await;
        if let Some(progress) = self.inner.take_pending() {
            self.inner.write(&progress).await;
        }
    }

    async fn clear(&self) {
        let _write_guard = self.inner.write_lock.lock().await;
        let _discarded = self.inner.take_pending();
        match self.inner.store.remove(&self.inner.key).await {
            Ok(()) => debug!(key = %self.inner.key, "tour progress cleared"),
            Err(err) => warn!(key = %self.inner.key, error = %err, "failed to clear tour progress"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::InMemoryKeyValueStore;
    use std::collections::HashMap;
    use tokio::time::sleep;
    use tour_core::UserPreferences;

    const KEY: &str = "tour-progress";
    const WINDOW: Duration = Duration::from_millis(300);

    #[derive(Default)]
    struct RecordingStore {
        entries: std::sync::Mutex<HashMap<String, String>>,
        writes: std::sync::Mutex<Vec<String>>,
    }

    impl RecordingStore {
        fn writes(&self) -> Vec<String> {
            self.writes.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl KeyValueStorePort for RecordingStore {
        async fn get(&self, key: &str) -> anyhow::Result<Option<String>> {
            Ok(self.entries.lock().unwrap().get(key).cloned())
        }

        async fn set(&self, key: &str, value: &str) -> anyhow::Result<()> {
            self.writes.lock().unwrap().push(value.to_string());
            self.entries
                .lock()
                .unwrap()
                .insert(key.to_string(), value.to_string());
            Ok(())
        }

        async fn remove(&self, key: &str) -> anyhow::Result<()> {
            self.entries.lock().unwrap().remove(key);
            Ok(())
        }
    }

    mockall::mock! {
        pub Store {}

        #[async_trait]
        impl KeyValueStorePort for Store {
            async fn get(&self, key: &str) -> anyhow::Result<Option<String>>;
            async fn set(&self, key: &str, value: &str) -> anyhow::Result<()>;
            async fn remove(&self, key: &str) -> anyhow::Result<()>;
        }
    }

    fn progress_with(tour_id: &str) -> TourProgress {
        TourProgress {
            completed_tours: [tour_id.into()].into_iter().collect(),
            user_preferences: UserPreferences::default(),
        }
    }

    #[tokio::test]
    async fn saves_within_window_coalesce_into_one_write() {
        tokio::time::pause();
        let store = Arc::new(RecordingStore::default());
        let persistence = DebouncedTourPersistence::new(store.clone(), KEY, WINDOW);

        for i in 0..5 {
            persistence.save(progress_with(&format!("tour-{i}")));
        }
        assert!(store.writes().is_empty());

        sleep(WINDOW + Duration::from_millis(50)).await;

        let writes = store.writes();
        assert_eq!(writes.len(), 1);
        let written: TourProgress = serde_json::from_str(&writes[0]).unwrap();
        assert_eq!(written, progress_with("tour-4"));
    }

    #[tokio::test]
    async fn each_save_reschedules_the_timer() {
        tokio::time::pause();
        let store = Arc::new(RecordingStore::default());
        let persistence = DebouncedTourPersistence::new(store.clone(), KEY, WINDOW);

        persistence.save(progress_with("a"));
        sleep(Duration::from_millis(200)).await;
        persistence.save(progress_with("b"));
        sleep(Duration::from_millis(200)).await;
        assert!(store.writes().is_empty(), "timer should have been rescheduled");

        sleep(Duration::from_millis(150)).await;
        assert_eq!(store.writes().len(), 1);
    }

    #[tokio::test]
    async fn first_save_of_bootstrap_defaults_is_skipped() {
        tokio::time::pause();
        let store = Arc::new(RecordingStore::default());
        let persistence = DebouncedTourPersistence::new(store.clone(), KEY, WINDOW);

        persistence.save(TourProgress::default());
        sleep(WINDOW * 2).await;
        assert!(store.writes().is_empty());

        persistence.save(TourProgress::default());
        sleep(WINDOW * 2).await;
        assert_eq!(store.writes().len(), 1);
    }

    #[tokio::test]
    async fn round_trip_after_window() {
        tokio::time::pause();
        let store = Arc::new(InMemoryKeyValueStore::new());
        let persistence = DebouncedTourPersistence::new(store, KEY, WINDOW);
        let progress = TourProgress {
            completed_tours: ["a".into(), "b".into()].into_iter().collect(),
            user_preferences: UserPreferences {
                auto_start: false,
                skip_tutorials: true,
                has_seen_welcome: true,
            },
        };

        persistence.save(progress.clone());
        sleep(WINDOW * 2).await;

        assert_eq!(persistence.load().await, Some(progress));
    }

    #[tokio::test]
    async fn flush_writes_immediately_and_cancels_timer() {
        tokio::time::pause();
        let store = Arc::new(RecordingStore::default());
        let persistence = DebouncedTourPersistence::new(store.clone(), KEY, WINDOW);

        persistence.save(progress_with("a"));
        persistence.flush().await;
        assert_eq!(store.writes().len(), 1);
        assert!(!persistence.has_pending_write());

        sleep(WINDOW * 2).await;
        assert_eq!(store.writes().len(), 1);
    }

    #[tokio::test]
    async fn failed_write_degrades_to_memory_only() {
        tokio::time::pause();
        let mut mock = MockStore::new();
        mock.expect_set()
            .times(1)
            .returning(|_, _| Err(anyhow::anyhow!("quota exceeded")));
        let persistence = DebouncedTourPersistence::new(Arc::new(mock), KEY, WINDOW);

        persistence.save(progress_with("a"));
        sleep(WINDOW * 2).await;
        assert!(persistence.is_degraded());

        persistence.save(progress_with("b"));
        persistence.flush().await;
        sleep(WINDOW * 2).await;
    }

    #[tokio::test]
    async fn load_tolerates_missing_corrupt_and_failing_reads() {
        let missing = DebouncedTourPersistence::new(
            Arc::new(InMemoryKeyValueStore::new()),
            KEY,
            WINDOW,
        );
        assert_eq!(missing.load().await, None);

        let corrupt = DebouncedTourPersistence::new(
            Arc::new(InMemoryKeyValueStore::with_entry(KEY, "{\"completedTours\": 4")),
            KEY,
            WINDOW,
        );
        assert_eq!(corrupt.load().await, None);

        let blank = DebouncedTourPersistence::new(
            Arc::new(InMemoryKeyValueStore::with_entry(KEY, "  ")),
            KEY,
            WINDOW,
        );
        assert_eq!(blank.load().await, None);

        let mut mock = MockStore::new();
        mock.expect_get()
            .returning(|_| Err(anyhow::anyhow!("storage disabled")));
        let failing = DebouncedTourPersistence::new(Arc::new(mock), KEY, WINDOW);
        assert_eq!(failing.load().await, None);
    }

    #[tokio::test]
    async fn clear_removes_record_and_discards_pending() {
        tokio::time::pause();
        let store = Arc::new(RecordingStore::default());
        let persistence = DebouncedTourPersistence::new(store.clone(), KEY, WINDOW);

        persistence.save(progress_with("a"));
        persistence.flush().await;
        persistence.save(progress_with("b"));
        persistence.clear().await;
        sleep(WINDOW * 2).await;

        assert_eq!(store.writes().len(), 1);
        assert_eq!(persistence.load().await, None);
    }

    #[test]
    fn save_without_runtime_does_not_panic() {
        let store = Arc::new(RecordingStore::default());
        let persistence = DebouncedTourPersistence::new(store.clone(), KEY, WINDOW);

        persistence.save(progress_with("a"));

        assert!(store.writes().is_empty());
        assert!(!persistence.has_pending_write());
    }
}
