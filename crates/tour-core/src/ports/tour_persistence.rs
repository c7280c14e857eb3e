//! Tour persistence port
//!
//! Durable storage of the tour progress record. Implementations must be
//! tolerant: tour progress is not mission-critical, so no method reports an
//! error to the caller. Failures are logged by the implementation.

use async_trait::async_trait;

use crate::tour::TourProgress;

#[async_trait]
pub trait TourPersistencePort: Send + Sync {
    /// Best-effort read. Missing or malformed records yield `None`.
    async fn load(&self) -> Option<TourProgress>;

    /// Fire-and-forget write of the latest progress. Implementations may defer
    /// and coalesce writes.
    fn save(&self, progress: TourProgress);

    /// Write any deferred progress now.
    async fn flush(&self);

    /// Drop any deferred progress and remove the stored record.
    async fn clear(&self);
}
