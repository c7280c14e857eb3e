use crate::ids::{Location, TourId};

/// Errors surfaced by tour operations.
///
/// Invalid operation ordering (e.g. advancing while idle) is not an error; those
/// calls are tolerated as no-ops.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TourError {
    #[error("navigation to {location} did not complete within {waited_ms} ms")]
    NavigationTimeout { location: Location, waited_ms: u64 },
    #[error("a step transition is already in progress")]
    TransitionInProgress,
    #[error("unknown tour: {0}")]
    UnknownTour(TourId),
}
