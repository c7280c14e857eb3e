/// Result of waiting for the host router to reach a location.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NavigationOutcome {
    /// The location was reached and the settle delay elapsed.
    Reached,
    /// The location was not reached within the configured bound.
    TimedOut,
    /// The wait was cancelled (tour ended) before it resolved.
    Cancelled,
}
