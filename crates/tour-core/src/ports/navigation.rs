use crate::ids::Location;

/// Routing capability supplied by the host application.
///
/// The engine never awaits a navigation; it requests one and then polls
/// [`NavigationPort::current_location`] until the target is reported.
pub trait NavigationPort: Send + Sync {
    fn current_location(&self) -> Location;

    /// Fire-and-forget navigation request.
    fn request_navigate(&self, to: &Location);
}
