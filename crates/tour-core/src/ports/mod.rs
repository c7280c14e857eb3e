//! Port interfaces for the application layer
//!
//! Ports define the contract between the tour engine and the host application
//! or infrastructure implementations. The engine never depends on a concrete
//! router or storage backend.

mod key_value_store;
mod navigation;
mod tour_event;
mod tour_persistence;

pub use key_value_store::KeyValueStorePort;
pub use navigation::NavigationPort;
pub use tour_event::TourEventPort;
pub use tour_persistence::TourPersistencePort;
