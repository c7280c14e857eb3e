pub mod events;
pub mod navigation;
pub mod persistence;
pub mod storage;

pub use events::TracingTourEventPort;
pub use navigation::SimulatedRouter;
pub use persistence::DebouncedTourPersistence;
pub use storage::{FileKeyValueStore, InMemoryKeyValueStore};
