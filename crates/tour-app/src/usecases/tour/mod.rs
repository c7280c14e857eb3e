//! Tour use cases.
//!
//! This module exposes the tour engine and the navigation wait it relies on.

mod context;
pub mod engine;
pub mod navigation_wait;

pub use engine::{TourEngine, TourEngineDeps};
pub use navigation_wait::NavigationWait;
