//! Tour domain models
//!
//! This module defines the guided tour data model: the caller-supplied step
//! descriptors, the engine-owned state, the durable progress record and the
//! pure state machine that drives activation and step transitions.

mod catalog;
mod error;
mod navigation;
mod progress;
mod registry;
mod state;
pub mod state_machine;
mod step;

pub use catalog::{StepDefinition, TourCatalog, TourDefinition};
pub use error::TourError;
pub use navigation::NavigationOutcome;
pub use progress::TourProgress;
pub use registry::TourRegistry;
pub use state::{PreferenceKey, TourState, UserPreferences};
pub use state_machine::{FinishReason, TourAction, TourEvent, TourStateMachine};
pub use step::{Placement, StepHook, StepPredicate, TourStep};
