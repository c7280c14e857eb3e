//! # tour-core
//!
//! Core domain models and business logic for the guided product tour engine.
//!
//! This crate contains pure business logic without any infrastructure dependencies:
//! the tour data model, the pure transition function, configuration DTOs and the
//! ports implemented by the infrastructure layer.

// Public module exports
pub mod config;
pub mod ids;
pub mod ports;
pub mod tour;

// Re-export commonly used types at the crate root
pub use config::TourConfig;
pub use ids::{Location, TourId};
pub use tour::{
    NavigationOutcome, Placement, PreferenceKey, TourError, TourProgress, TourRegistry, TourState,
    TourStep, UserPreferences,
};
