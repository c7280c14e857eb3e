//! Product tour application orchestration layer
//!
//! This crate contains the tour engine: it drives the pure state machine from
//! `tour-core`, synchronizes step advancement with host navigation and writes
//! durable progress through the persistence port.

pub mod usecases;

pub use usecases::tour::{NavigationWait, TourEngine, TourEngineDeps};
