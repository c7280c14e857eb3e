//! Demo host for the product tour engine.
//!
//! Loads configuration, initializes tracing and wires the engine to the file
//! store and the simulated router. The binary in `main.rs` drives it.

pub mod bootstrap;
