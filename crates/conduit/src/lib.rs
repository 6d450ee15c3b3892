//! # Conduit - heat propagation puzzle runner
//!
//! Loads a level (built-in or RON layout), drives it with scripted
//! scenarios, and reports whether the ship could launch.

pub mod config;
pub mod scenario;

// Re-export the engine for convenience
pub use conduit_core as engine;
pub use conduit_core::levels;
