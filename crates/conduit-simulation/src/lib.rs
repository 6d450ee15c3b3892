//! Material data and energy budgets for Conduit
//!
//! This crate provides the foundational data types for heat propagation:
//! - Material states and their per-material transition data
//! - Energy budgets carried along a propagation path

mod budget;
mod materials;

pub use budget::EnergyBudget;
pub use materials::{MaterialState, TransitionData};
