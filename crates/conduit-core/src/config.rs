//! Engine tuning parameters
//!
//! Every section falls back to compiled defaults, so a partial RON file or an
//! empty config source deserializes cleanly.

use serde::{Deserialize, Serialize};

use crate::scheduler::TaskOrder;

/// Top-level engine configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ConductionConfig {
    #[serde(default)]
    pub ramp: RampConfig,

    #[serde(default)]
    pub heating: HeatingConfig,

    #[serde(default)]
    pub transition: TransitionConfig,

    #[serde(default)]
    pub scheduler: SchedulerConfig,
}

/// Fill-level ramp rates shared by every node
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RampConfig {
    /// Linear rise rate while heating (fill per second)
    pub fill_rate: f32,
    /// Initial fall rate when cooling starts (fill per second)
    pub cool_start_rate: f32,
    /// Per-tick multiplier applied to the fall rate, capped at `fill_rate`
    pub cool_acceleration: f32,
    /// Fill level at which a cooling ramp snaps to zero
    pub cooled_threshold: f32,
}

impl Default for RampConfig {
    fn default() -> Self {
        Self {
            fill_rate: 0.4,
            cool_start_rate: 0.01,
            cool_acceleration: 1.01,
            cooled_threshold: 0.01,
        }
    }
}

/// Source energy and per-node heating outcome parameters
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HeatingConfig {
    /// Energy injected by a source on ignition
    pub source_energy: f32,
    /// Fill target when the budget is sufficient
    pub success_fill: f32,
    /// Fill target when the budget runs out at this node
    pub failure_fill: f32,
    /// Pause between a failed node filling and its cooldown
    pub failure_grace_secs: f32,
}

impl Default for HeatingConfig {
    fn default() -> Self {
        Self {
            source_energy: 100.0,
            success_fill: 0.99,
            failure_fill: 0.5,
            failure_grace_secs: 2.0,
        }
    }
}

/// Material transition glow parameters
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TransitionConfig {
    /// Nominal length of one glow pulse in seconds
    pub change_duration_secs: f32,
    /// Glow speed used by layouts that do not list one per member
    pub default_glow_speed: f32,
    /// Treat a member/glow count mismatch as an error instead of a warning
    pub strict_wiring: bool,
}

impl Default for TransitionConfig {
    fn default() -> Self {
        Self {
            change_duration_secs: 2.0,
            default_glow_speed: 1.0,
            strict_wiring: false,
        }
    }
}

/// Cooperative scheduler settings
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SchedulerConfig {
    /// Order in which tasks are stepped within one tick
    pub order: TaskOrder,
    /// Seed for `TaskOrder::Shuffled`
    pub seed: u64,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            order: TaskOrder::Fifo,
            seed: 0x5EED,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = ConductionConfig::default();
        assert_eq!(config.ramp.fill_rate, 0.4);
        assert_eq!(config.heating.source_energy, 100.0);
        assert_eq!(config.heating.failure_grace_secs, 2.0);
        assert!(!config.transition.strict_wiring);
        assert_eq!(config.scheduler.order, TaskOrder::Fifo);
    }

    #[test]
    fn test_partial_ron_uses_defaults() {
        let config: ConductionConfig =
            ron::from_str("(heating: (failure_grace_secs: 0.5), scheduler: (order: Reversed))")
                .unwrap();
        assert_eq!(config.heating.failure_grace_secs, 0.5);
        assert_eq!(config.heating.source_energy, 100.0);
        assert_eq!(config.scheduler.order, TaskOrder::Reversed);
        assert_eq!(config.ramp, RampConfig::default());
    }
}
