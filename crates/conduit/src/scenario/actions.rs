//! Scenario actions

use conduit_core::{MaterialState, Stimulus, TreeId};
use serde::{Deserialize, Serialize};

/// Which entity of a tree a stimulus hits
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TargetRef {
    /// The tree's generator
    Source(TreeId),
    /// The tree's state changer
    Group(TreeId),
}

/// Individual scenario actions
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum ScenarioAction {
    // === PLAYER INTERACTIONS ===
    /// Hit a source or group with an element
    Stimulate {
        target: TargetRef,
        stimulus: Stimulus,
    },

    /// Ignite a tree's source directly
    Ignite { tree: TreeId },

    /// Request a material transition on a tree's group directly
    RequestTransition { tree: TreeId, state: MaterialState },

    // === TIMING ===
    /// Advance the simulation by a fixed amount of time
    WaitSeconds { seconds: f32 },

    /// Advance until every node of both trees is HOT
    WaitUntilAllHot {
        #[serde(default)]
        timeout: Option<f32>,
    },

    /// Advance until no transition group is changing
    WaitUntilSettled {
        #[serde(default)]
        timeout: Option<f32>,
    },

    // === LAUNCH ===
    /// Run the ship's launch sequence against the puzzle state
    AttemptLaunch {
        #[serde(default = "default_countdown")]
        countdown_secs: f32,
    },

    // === DEBUG ===
    /// Write a message to the execution log
    Log { message: String },
}

fn default_countdown() -> f32 {
    3.0
}
