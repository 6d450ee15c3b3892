//! Material states and their static transition data

use serde::{Deserialize, Serialize};
use std::fmt;

/// Conductive material of a conduit node
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MaterialState {
    /// Loses half of the total budget (plastic casing)
    #[default]
    Insulator,
    /// Loses nothing (metal)
    Conductor,
    /// Loses twice the total budget, always exhausting it (water)
    Absorber,
}

impl MaterialState {
    pub const ALL: [MaterialState; 3] = [
        MaterialState::Insulator,
        MaterialState::Conductor,
        MaterialState::Absorber,
    ];

    /// Fraction of the *total* budget lost when a node of this material heats
    pub fn loss_factor(self) -> f32 {
        match self {
            MaterialState::Insulator => 0.5,
            MaterialState::Conductor => 0.0,
            MaterialState::Absorber => 2.0,
        }
    }

    /// Upper-case label shown on the group's display screen
    pub fn name(self) -> &'static str {
        match self {
            MaterialState::Insulator => "INSULATOR",
            MaterialState::Conductor => "CONDUCTOR",
            MaterialState::Absorber => "ABSORBER",
        }
    }

    /// Visual and audio keys for presentation collaborators
    pub fn transition_data(self) -> &'static TransitionData {
        match self {
            MaterialState::Insulator => &TRANSITION_TABLE[0],
            MaterialState::Conductor => &TRANSITION_TABLE[1],
            MaterialState::Absorber => &TRANSITION_TABLE[2],
        }
    }
}

impl fmt::Display for MaterialState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Per-material presentation parameters
///
/// The engine never interprets these keys; they travel with commit events so
/// renderers and audio mixers can look up their own assets.
#[derive(Clone, Debug, PartialEq)]
pub struct TransitionData {
    pub state: MaterialState,
    /// Material applied to a node's mesh once it changes
    pub segment_material: &'static str,
    /// Material used by the glow overlay while a transition runs
    pub glow_material: &'static str,
    /// Glow light color (RGBA)
    pub glow_color: [u8; 4],
    /// One-shot sound played when the group commits
    pub change_sound: &'static str,
    /// Indicator lamp switched on when the transition is requested
    pub indicator: &'static str,
}

static TRANSITION_TABLE: [TransitionData; 3] = [
    TransitionData {
        state: MaterialState::Insulator,
        segment_material: "segment_plastic",
        glow_material: "glow_plastic",
        glow_color: [235, 235, 220, 255],
        change_sound: "sfx_change_plastic",
        indicator: "indicator_none",
    },
    TransitionData {
        state: MaterialState::Conductor,
        segment_material: "segment_metal",
        glow_material: "glow_metal",
        glow_color: [255, 170, 60, 255],
        change_sound: "sfx_change_metal",
        indicator: "indicator_metal",
    },
    TransitionData {
        state: MaterialState::Absorber,
        segment_material: "segment_water",
        glow_material: "glow_water",
        glow_color: [70, 140, 255, 255],
        change_sound: "sfx_change_water",
        indicator: "indicator_water",
    },
];
