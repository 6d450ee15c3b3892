//! Routing of player interactions onto sources and groups

use conduit_simulation::MaterialState;
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::ids::{GroupId, SourceId};
use crate::source::IgniteOutcome;
use crate::transition::TransitionOutcome;
use crate::world::ConductionWorld;

/// Elemental interaction applied by the player
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Stimulus {
    Fire,
    Metal,
    Water,
}

impl Stimulus {
    /// Material a transition group takes on when hit by this stimulus
    pub fn material(self) -> Option<MaterialState> {
        match self {
            Stimulus::Fire => None,
            Stimulus::Metal => Some(MaterialState::Conductor),
            Stimulus::Water => Some(MaterialState::Absorber),
        }
    }
}

/// Entity receiving a stimulus
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StimulusTarget {
    Source(SourceId),
    Group(GroupId),
}

/// What the stimulus ended up doing
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StimulusResponse {
    Ignition(IgniteOutcome),
    Transition(TransitionOutcome),
    /// The combination has no effect (fire on a group, metal on a source)
    Ignored,
}

impl ConductionWorld {
    /// FIRE ignites a source; METAL and WATER retarget a group's material
    pub fn apply_stimulus(
        &mut self,
        target: StimulusTarget,
        stimulus: Stimulus,
    ) -> Result<StimulusResponse> {
        let response = match (target, stimulus.material()) {
            (StimulusTarget::Source(source), None) => {
                StimulusResponse::Ignition(self.ignite(source)?)
            }
            (StimulusTarget::Group(group), Some(state)) => {
                StimulusResponse::Transition(self.request_transition(group, state)?)
            }
            _ => StimulusResponse::Ignored,
        };
        log::debug!("{:?} on {:?}: {:?}", stimulus, target, response);
        Ok(response)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transition::GlowChannel;

    #[test]
    fn test_stimulus_materials() {
        assert_eq!(Stimulus::Fire.material(), None);
        assert_eq!(Stimulus::Metal.material(), Some(MaterialState::Conductor));
        assert_eq!(Stimulus::Water.material(), Some(MaterialState::Absorber));
    }

    #[test]
    fn test_routing() {
        let mut world = ConductionWorld::default();
        let root = world.add_node("root", MaterialState::Insulator);
        let source = world.add_source("gen", root).unwrap();
        let group = world
            .add_group("g", vec![root], vec![GlowChannel { glow_speed: 1.0 }])
            .unwrap();

        let fire_on_group = world
            .apply_stimulus(StimulusTarget::Group(group), Stimulus::Fire)
            .unwrap();
        assert_eq!(fire_on_group, StimulusResponse::Ignored);

        let metal_on_source = world
            .apply_stimulus(StimulusTarget::Source(source), Stimulus::Metal)
            .unwrap();
        assert_eq!(metal_on_source, StimulusResponse::Ignored);

        let metal = world
            .apply_stimulus(StimulusTarget::Group(group), Stimulus::Metal)
            .unwrap();
        assert_eq!(
            metal,
            StimulusResponse::Transition(TransitionOutcome::Started)
        );
        assert_eq!(
            world.group(group).unwrap().pending_target(),
            Some(MaterialState::Conductor)
        );

        let fire = world
            .apply_stimulus(StimulusTarget::Source(source), Stimulus::Fire)
            .unwrap();
        assert_eq!(fire, StimulusResponse::Ignition(IgniteOutcome::Ignited));
        assert!(world.is_heating(source));
    }

    #[test]
    fn test_unknown_target_is_an_error() {
        let mut world = ConductionWorld::default();
        let result = world.apply_stimulus(StimulusTarget::Source(SourceId(7)), Stimulus::Fire);
        assert!(result.is_err());
    }
}
