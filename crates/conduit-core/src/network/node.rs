//! Propagation node data

use conduit_simulation::MaterialState;
use serde::{Deserialize, Serialize};

use crate::config::RampConfig;
use crate::convergence::{Convergence, ConvergenceState};
use crate::ids::SinkId;

/// Thermal status of a node as seen from outside
///
/// Derived from the node's single convergence ramp so the two can never
/// disagree.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum HeatState {
    Cool,
    Heating,
    Hot,
    /// Ramp finished at the failure fill; waiting out the grace delay
    Starved,
    Cooling,
}

impl HeatState {
    fn derive(state: ConvergenceState, starved: bool) -> Self {
        match state {
            ConvergenceState::Cooled => HeatState::Cool,
            ConvergenceState::Heating => HeatState::Heating,
            ConvergenceState::Heated if starved => HeatState::Starved,
            ConvergenceState::Heated => HeatState::Hot,
            ConvergenceState::Cooling => HeatState::Cooling,
        }
    }
}

/// A vertex of the conduit network
#[derive(Clone, Debug)]
pub struct PropagationNode {
    pub name: String,
    pub(crate) material: MaterialState,
    pub(crate) convergence: Convergence,
    pub(crate) sink: Option<SinkId>,
    /// The current heating attempt ran out of budget here
    pub(crate) starved: bool,
}

impl PropagationNode {
    pub fn new(name: impl Into<String>, material: MaterialState, ramp: RampConfig) -> Self {
        Self {
            name: name.into(),
            material,
            convergence: Convergence::new(ramp),
            sink: None,
            starved: false,
        }
    }

    pub fn material(&self) -> MaterialState {
        self.material
    }

    pub fn heat_state(&self) -> HeatState {
        HeatState::derive(self.convergence.state(), self.starved)
    }

    pub fn is_heated(&self) -> bool {
        self.heat_state() == HeatState::Hot
    }

    pub fn fill(&self) -> f32 {
        self.convergence.fill()
    }

    pub fn sink(&self) -> Option<SinkId> {
        self.sink
    }

    pub fn convergence(&self) -> &Convergence {
        &self.convergence
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn heated(starved: bool) -> PropagationNode {
        let mut node = PropagationNode::new("n", MaterialState::Absorber, RampConfig::default());
        node.starved = starved;
        node.convergence.heat(0.5);
        while node.convergence.advance(0.1) != ConvergenceState::Heated {}
        node
    }

    #[test]
    fn test_starved_node_is_not_hot() {
        let node = heated(true);
        assert_eq!(node.heat_state(), HeatState::Starved);
        assert!(!node.is_heated());

        let node = heated(false);
        assert_eq!(node.heat_state(), HeatState::Hot);
        assert!(node.is_heated());
    }
}
