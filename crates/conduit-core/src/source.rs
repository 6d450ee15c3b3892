//! Heat sources (generators)

use crate::ids::{GroupId, SourceId};
use crate::network::NodeId;

/// Root-level entry point injecting energy into one tree
#[derive(Clone, Debug)]
pub struct Source {
    pub name: String,
    pub(crate) root: NodeId,
    /// Transition group whose changes block ignition
    pub(crate) group: Option<GroupId>,
    pub(crate) is_heating: bool,
    pub(crate) initial_energy: f32,
}

impl Source {
    pub fn new(name: impl Into<String>, root: NodeId, initial_energy: f32) -> Self {
        Self {
            name: name.into(),
            root,
            group: None,
            is_heating: false,
            initial_energy,
        }
    }

    pub fn root(&self) -> NodeId {
        self.root
    }

    pub fn group(&self) -> Option<GroupId> {
        self.group
    }

    pub fn is_heating(&self) -> bool {
        self.is_heating
    }

    pub fn initial_energy(&self) -> f32 {
        self.initial_energy
    }
}

/// What a node does after its failed propagation has cooled
///
/// Copied into every node along a propagation path alongside the budget.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FailureHook {
    Ignore,
    /// Stop the source once its root node is cool again
    StopSource(SourceId),
}

/// Result of [`ConductionWorld::ignite`](crate::ConductionWorld::ignite)
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum IgniteOutcome {
    Ignited,
    AlreadyHeating,
    RootNotCool,
    /// The paired transition group is still changing material
    TransitionInProgress,
}

impl IgniteOutcome {
    pub fn is_ignited(self) -> bool {
        self == IgniteOutcome::Ignited
    }
}
