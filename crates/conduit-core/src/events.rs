//! Outbound notifications for presentation collaborators

use conduit_simulation::MaterialState;

use crate::ids::{GroupId, SinkId, SourceId};
use crate::network::NodeId;

/// Something observable happened inside the engine
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum ConductionEvent {
    /// A node's ramp reached its fill target
    NodeHeated { node: NodeId },
    /// A node's ramp drained back to zero
    NodeCooled { node: NodeId },
    /// A node with a sink heated with a sufficient budget
    SinkActivated { sink: SinkId, node: NodeId },
    SourceIgnited { source: SourceId },
    /// The source's root finished cooling after a failed propagation
    HeatingStopped { source: SourceId },
    /// A transition was accepted; indicator lamps may switch now
    TransitionRequested { group: GroupId, state: MaterialState },
    /// Fired once per accepted transition, by the first member to peak
    TransitionCommitted { group: GroupId, state: MaterialState },
    /// One member node took on the new material
    NodeMaterialChanged { node: NodeId, state: MaterialState },
    /// Every member finished its glow; the group accepts requests again
    TransitionSettled { group: GroupId },
}

/// Queue of events waiting to be drained by the caller
#[derive(Debug, Default)]
pub struct EventLog {
    pending: Vec<ConductionEvent>,
}

impl EventLog {
    pub fn push(&mut self, event: ConductionEvent) {
        log::trace!("event {:?}", event);
        self.pending.push(event);
    }

    pub fn drain(&mut self) -> Vec<ConductionEvent> {
        std::mem::take(&mut self.pending)
    }

    pub fn pending(&self) -> &[ConductionEvent] {
        &self.pending
    }

    pub fn count(&self, pred: impl Fn(&ConductionEvent) -> bool) -> usize {
        self.pending.iter().filter(|e| pred(e)).count()
    }

    pub fn clear(&mut self) {
        self.pending.clear();
    }
}
