//! Material transition groups
//!
//! A group swaps the material of a fixed set of nodes. Every member runs its
//! own glow pulse concurrently; the first pulse to peak claims a one-shot
//! latch and commits the group's new state on behalf of all of them. The
//! group keeps reporting `is_changing` until the slowest member settles.

use conduit_simulation::MaterialState;
use serde::{Deserialize, Serialize};
use std::cell::OnceCell;

use crate::ids::SourceId;
use crate::network::NodeId;

/// Glow parameters for one member
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct GlowChannel {
    pub glow_speed: f32,
}

/// Result of [`ConductionWorld::request_transition`](crate::ConductionWorld::request_transition)
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TransitionOutcome {
    Started,
    /// The paired source is heating; conductivity may not change mid-propagation
    SourceHeating,
    /// A transition is already running; requests are dropped, not queued
    AlreadyChanging,
}

/// Bookkeeping for the transition currently running in a group
#[derive(Debug)]
pub(crate) struct ActiveTransition {
    pub ticket: u64,
    pub target: MaterialState,
    latch: OnceCell<MaterialState>,
    /// Members whose pulse has not settled yet
    outstanding: Vec<NodeId>,
    settled: usize,
}

impl ActiveTransition {
    fn new(ticket: u64, target: MaterialState, members: Vec<NodeId>) -> Self {
        Self {
            ticket,
            target,
            latch: OnceCell::new(),
            outstanding: members,
            settled: 0,
        }
    }

    /// Claim the commit; only the first caller gets `true`
    pub fn try_commit(&self) -> bool {
        self.latch.set(self.target).is_ok()
    }

    pub fn is_committed(&self) -> bool {
        self.latch.get().is_some()
    }

    /// Record `node` as settled; returns `true` once nobody is outstanding
    pub fn settle(&mut self, node: NodeId) -> bool {
        if let Some(pos) = self.outstanding.iter().position(|n| *n == node) {
            self.outstanding.swap_remove(pos);
            self.settled += 1;
        }
        self.outstanding.is_empty()
    }

    /// Stop waiting on a member that no longer exists
    fn forget(&mut self, node: NodeId) -> bool {
        self.outstanding.retain(|n| *n != node);
        self.outstanding.is_empty()
    }

    pub fn settled_count(&self) -> usize {
        self.settled
    }
}

/// A fixed set of nodes whose material changes together
#[derive(Debug)]
pub struct TransitionGroup {
    pub name: String,
    pub(crate) members: Vec<NodeId>,
    pub(crate) glows: Vec<GlowChannel>,
    pub(crate) committed: MaterialState,
    /// Source whose heating blocks transitions
    pub(crate) source: Option<SourceId>,
    pub(crate) active: Option<ActiveTransition>,
    next_ticket: u64,
}

impl TransitionGroup {
    pub fn new(
        name: impl Into<String>,
        members: Vec<NodeId>,
        glows: Vec<GlowChannel>,
        initial: MaterialState,
    ) -> Self {
        Self {
            name: name.into(),
            members,
            glows,
            committed: initial,
            source: None,
            active: None,
            next_ticket: 0,
        }
    }

    pub fn is_changing(&self) -> bool {
        self.active.is_some()
    }

    /// State last committed by a transition (or the initial state)
    pub fn committed_state(&self) -> MaterialState {
        self.committed
    }

    /// Target of the running transition, if any
    pub fn pending_target(&self) -> Option<MaterialState> {
        self.active.as_ref().map(|a| a.target)
    }

    /// Whether the running transition has already committed
    pub fn is_committed(&self) -> bool {
        self.active.as_ref().is_some_and(|a| a.is_committed())
    }

    pub fn members(&self) -> &[NodeId] {
        &self.members
    }

    pub fn glows(&self) -> &[GlowChannel] {
        &self.glows
    }

    pub fn source(&self) -> Option<SourceId> {
        self.source
    }

    /// Member/glow pairs that will actually pulse
    pub(crate) fn channels(&self) -> Vec<(NodeId, GlowChannel)> {
        self.members
            .iter()
            .copied()
            .zip(self.glows.iter().copied())
            .collect()
    }

    /// Members left without a glow channel by a lenient wiring mismatch
    pub(crate) fn unpaired(&self) -> Vec<NodeId> {
        self.members.iter().skip(self.glows.len()).copied().collect()
    }

    pub(crate) fn begin(&mut self, target: MaterialState, members: Vec<NodeId>) -> u64 {
        let ticket = self.next_ticket;
        self.next_ticket += 1;
        self.active = Some(ActiveTransition::new(ticket, target, members));
        ticket
    }

    pub(crate) fn active_mut(&mut self, ticket: u64) -> Option<&mut ActiveTransition> {
        self.active.as_mut().filter(|a| a.ticket == ticket)
    }

    /// Drop a destroyed node from the group
    ///
    /// Returns `true` if that finished the running transition.
    pub(crate) fn forget_member(&mut self, node: NodeId) -> bool {
        if let Some(pos) = self.members.iter().position(|n| *n == node) {
            self.members.remove(pos);
            if pos < self.glows.len() {
                self.glows.remove(pos);
            }
        }
        let finished = self.active.as_mut().is_some_and(|a| a.forget(node));
        if finished {
            self.active = None;
        }
        finished
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ids(n: usize) -> Vec<NodeId> {
        (0..n).map(NodeId::new).collect()
    }

    #[test]
    fn test_latch_commits_once() {
        let mut group = TransitionGroup::new("g", ids(3), vec![], MaterialState::Insulator);
        let ticket = group.begin(MaterialState::Conductor, ids(3));
        let active = group.active_mut(ticket).unwrap();
        let claims: Vec<bool> = (0..3).map(|_| active.try_commit()).collect();
        assert_eq!(claims, vec![true, false, false]);
        assert!(active.is_committed());
    }

    #[test]
    fn test_settles_only_after_every_member() {
        let mut group = TransitionGroup::new("g", ids(3), vec![], MaterialState::Insulator);
        let ticket = group.begin(MaterialState::Absorber, ids(3));
        let active = group.active_mut(ticket).unwrap();
        assert!(!active.settle(NodeId::new(2)));
        assert!(!active.settle(NodeId::new(2)));
        assert!(!active.settle(NodeId::new(0)));
        assert!(active.settle(NodeId::new(1)));
        assert_eq!(active.settled_count(), 3);
    }

    #[test]
    fn test_stale_ticket_is_ignored() {
        let mut group = TransitionGroup::new("g", ids(1), vec![], MaterialState::Insulator);
        let first = group.begin(MaterialState::Conductor, ids(1));
        group.active = None;
        let second = group.begin(MaterialState::Absorber, ids(1));
        assert_ne!(first, second);
        assert!(group.active_mut(first).is_none());
        assert!(group.active_mut(second).is_some());
    }

    #[test]
    fn test_forget_member_finishes_transition() {
        let glows = vec![GlowChannel { glow_speed: 1.0 }; 2];
        let mut group = TransitionGroup::new("g", ids(2), glows, MaterialState::Insulator);
        let ticket = group.begin(MaterialState::Conductor, ids(2));
        group.active_mut(ticket).unwrap().settle(NodeId::new(0));

        assert!(group.forget_member(NodeId::new(1)));
        assert!(!group.is_changing());
        assert_eq!(group.members(), &[NodeId::new(0)]);
        assert_eq!(group.glows().len(), 1);
    }
}
