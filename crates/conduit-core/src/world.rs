//! Conduction world - owns the network, sources, groups and the scheduler
//!
//! All mutation happens on the caller's thread through `tick(dt)` and the two
//! entry points, [`ConductionWorld::ignite`] and
//! [`ConductionWorld::request_transition`].

use ahash::AHashMap;
use conduit_simulation::{EnergyBudget, MaterialState};

use crate::config::ConductionConfig;
use crate::convergence::Convergence;
use crate::error::{ConductionError, Result};
use crate::events::{ConductionEvent, EventLog};
use crate::glow::GlowPulse;
use crate::ids::{GroupId, SinkId, SourceId};
use crate::network::{HeatState, Network, NodeId, PropagationNode};
use crate::scheduler::{Scheduler, TaskId, TaskStatus};
use crate::sink::Sink;
use crate::source::{FailureHook, IgniteOutcome, Source};
use crate::tasks::Task;
use crate::transition::{GlowChannel, TransitionGroup, TransitionOutcome};

pub struct ConductionWorld {
    config: ConductionConfig,
    network: Network,
    sources: Vec<Source>,
    groups: Vec<TransitionGroup>,
    sinks: Vec<Sink>,
    scheduler: Scheduler,
    events: EventLog,
    /// Heating ramp currently driving each node, so `cool` can interrupt it
    heat_ramps: AHashMap<NodeId, TaskId>,
}

impl ConductionWorld {
    pub fn new(config: ConductionConfig) -> Self {
        Self {
            scheduler: Scheduler::new(config.scheduler),
            config,
            network: Network::new(),
            sources: Vec::new(),
            groups: Vec::new(),
            sinks: Vec::new(),
            events: EventLog::default(),
            heat_ramps: AHashMap::new(),
        }
    }

    // ---------------------------------------------------------------------
    // Level construction
    // ---------------------------------------------------------------------

    pub fn add_node(&mut self, name: impl Into<String>, material: MaterialState) -> NodeId {
        self.network
            .add_node(PropagationNode::new(name, material, self.config.ramp))
    }

    pub fn connect(&mut self, parent: NodeId, child: NodeId) -> Result<()> {
        for id in [parent, child] {
            if !self.network.contains(id) {
                return Err(ConductionError::UnknownNode(id));
            }
        }
        self.network.connect(parent, child);
        Ok(())
    }

    pub fn add_sink(&mut self, name: impl Into<String>) -> SinkId {
        self.sinks.push(Sink::new(name));
        SinkId(self.sinks.len() - 1)
    }

    pub fn attach_sink(&mut self, node: NodeId, sink: SinkId) -> Result<()> {
        if sink.0 >= self.sinks.len() {
            return Err(ConductionError::UnknownSink(sink));
        }
        let node_ref = self
            .network
            .get_mut(node)
            .ok_or(ConductionError::UnknownNode(node))?;
        node_ref.sink = Some(sink);
        Ok(())
    }

    /// Add a source feeding `root` with the configured energy
    pub fn add_source(&mut self, name: impl Into<String>, root: NodeId) -> Result<SourceId> {
        if !self.network.contains(root) {
            return Err(ConductionError::UnknownNode(root));
        }
        let energy = self.config.heating.source_energy;
        self.sources.push(Source::new(name, root, energy));
        Ok(SourceId(self.sources.len() - 1))
    }

    pub fn add_group(
        &mut self,
        name: impl Into<String>,
        members: Vec<NodeId>,
        glows: Vec<GlowChannel>,
    ) -> Result<GroupId> {
        if let Some(missing) = members.iter().find(|id| !self.network.contains(**id)) {
            return Err(ConductionError::UnknownNode(*missing));
        }
        let name = name.into();
        if members.len() != glows.len() {
            log::warn!(
                "Group '{}' has {} members but {} glow channels",
                name,
                members.len(),
                glows.len()
            );
        }
        let initial = members
            .first()
            .and_then(|id| self.network.get(*id))
            .map(|n| n.material)
            .unwrap_or_default();
        self.groups
            .push(TransitionGroup::new(name, members, glows, initial));
        Ok(GroupId(self.groups.len() - 1))
    }

    /// Link a source and a group so each blocks the other while busy
    pub fn pair(&mut self, source: SourceId, group: GroupId) -> Result<()> {
        let group_ref = self
            .groups
            .get_mut(group.0)
            .ok_or(ConductionError::UnknownGroup(group))?;
        let source_ref = self
            .sources
            .get_mut(source.0)
            .ok_or(ConductionError::UnknownSource(source))?;
        group_ref.source = Some(source);
        source_ref.group = Some(group);
        Ok(())
    }

    // ---------------------------------------------------------------------
    // Propagation
    // ---------------------------------------------------------------------

    /// Start heating `node` with `budget`
    ///
    /// No-op (returns `false`) unless the node is cool. The node's material
    /// loss is applied immediately; the outcome is decided when its ramp
    /// completes.
    pub fn heat(&mut self, node: NodeId, budget: EnergyBudget, on_failure: FailureHook) -> bool {
        let heating = self.config.heating;
        let Some(node_ref) = self.network.get_mut(node) else {
            return false;
        };
        if node_ref.heat_state() != HeatState::Cool {
            return false;
        }

        let remaining = budget.after_loss(node_ref.material);
        let target = if remaining.is_sufficient() {
            heating.success_fill
        } else {
            heating.failure_fill
        };
        node_ref.convergence.heat(target);
        node_ref.starved = !remaining.is_sufficient();
        log::debug!(
            "Heating '{}' ({}) toward {:.2} with {:.1}/{:.1} energy left",
            node_ref.name,
            node_ref.material,
            target,
            remaining.current,
            remaining.total
        );

        let id = self.scheduler.spawn(
            Some(node),
            Task::HeatRamp {
                node,
                budget: remaining,
                on_failure,
            },
        );
        self.heat_ramps.insert(node, id);
        true
    }

    /// Start cooling `node`, interrupting a heating ramp if one is running
    ///
    /// No-op (returns `false`) if the node is cool or already cooling.
    pub fn cool(&mut self, node: NodeId) -> bool {
        let Some(node_ref) = self.network.get_mut(node) else {
            return false;
        };
        if !node_ref.convergence.cool() {
            return false;
        }
        log::debug!("Cooling '{}' from {:.2}", node_ref.name, node_ref.fill());

        if let Some(ramp) = self.heat_ramps.remove(&node) {
            self.scheduler.cancel(ramp);
        }
        self.scheduler.spawn(Some(node), Task::CoolRamp { node });
        true
    }

    pub(crate) fn finish_heating(
        &mut self,
        node: NodeId,
        budget: EnergyBudget,
        on_failure: FailureHook,
    ) {
        self.heat_ramps.remove(&node);
        self.events.push(ConductionEvent::NodeHeated { node });

        if !budget.is_sufficient() {
            let grace = self.config.heating.failure_grace_secs;
            self.scheduler.spawn(
                Some(node),
                Task::FailureGrace {
                    node,
                    remaining: grace,
                    on_failure,
                },
            );
            return;
        }

        for child in self.network.children(node) {
            self.heat(child, budget, on_failure);
        }

        if let Some(sink) = self.network.get(node).and_then(|n| n.sink) {
            self.activate_sink(sink, node);
        }
    }

    pub(crate) fn finish_cooling(&mut self, node: NodeId) {
        self.events.push(ConductionEvent::NodeCooled { node });
        for child in self.network.children(node) {
            if self.heat_state(child) != Some(HeatState::Cool) {
                self.cool(child);
            }
        }
    }

    pub(crate) fn invoke_hook(&mut self, hook: FailureHook) {
        match hook {
            FailureHook::Ignore => {}
            FailureHook::StopSource(source) => {
                self.scheduler
                    .spawn(None, Task::AwaitRootCooled { source });
            }
        }
    }

    fn activate_sink(&mut self, sink: SinkId, node: NodeId) {
        let Some(sink_ref) = self.sinks.get_mut(sink.0) else {
            return;
        };
        if sink_ref.activated {
            return;
        }
        sink_ref.activated = true;
        log::info!("Sink '{}' activated", sink_ref.name);
        self.events
            .push(ConductionEvent::SinkActivated { sink, node });
    }

    /// Switch a sink back off (the launch sequence does this after a failed attempt)
    pub fn deactivate_sink(&mut self, sink: SinkId) -> Result<()> {
        let sink_ref = self
            .sinks
            .get_mut(sink.0)
            .ok_or(ConductionError::UnknownSink(sink))?;
        sink_ref.activated = false;
        Ok(())
    }

    // ---------------------------------------------------------------------
    // Sources
    // ---------------------------------------------------------------------

    /// Ignite a source, pushing a fresh budget into its root node
    pub fn ignite(&mut self, source: SourceId) -> Result<IgniteOutcome> {
        let source_ref = self
            .sources
            .get(source.0)
            .ok_or(ConductionError::UnknownSource(source))?;

        if source_ref.is_heating {
            return Ok(IgniteOutcome::AlreadyHeating);
        }
        if let Some(group) = source_ref.group {
            if self.groups.get(group.0).is_some_and(|g| g.is_changing()) {
                return Ok(IgniteOutcome::TransitionInProgress);
            }
        }
        let root = source_ref.root;
        if self.heat_state(root) != Some(HeatState::Cool) {
            return Ok(IgniteOutcome::RootNotCool);
        }

        let budget = EnergyBudget::new(source_ref.initial_energy);
        log::info!(
            "Source '{}' ignited with {:.0} energy",
            source_ref.name,
            budget.total
        );
        self.sources[source.0].is_heating = true;
        self.events.push(ConductionEvent::SourceIgnited { source });
        self.heat(root, budget, FailureHook::StopSource(source));
        Ok(IgniteOutcome::Ignited)
    }

    /// Clear a source's heating flag; no-op if it is not heating
    pub fn stop_heating(&mut self, source: SourceId) {
        let Some(source_ref) = self.sources.get_mut(source.0) else {
            return;
        };
        if !source_ref.is_heating {
            return;
        }
        source_ref.is_heating = false;
        log::info!("Source '{}' stopped heating", source_ref.name);
        self.events
            .push(ConductionEvent::HeatingStopped { source });
    }

    // ---------------------------------------------------------------------
    // Material transitions
    // ---------------------------------------------------------------------

    /// Swap the material of every node in `group`
    ///
    /// Requests to the current state still run. A member/glow count mismatch
    /// is an error under strict wiring and a warning otherwise.
    pub fn request_transition(
        &mut self,
        group: GroupId,
        state: MaterialState,
    ) -> Result<TransitionOutcome> {
        let group_ref = self
            .groups
            .get(group.0)
            .ok_or(ConductionError::UnknownGroup(group))?;

        if let Some(source) = group_ref.source {
            if self.sources.get(source.0).is_some_and(|s| s.is_heating) {
                return Ok(TransitionOutcome::SourceHeating);
            }
        }
        if group_ref.is_changing() {
            return Ok(TransitionOutcome::AlreadyChanging);
        }

        let (members, glows) = (group_ref.members.len(), group_ref.glows.len());
        if members != glows {
            if self.config.transition.strict_wiring {
                return Err(ConductionError::GlowCountMismatch {
                    group,
                    members,
                    glows,
                });
            }
            log::warn!(
                "Group '{}' pulses only {} of {} members (glow channel mismatch)",
                group_ref.name,
                members.min(glows),
                members
            );
        }

        let channels = group_ref.channels();
        let duration = self.config.transition.change_duration_secs;
        let group_ref = &mut self.groups[group.0];
        let ticket = group_ref.begin(state, channels.iter().map(|(n, _)| *n).collect());
        log::info!("Group '{}' changing to {}", group_ref.name, state);
        self.events
            .push(ConductionEvent::TransitionRequested { group, state });

        if channels.is_empty() {
            self.commit_transition(group, ticket);
            self.groups[group.0].active = None;
            self.events
                .push(ConductionEvent::TransitionSettled { group });
            return Ok(TransitionOutcome::Started);
        }

        for (node, glow) in channels {
            self.scheduler.spawn(
                Some(node),
                Task::Glow {
                    group,
                    ticket,
                    node,
                    pulse: GlowPulse::new(glow.glow_speed, duration),
                },
            );
        }
        Ok(TransitionOutcome::Started)
    }

    /// First arrival claims the latch and commits; everyone changes their own node
    pub(crate) fn transition_midpoint(&mut self, group: GroupId, ticket: u64, node: NodeId) {
        if let Some(target) = self.commit_transition(group, ticket) {
            self.set_material(node, target);
        }
    }

    /// Claim the group's latch; returns the transition target if `ticket` is current
    ///
    /// The claiming call also switches members that have no glow channel.
    fn commit_transition(&mut self, group: GroupId, ticket: u64) -> Option<MaterialState> {
        let group_ref = self.groups.get_mut(group.0)?;
        let active = group_ref.active_mut(ticket)?;
        let target = active.target;
        if !active.try_commit() {
            return Some(target);
        }

        group_ref.committed = target;
        let data = target.transition_data();
        log::info!(
            "Group '{}' committed {} (sound '{}')",
            group_ref.name,
            target,
            data.change_sound
        );
        let unpaired = group_ref.unpaired();
        self.events
            .push(ConductionEvent::TransitionCommitted { group, state: target });
        for node in unpaired {
            self.set_material(node, target);
        }
        Some(target)
    }

    fn set_material(&mut self, node: NodeId, state: MaterialState) {
        if let Some(node_ref) = self.network.get_mut(node) {
            node_ref.material = state;
            log::debug!("Node '{}' is now {}", node_ref.name, state);
            self.events
                .push(ConductionEvent::NodeMaterialChanged { node, state });
        }
    }

    pub(crate) fn transition_settled(&mut self, group: GroupId, ticket: u64, node: NodeId) {
        let Some(group_ref) = self.groups.get_mut(group.0) else {
            return;
        };
        let Some(active) = group_ref.active_mut(ticket) else {
            return;
        };
        if active.settle(node) {
            let pulses = active.settled_count();
            log::debug!("Group '{}' settled after {} pulses", group_ref.name, pulses);
            group_ref.active = None;
            self.events
                .push(ConductionEvent::TransitionSettled { group });
        }
    }

    // ---------------------------------------------------------------------
    // Scheduling
    // ---------------------------------------------------------------------

    /// Step every live task once
    pub fn tick(&mut self, dt: f32) {
        let batch = self.scheduler.begin_tick(dt);
        let mut survivors = Vec::with_capacity(batch.len());
        for mut entry in batch {
            if self.scheduler.is_cancelled(entry.id) {
                continue;
            }
            match entry.task.step(self, dt) {
                TaskStatus::Pending => survivors.push(entry),
                TaskStatus::Complete => self.scheduler.complete(entry.id),
            }
        }
        self.scheduler.end_tick(survivors);
    }

    /// Tick for `secs` simulated seconds
    pub fn run_for(&mut self, secs: f32, dt: f32) {
        if dt <= 0.0 {
            return;
        }
        let steps = (secs / dt).ceil().max(0.0) as usize;
        for _ in 0..steps {
            self.tick(dt);
        }
    }

    /// Tick until `done` holds or `max_secs` elapse; returns whether it held
    pub fn run_until(
        &mut self,
        dt: f32,
        max_secs: f32,
        mut done: impl FnMut(&Self) -> bool,
    ) -> bool {
        if dt <= 0.0 {
            return done(self);
        }
        let mut waited = 0.0;
        while !done(self) {
            if waited >= max_secs {
                return false;
            }
            self.tick(dt);
            waited += dt;
        }
        true
    }

    /// Tick until no task is left
    pub fn run_until_idle(&mut self, dt: f32, max_secs: f32) -> bool {
        self.run_until(dt, max_secs, |w| w.is_idle())
    }

    pub fn is_idle(&self) -> bool {
        self.scheduler.active_count() == 0
    }

    // ---------------------------------------------------------------------
    // Teardown
    // ---------------------------------------------------------------------

    /// Remove a node, cancelling its tasks without running their completions
    pub fn destroy_node(&mut self, node: NodeId) -> Result<()> {
        if !self.network.contains(node) {
            return Err(ConductionError::UnknownNode(node));
        }
        let cancelled = self.scheduler.cancel_owned(node);
        self.heat_ramps.remove(&node);
        for (idx, group) in self.groups.iter_mut().enumerate() {
            if group.forget_member(node) {
                self.events.push(ConductionEvent::TransitionSettled {
                    group: GroupId(idx),
                });
            }
        }
        if let Some(removed) = self.network.remove(node) {
            log::debug!(
                "Destroyed node '{}' ({} tasks cancelled)",
                removed.name,
                cancelled
            );
        }
        Ok(())
    }

    /// Cancel every task and drop the whole level
    pub fn teardown(&mut self) {
        let cancelled = self.scheduler.cancel_all();
        log::info!(
            "Tearing down level: {} nodes, {} tasks cancelled",
            self.network.len(),
            cancelled
        );
        self.heat_ramps.clear();
        self.network.clear();
        self.sources.clear();
        self.groups.clear();
        self.sinks.clear();
        self.events.clear();
    }

    // ---------------------------------------------------------------------
    // Queries
    // ---------------------------------------------------------------------

    pub fn config(&self) -> &ConductionConfig {
        &self.config
    }

    pub fn network(&self) -> &Network {
        &self.network
    }

    pub fn node(&self, node: NodeId) -> Option<&PropagationNode> {
        self.network.get(node)
    }

    pub fn find_node(&self, name: &str) -> Option<NodeId> {
        self.network.find(name)
    }

    pub fn heat_state(&self, node: NodeId) -> Option<HeatState> {
        self.network.get(node).map(|n| n.heat_state())
    }

    pub(crate) fn convergence_mut(&mut self, node: NodeId) -> Option<&mut Convergence> {
        self.network.get_mut(node).map(|n| &mut n.convergence)
    }

    pub fn source(&self, source: SourceId) -> Option<&Source> {
        self.sources.get(source.0)
    }

    pub fn sources(&self) -> impl Iterator<Item = (SourceId, &Source)> {
        self.sources
            .iter()
            .enumerate()
            .map(|(i, s)| (SourceId(i), s))
    }

    pub fn is_heating(&self, source: SourceId) -> bool {
        self.source(source).is_some_and(|s| s.is_heating)
    }

    pub fn group(&self, group: GroupId) -> Option<&TransitionGroup> {
        self.groups.get(group.0)
    }

    pub fn groups(&self) -> impl Iterator<Item = (GroupId, &TransitionGroup)> {
        self.groups
            .iter()
            .enumerate()
            .map(|(i, g)| (GroupId(i), g))
    }

    pub fn is_changing(&self, group: GroupId) -> bool {
        self.group(group).is_some_and(|g| g.is_changing())
    }

    pub fn committed_state(&self, group: GroupId) -> Option<MaterialState> {
        self.group(group).map(|g| g.committed_state())
    }

    pub fn sink(&self, sink: SinkId) -> Option<&Sink> {
        self.sinks.get(sink.0)
    }

    pub fn sinks(&self) -> impl Iterator<Item = (SinkId, &Sink)> {
        self.sinks.iter().enumerate().map(|(i, s)| (SinkId(i), s))
    }

    pub fn scheduler(&self) -> &Scheduler {
        &self.scheduler
    }

    pub fn scheduler_mut(&mut self) -> &mut Scheduler {
        &mut self.scheduler
    }

    pub fn events(&self) -> &EventLog {
        &self.events
    }

    pub fn drain_events(&mut self) -> Vec<ConductionEvent> {
        self.events.drain()
    }
}

impl Default for ConductionWorld {
    fn default() -> Self {
        Self::new(ConductionConfig::default())
    }
}
