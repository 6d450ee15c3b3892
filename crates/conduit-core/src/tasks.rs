//! Scheduled units of work
//!
//! Each variant is one resumable activity. `step` advances it by one tick and
//! hands any completion logic back to the world.

use conduit_simulation::EnergyBudget;

use crate::convergence::ConvergenceState;
use crate::glow::{GlowMilestone, GlowPulse};
use crate::ids::{GroupId, SourceId};
use crate::network::{HeatState, NodeId};
use crate::scheduler::TaskStatus;
use crate::source::FailureHook;
use crate::world::ConductionWorld;

/// Discriminant of [`Task`], for logging
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TaskKind {
    HeatRamp,
    CoolRamp,
    FailureGrace,
    AwaitRootCooled,
    Glow,
}

pub(crate) enum Task {
    /// Drive a node's fill up to its target, then fan out or fail
    HeatRamp {
        node: NodeId,
        budget: EnergyBudget,
        on_failure: FailureHook,
    },
    /// Drive a node's fill down to zero, then cascade to its children
    CoolRamp { node: NodeId },
    /// Hold a failed node at partial fill before cooling it
    FailureGrace {
        node: NodeId,
        remaining: f32,
        on_failure: FailureHook,
    },
    /// Wait until a source's root is cool, then stop the source
    AwaitRootCooled { source: SourceId },
    /// One member's glow pulse during a material transition
    Glow {
        group: GroupId,
        ticket: u64,
        node: NodeId,
        pulse: GlowPulse,
    },
}

impl Task {
    pub(crate) fn kind(&self) -> TaskKind {
        match self {
            Task::HeatRamp { .. } => TaskKind::HeatRamp,
            Task::CoolRamp { .. } => TaskKind::CoolRamp,
            Task::FailureGrace { .. } => TaskKind::FailureGrace,
            Task::AwaitRootCooled { .. } => TaskKind::AwaitRootCooled,
            Task::Glow { .. } => TaskKind::Glow,
        }
    }

    pub(crate) fn step(&mut self, world: &mut ConductionWorld, dt: f32) -> TaskStatus {
        match self {
            Task::HeatRamp {
                node,
                budget,
                on_failure,
            } => {
                let Some(convergence) = world.convergence_mut(*node) else {
                    return TaskStatus::Complete;
                };
                if convergence.state() != ConvergenceState::Heating {
                    return TaskStatus::Complete;
                }
                match convergence.advance(dt) {
                    ConvergenceState::Heated => {
                        world.finish_heating(*node, *budget, *on_failure);
                        TaskStatus::Complete
                    }
                    _ => TaskStatus::Pending,
                }
            }

            Task::CoolRamp { node } => {
                let Some(convergence) = world.convergence_mut(*node) else {
                    return TaskStatus::Complete;
                };
                if convergence.state() != ConvergenceState::Cooling {
                    return TaskStatus::Complete;
                }
                match convergence.advance(dt) {
                    ConvergenceState::Cooled => {
                        world.finish_cooling(*node);
                        TaskStatus::Complete
                    }
                    _ => TaskStatus::Pending,
                }
            }

            Task::FailureGrace {
                node,
                remaining,
                on_failure,
            } => {
                *remaining -= dt;
                if *remaining > 0.0 {
                    return TaskStatus::Pending;
                }
                world.cool(*node);
                world.invoke_hook(*on_failure);
                TaskStatus::Complete
            }

            Task::AwaitRootCooled { source } => {
                let root_cool = world
                    .source(*source)
                    .and_then(|s| world.heat_state(s.root()))
                    .map_or(true, |state| state == HeatState::Cool);
                if !root_cool {
                    return TaskStatus::Pending;
                }
                world.stop_heating(*source);
                TaskStatus::Complete
            }

            Task::Glow {
                group,
                ticket,
                node,
                pulse,
            } => match pulse.advance(dt) {
                Some(GlowMilestone::Midpoint) => {
                    world.transition_midpoint(*group, *ticket, *node);
                    TaskStatus::Pending
                }
                Some(GlowMilestone::Settled) => {
                    world.transition_settled(*group, *ticket, *node);
                    TaskStatus::Complete
                }
                None => TaskStatus::Pending,
            },
        }
    }
}
