//! Cooperative task scheduler
//!
//! Every ramp, delay and wait in the engine is a task stepped once per
//! `tick(dt)` on a single thread. Tasks interleave but never run in
//! parallel. Within a tick the stepping order follows [`TaskOrder`]; callers
//! must not rely on sibling tasks finishing in any particular order.
//!
//! Tasks spawned during a tick are first stepped on the following tick.

use ahash::{AHashMap, AHashSet};
use rand::seq::SliceRandom;
use rand::SeedableRng;
use rand_xoshiro::Xoshiro256StarStar;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::config::SchedulerConfig;
use crate::network::NodeId;
use crate::tasks::Task;

/// Handle of a scheduled task
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct TaskId(u64);

impl fmt::Display for TaskId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "task#{}", self.0)
    }
}

/// Order in which tasks are stepped within one tick
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum TaskOrder {
    /// Spawn order
    #[default]
    Fifo,
    /// Reverse spawn order
    Reversed,
    /// Seeded random permutation, re-drawn every tick
    Shuffled,
}

/// Whether a task wants to be stepped again
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TaskStatus {
    Pending,
    Complete,
}

pub(crate) struct ScheduledTask {
    pub id: TaskId,
    pub task: Task,
}

pub struct Scheduler {
    running: Vec<ScheduledTask>,
    spawned: Vec<ScheduledTask>,
    /// Owner of every live task (running, spawned or mid-step)
    owners: AHashMap<TaskId, Option<NodeId>>,
    /// Cancelled during the current tick; cleared at `end_tick`
    cancelled: AHashSet<TaskId>,
    next_id: u64,
    order: TaskOrder,
    rng: Xoshiro256StarStar,
    ticks: u64,
    elapsed: f32,
}

impl Scheduler {
    pub fn new(config: SchedulerConfig) -> Self {
        Self {
            running: Vec::new(),
            spawned: Vec::new(),
            owners: AHashMap::new(),
            cancelled: AHashSet::new(),
            next_id: 0,
            order: config.order,
            rng: Xoshiro256StarStar::seed_from_u64(config.seed),
            ticks: 0,
            elapsed: 0.0,
        }
    }

    pub fn order(&self) -> TaskOrder {
        self.order
    }

    pub fn set_order(&mut self, order: TaskOrder) {
        self.order = order;
    }

    pub(crate) fn spawn(&mut self, owner: Option<NodeId>, task: Task) -> TaskId {
        let id = TaskId(self.next_id);
        self.next_id += 1;
        log::trace!("spawn {} {:?} owned by {:?}", id, task.kind(), owner);
        self.owners.insert(id, owner);
        self.spawned.push(ScheduledTask { id, task });
        id
    }

    /// Drop a task without running any of its completion logic
    pub fn cancel(&mut self, id: TaskId) -> bool {
        if self.owners.remove(&id).is_none() {
            return false;
        }
        log::trace!("cancel {}", id);
        self.cancelled.insert(id);
        self.running.retain(|t| t.id != id);
        self.spawned.retain(|t| t.id != id);
        true
    }

    /// Cancel every live task owned by `node`
    pub fn cancel_owned(&mut self, node: NodeId) -> usize {
        let ids: Vec<TaskId> = self
            .owners
            .iter()
            .filter(|(_, owner)| **owner == Some(node))
            .map(|(id, _)| *id)
            .collect();
        ids.into_iter().filter(|id| self.cancel(*id)).count()
    }

    pub fn cancel_all(&mut self) -> usize {
        let ids: Vec<TaskId> = self.owners.keys().copied().collect();
        ids.into_iter().filter(|id| self.cancel(*id)).count()
    }

    pub fn is_live(&self, id: TaskId) -> bool {
        self.owners.contains_key(&id)
    }

    /// Number of live tasks
    pub fn active_count(&self) -> usize {
        self.owners.len()
    }

    pub fn ticks(&self) -> u64 {
        self.ticks
    }

    /// Simulated seconds since creation
    pub fn elapsed(&self) -> f32 {
        self.elapsed
    }

    /// Take this tick's batch in stepping order
    pub(crate) fn begin_tick(&mut self, dt: f32) -> Vec<ScheduledTask> {
        self.ticks += 1;
        self.elapsed += dt;

        let mut batch = std::mem::take(&mut self.running);
        batch.append(&mut self.spawned);
        match self.order {
            TaskOrder::Fifo => {}
            TaskOrder::Reversed => batch.reverse(),
            TaskOrder::Shuffled => batch.shuffle(&mut self.rng),
        }
        batch
    }

    pub(crate) fn is_cancelled(&self, id: TaskId) -> bool {
        self.cancelled.contains(&id)
    }

    pub(crate) fn complete(&mut self, id: TaskId) {
        self.owners.remove(&id);
    }

    /// Put surviving tasks back and queue this tick's spawns behind them
    pub(crate) fn end_tick(&mut self, survivors: Vec<ScheduledTask>) {
        let cancelled = std::mem::take(&mut self.cancelled);
        let mut running: Vec<ScheduledTask> = survivors
            .into_iter()
            .filter(|t| !cancelled.contains(&t.id))
            .collect();
        // Restore spawn order so Reversed/Shuffled always start from a stable base
        running.sort_by_key(|t| t.id.0);
        running.append(&mut self.spawned);
        self.running = running;
    }
}

impl Default for Scheduler {
    fn default() -> Self {
        Self::new(SchedulerConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tasks::Task;
    use crate::ids::SourceId;

    fn wait_task() -> Task {
        Task::AwaitRootCooled {
            source: SourceId(0),
        }
    }

    #[test]
    fn test_spawned_tasks_join_next_tick() {
        let mut scheduler = Scheduler::default();
        let a = scheduler.spawn(None, wait_task());
        let batch = scheduler.begin_tick(0.1);
        assert_eq!(batch.len(), 1);
        let b = scheduler.spawn(None, wait_task());
        scheduler.end_tick(batch);

        let batch = scheduler.begin_tick(0.1);
        let ids: Vec<TaskId> = batch.iter().map(|t| t.id).collect();
        assert_eq!(ids, vec![a, b]);
        scheduler.end_tick(batch);
        assert_eq!(scheduler.ticks(), 2);
    }

    #[test]
    fn test_reversed_order() {
        let mut scheduler = Scheduler::default();
        scheduler.set_order(TaskOrder::Reversed);
        let a = scheduler.spawn(None, wait_task());
        let b = scheduler.spawn(None, wait_task());
        let batch = scheduler.begin_tick(0.1);
        let ids: Vec<TaskId> = batch.iter().map(|t| t.id).collect();
        assert_eq!(ids, vec![b, a]);
    }

    #[test]
    fn test_shuffled_order_is_seeded() {
        let config = SchedulerConfig {
            order: TaskOrder::Shuffled,
            seed: 7,
        };
        let draw = || {
            let mut scheduler = Scheduler::new(config);
            for _ in 0..16 {
                scheduler.spawn(None, wait_task());
            }
            scheduler
                .begin_tick(0.1)
                .iter()
                .map(|t| t.id)
                .collect::<Vec<_>>()
        };
        assert_eq!(draw(), draw());
    }

    #[test]
    fn test_cancel_mid_tick_drops_survivor() {
        let mut scheduler = Scheduler::default();
        let a = scheduler.spawn(None, wait_task());
        let batch = scheduler.begin_tick(0.1);
        assert!(scheduler.cancel(a));
        assert!(scheduler.is_cancelled(a));
        scheduler.end_tick(batch);
        assert_eq!(scheduler.active_count(), 0);
        assert!(scheduler.begin_tick(0.1).is_empty());
    }

    #[test]
    fn test_cancel_owned() {
        let mut scheduler = Scheduler::default();
        let node = NodeId::new(3);
        scheduler.spawn(Some(node), wait_task());
        scheduler.spawn(Some(node), wait_task());
        let other = scheduler.spawn(Some(NodeId::new(4)), wait_task());

        assert_eq!(scheduler.cancel_owned(node), 2);
        assert_eq!(scheduler.active_count(), 1);
        assert!(scheduler.is_live(other));
        assert!(!scheduler.cancel(TaskId(999)));
    }
}
