//! Puzzle completion check over the two conduit trees

use conduit_simulation::MaterialState;
use serde::Serialize;

use crate::ids::{GroupId, SourceId, TreeId};
use crate::network::{HeatState, NodeId};
use crate::world::ConductionWorld;

/// Handles that make up one tree: its source, transition group and root
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TreeHandle {
    pub source: SourceId,
    pub group: GroupId,
    pub root: NodeId,
}

/// Per-tree flags at one point in time
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct TreeStatus {
    pub tree: TreeId,
    pub heating: bool,
    pub changing: bool,
    pub state: Option<MaterialState>,
    pub all_hot: bool,
}

/// Snapshot of both trees plus the overall verdict
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct PuzzleStatus {
    pub left: TreeStatus,
    pub right: TreeStatus,
    pub can_activate: bool,
}

/// Answers "are both trees lit with the right material?"
#[derive(Clone, Copy, Debug)]
pub struct PuzzleAggregator {
    left: TreeHandle,
    right: TreeHandle,
    required: MaterialState,
}

impl PuzzleAggregator {
    pub fn new(left: TreeHandle, right: TreeHandle) -> Self {
        Self {
            left,
            right,
            required: MaterialState::Conductor,
        }
    }

    pub fn with_required_state(mut self, required: MaterialState) -> Self {
        self.required = required;
        self
    }

    pub fn required_state(&self) -> MaterialState {
        self.required
    }

    pub fn tree(&self, tree: TreeId) -> TreeHandle {
        match tree {
            TreeId::Left => self.left,
            TreeId::Right => self.right,
        }
    }

    /// Both sources heating and both groups committed to the required material
    pub fn can_activate(&self, world: &ConductionWorld) -> bool {
        TreeId::BOTH.iter().all(|tree| {
            let handle = self.tree(*tree);
            world.is_heating(handle.source)
                && world.committed_state(handle.group) == Some(self.required)
        })
    }

    /// Every node reachable from the tree's root is HOT
    pub fn all_nodes_hot(&self, tree: TreeId, world: &ConductionWorld) -> bool {
        let root = self.tree(tree).root;
        if !world.network().contains(root) {
            return false;
        }
        world
            .network()
            .reachable_from(root)
            .into_iter()
            .all(|node| world.heat_state(node) == Some(HeatState::Hot))
    }

    pub fn tree_status(&self, tree: TreeId, world: &ConductionWorld) -> TreeStatus {
        let handle = self.tree(tree);
        TreeStatus {
            tree,
            heating: world.is_heating(handle.source),
            changing: world.is_changing(handle.group),
            state: world.committed_state(handle.group),
            all_hot: self.all_nodes_hot(tree, world),
        }
    }

    pub fn status(&self, world: &ConductionWorld) -> PuzzleStatus {
        PuzzleStatus {
            left: self.tree_status(TreeId::Left, world),
            right: self.tree_status(TreeId::Right, world),
            can_activate: self.can_activate(world),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ConductionConfig;
    use crate::transition::GlowChannel;

    fn two_trees(world: &mut ConductionWorld) -> PuzzleAggregator {
        let mut handles = Vec::new();
        for side in ["left", "right"] {
            let root = world.add_node(format!("{side}_root"), MaterialState::Insulator);
            let source = world.add_source(format!("{side}_gen"), root).unwrap();
            let group = world
                .add_group(
                    format!("{side}_group"),
                    vec![root],
                    vec![GlowChannel { glow_speed: 1.0 }],
                )
                .unwrap();
            world.pair(source, group).unwrap();
            handles.push(TreeHandle {
                source,
                group,
                root,
            });
        }
        PuzzleAggregator::new(handles[0], handles[1])
    }

    #[test]
    fn test_cannot_activate_in_initial_state() {
        let mut world = ConductionWorld::new(ConductionConfig::default());
        let puzzle = two_trees(&mut world);
        assert!(!puzzle.can_activate(&world));
        assert!(!puzzle.all_nodes_hot(TreeId::Left, &world));
    }

    #[test]
    fn test_status_reports_both_trees() {
        let mut world = ConductionWorld::new(ConductionConfig::default());
        let puzzle = two_trees(&mut world);
        world
            .ignite(puzzle.tree(TreeId::Right).source)
            .unwrap();

        let status = puzzle.status(&world);
        assert!(!status.left.heating);
        assert!(status.right.heating);
        assert_eq!(status.left.state, Some(MaterialState::Insulator));
        assert!(!status.can_activate);
    }

    #[test]
    fn test_required_state_override() {
        let mut world = ConductionWorld::new(ConductionConfig::default());
        let puzzle = two_trees(&mut world).with_required_state(MaterialState::Insulator);
        assert_eq!(puzzle.required_state(), MaterialState::Insulator);
        for tree in TreeId::BOTH {
            world.ignite(puzzle.tree(tree).source).unwrap();
        }
        assert!(puzzle.can_activate(&world));
    }
}
