//! Conduit network - an arena graph of propagation nodes
//!
//! Nodes live in a `StableGraph` so handles survive removal of other nodes.
//! Edges point from parent to child and carry no data.

mod node;

pub use node::{HeatState, PropagationNode};

use ahash::AHashMap;
use petgraph::stable_graph::{NodeIndex, StableGraph};
use petgraph::visit::Dfs;
use petgraph::Direction;
use smallvec::SmallVec;

/// Handle of a node in the network
pub type NodeId = NodeIndex;

/// Child list returned by [`Network::children`]; most nodes have one or two
pub type Children = SmallVec<[NodeId; 4]>;

#[derive(Default)]
pub struct Network {
    graph: StableGraph<PropagationNode, ()>,
    by_name: AHashMap<String, NodeId>,
}

impl Network {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_node(&mut self, node: PropagationNode) -> NodeId {
        let name = node.name.clone();
        let id = self.graph.add_node(node);
        self.by_name.insert(name, id);
        id
    }

    /// Wire `child` downstream of `parent`; returns `false` if either is missing
    pub fn connect(&mut self, parent: NodeId, child: NodeId) -> bool {
        if !self.graph.contains_node(parent) || !self.graph.contains_node(child) {
            return false;
        }
        self.graph.add_edge(parent, child, ());
        true
    }

    /// Remove a node and all of its edges
    pub fn remove(&mut self, id: NodeId) -> Option<PropagationNode> {
        let node = self.graph.remove_node(id)?;
        self.by_name.remove(&node.name);
        Some(node)
    }

    pub fn get(&self, id: NodeId) -> Option<&PropagationNode> {
        self.graph.node_weight(id)
    }

    pub fn get_mut(&mut self, id: NodeId) -> Option<&mut PropagationNode> {
        self.graph.node_weight_mut(id)
    }

    pub fn contains(&self, id: NodeId) -> bool {
        self.graph.contains_node(id)
    }

    pub fn find(&self, name: &str) -> Option<NodeId> {
        self.by_name.get(name).copied()
    }

    /// Direct children of `id`, in no particular order
    pub fn children(&self, id: NodeId) -> Children {
        self.graph
            .neighbors_directed(id, Direction::Outgoing)
            .collect()
    }

    /// Every node reachable from `root`, including `root` itself
    pub fn reachable_from(&self, root: NodeId) -> Vec<NodeId> {
        if !self.contains(root) {
            return Vec::new();
        }
        let mut dfs = Dfs::new(&self.graph, root);
        let mut out = Vec::new();
        while let Some(id) = dfs.next(&self.graph) {
            out.push(id);
        }
        out
    }

    pub fn is_cyclic(&self) -> bool {
        petgraph::algo::is_cyclic_directed(&self.graph)
    }

    pub fn len(&self) -> usize {
        self.graph.node_count()
    }

    pub fn is_empty(&self) -> bool {
        self.graph.node_count() == 0
    }

    pub fn ids(&self) -> impl Iterator<Item = NodeId> + '_ {
        self.graph.node_indices()
    }

    pub fn clear(&mut self) {
        self.graph.clear();
        self.by_name.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::RampConfig;
    use conduit_simulation::MaterialState;

    fn node(name: &str) -> PropagationNode {
        PropagationNode::new(name, MaterialState::Insulator, RampConfig::default())
    }

    #[test]
    fn test_children_and_reachability() {
        let mut net = Network::new();
        let root = net.add_node(node("root"));
        let a = net.add_node(node("a"));
        let b = net.add_node(node("b"));
        let c = net.add_node(node("c"));
        assert!(net.connect(root, a));
        assert!(net.connect(root, b));
        assert!(net.connect(b, c));

        let mut children = net.children(root).into_vec();
        children.sort();
        assert_eq!(children, vec![a, b]);

        let mut reachable = net.reachable_from(b);
        reachable.sort();
        assert_eq!(reachable, vec![b, c]);
        assert_eq!(net.reachable_from(root).len(), 4);
        assert!(!net.is_cyclic());
    }

    #[test]
    fn test_remove_keeps_other_handles() {
        let mut net = Network::new();
        let root = net.add_node(node("root"));
        let a = net.add_node(node("a"));
        let b = net.add_node(node("b"));
        net.connect(root, a);
        net.connect(a, b);

        assert!(net.remove(a).is_some());
        assert!(net.children(root).is_empty());
        assert_eq!(net.get(b).map(|n| n.name.as_str()), Some("b"));
        assert_eq!(net.find("a"), None);
        assert!(!net.connect(root, a));
    }

    #[test]
    fn test_cycle_detection() {
        let mut net = Network::new();
        let a = net.add_node(node("a"));
        let b = net.add_node(node("b"));
        net.connect(a, b);
        net.connect(b, a);
        assert!(net.is_cyclic());
    }
}
