//! Data-driven level layouts
//!
//! A layout names every node, sink and tree; [`LevelLayout::build`] resolves
//! those names into a ready-to-run [`ConductionWorld`].

use ahash::{AHashMap, AHashSet};
use anyhow::{Context, Result};
use conduit_simulation::MaterialState;
use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::aggregator::{PuzzleAggregator, TreeHandle};
use crate::config::ConductionConfig;
use crate::error::ConductionError;
use crate::ids::{SinkId, TreeId};
use crate::network::NodeId;
use crate::transition::GlowChannel;
use crate::world::ConductionWorld;

/// One conduit segment
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NodeSpec {
    pub name: String,
    #[serde(default)]
    pub material: MaterialState,
    #[serde(default)]
    pub children: Vec<String>,
    #[serde(default)]
    pub sink: Option<String>,
}

/// Members of a transition group and their glow speeds
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GroupSpec {
    pub name: String,
    pub members: Vec<String>,
    /// One speed per member; omitted means the configured default for all
    #[serde(default)]
    pub glow_speeds: Option<Vec<f32>>,
}

/// Source, root and transition group of one tree
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TreeSpec {
    pub tree: TreeId,
    pub source: String,
    pub root: String,
    pub group: GroupSpec,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LevelLayout {
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub nodes: Vec<NodeSpec>,
    #[serde(default)]
    pub sinks: Vec<String>,
    pub trees: Vec<TreeSpec>,
}

/// A built level: the world plus the aggregator over its two trees
pub struct ConductionLevel {
    pub name: String,
    pub world: ConductionWorld,
    pub aggregator: PuzzleAggregator,
}

impl LevelLayout {
    /// Load a layout from a RON file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read layout file: {}", path.display()))?;
        Self::from_ron_str(&contents)
            .with_context(|| format!("Failed to parse layout file: {}", path.display()))
    }

    pub fn from_ron_str(contents: &str) -> Result<Self> {
        let layout: LevelLayout = ron::from_str(contents).context("Invalid layout RON")?;
        Ok(layout)
    }

    /// Save layout to a RON file
    pub fn to_file(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let contents = ron::ser::to_string_pretty(self, ron::ser::PrettyConfig::default())
            .context("Failed to serialize layout")?;
        std::fs::write(path, contents)
            .with_context(|| format!("Failed to write layout file: {}", path.display()))?;
        Ok(())
    }

    /// Resolve names and wire up a world
    pub fn build(&self, config: &ConductionConfig) -> crate::error::Result<ConductionLevel> {
        let mut world = ConductionWorld::new(config.clone());

        let mut sinks: AHashMap<&str, SinkId> = AHashMap::new();
        for name in &self.sinks {
            if sinks.contains_key(name.as_str()) {
                return Err(ConductionError::DuplicateName(name.clone()));
            }
            sinks.insert(name, world.add_sink(name.clone()));
        }

        let mut nodes: AHashMap<&str, NodeId> = AHashMap::new();
        for spec in &self.nodes {
            if nodes.contains_key(spec.name.as_str()) {
                return Err(ConductionError::DuplicateName(spec.name.clone()));
            }
            nodes.insert(&spec.name, world.add_node(spec.name.clone(), spec.material));
        }
        let resolve = |name: &str| {
            nodes
                .get(name)
                .copied()
                .ok_or_else(|| ConductionError::UnknownNodeName(name.to_string()))
        };

        for spec in &self.nodes {
            let parent = resolve(&spec.name)?;
            for child in &spec.children {
                world.connect(parent, resolve(child)?)?;
            }
            if let Some(sink_name) = &spec.sink {
                let sink = sinks
                    .get(sink_name.as_str())
                    .copied()
                    .ok_or_else(|| ConductionError::UnknownSinkName(sink_name.clone()))?;
                world.attach_sink(parent, sink)?;
            }
        }
        if world.network().is_cyclic() {
            return Err(ConductionError::CyclicWiring);
        }

        let mut handles: AHashMap<TreeId, TreeHandle> = AHashMap::new();
        let mut group_names: AHashSet<&str> = AHashSet::new();
        for spec in &self.trees {
            if handles.contains_key(&spec.tree) {
                return Err(ConductionError::DuplicateName(spec.tree.name().to_string()));
            }
            if !group_names.insert(&spec.group.name) {
                return Err(ConductionError::DuplicateName(spec.group.name.clone()));
            }

            let root = resolve(&spec.root)?;
            let source = world.add_source(spec.source.clone(), root)?;
            let members = spec
                .group
                .members
                .iter()
                .map(|name| resolve(name))
                .collect::<crate::error::Result<Vec<_>>>()?;
            let glows = match &spec.group.glow_speeds {
                Some(speeds) => speeds
                    .iter()
                    .map(|&glow_speed| GlowChannel { glow_speed })
                    .collect(),
                None => vec![
                    GlowChannel {
                        glow_speed: config.transition.default_glow_speed
                    };
                    members.len()
                ],
            };
            let group = world.add_group(spec.group.name.clone(), members, glows)?;
            world.pair(source, group)?;
            handles.insert(
                spec.tree,
                TreeHandle {
                    source,
                    group,
                    root,
                },
            );
        }

        let left = *handles
            .get(&TreeId::Left)
            .ok_or(ConductionError::MissingTree("LEFT"))?;
        let right = *handles
            .get(&TreeId::Right)
            .ok_or(ConductionError::MissingTree("RIGHT"))?;

        log::info!(
            "Built level '{}': {} nodes, {} sinks",
            self.name,
            world.network().len(),
            self.sinks.len()
        );
        Ok(ConductionLevel {
            name: self.name.clone(),
            world,
            aggregator: PuzzleAggregator::new(left, right),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const MINIMAL: &str = r#"
LevelLayout(
    name: "minimal",
    nodes: [
        NodeSpec(name: "a", material: CONDUCTOR, children: ["b"]),
        NodeSpec(name: "b", sink: Some("engine")),
        NodeSpec(name: "c", material: ABSORBER),
    ],
    sinks: ["engine"],
    trees: [
        TreeSpec(tree: LEFT, source: "gen_l", root: "a",
            group: GroupSpec(name: "gl", members: ["a", "b"], glow_speeds: Some([1.0, 0.5]))),
        TreeSpec(tree: RIGHT, source: "gen_r", root: "c",
            group: GroupSpec(name: "gr", members: ["c"])),
    ],
)
"#;

    #[test]
    fn test_parse_and_build() {
        let layout = LevelLayout::from_ron_str(MINIMAL).unwrap();
        assert_eq!(layout.nodes[1].material, MaterialState::Insulator);

        let level = layout.build(&ConductionConfig::default()).unwrap();
        let world = &level.world;
        let a = world.find_node("a").unwrap();
        let b = world.find_node("b").unwrap();
        assert_eq!(world.network().children(a).as_slice(), &[b]);
        assert!(world.node(b).unwrap().sink().is_some());

        let left = level.aggregator.tree(TreeId::Left);
        assert_eq!(left.root, a);
        let group = world.group(left.group).unwrap();
        assert_eq!(group.glows()[1].glow_speed, 0.5);
        assert_eq!(group.committed_state(), MaterialState::Conductor);
        assert_eq!(group.source(), Some(left.source));

        let right = world.group(level.aggregator.tree(TreeId::Right).group).unwrap();
        assert_eq!(right.glows().len(), 1);
    }

    #[test]
    fn test_unknown_child_is_rejected() {
        let mut layout = LevelLayout::from_ron_str(MINIMAL).unwrap();
        layout.nodes[0].children.push("ghost".into());
        let err = layout.build(&ConductionConfig::default()).err();
        assert_eq!(err, Some(ConductionError::UnknownNodeName("ghost".into())));
    }

    #[test]
    fn test_duplicate_node_is_rejected() {
        let mut layout = LevelLayout::from_ron_str(MINIMAL).unwrap();
        let dup = layout.nodes[0].clone();
        layout.nodes.push(dup);
        let err = layout.build(&ConductionConfig::default()).err();
        assert_eq!(err, Some(ConductionError::DuplicateName("a".into())));
    }

    #[test]
    fn test_missing_tree_is_rejected() {
        let mut layout = LevelLayout::from_ron_str(MINIMAL).unwrap();
        layout.trees.pop();
        let err = layout.build(&ConductionConfig::default()).err();
        assert_eq!(err, Some(ConductionError::MissingTree("RIGHT")));
    }

    #[test]
    fn test_cycle_is_rejected() {
        let mut layout = LevelLayout::from_ron_str(MINIMAL).unwrap();
        layout.nodes[1].children.push("a".into());
        let err = layout.build(&ConductionConfig::default()).err();
        assert_eq!(err, Some(ConductionError::CyclicWiring));
    }

    #[test]
    fn test_unknown_sink_is_rejected() {
        let mut layout = LevelLayout::from_ron_str(MINIMAL).unwrap();
        layout.nodes[2].sink = Some("nowhere".into());
        let err = layout.build(&ConductionConfig::default()).err();
        assert_eq!(err, Some(ConductionError::UnknownSinkName("nowhere".into())));
    }
}
