//! Built-in level layouts

use conduit_simulation::MaterialState;

use super::layout::{GroupSpec, LevelLayout, NodeSpec, TreeSpec};
use crate::ids::TreeId;

fn node(name: &str, material: MaterialState, children: &[&str]) -> NodeSpec {
    NodeSpec {
        name: name.to_string(),
        material,
        children: children.iter().map(|c| c.to_string()).collect(),
        sink: None,
    }
}

fn tree(tree: TreeId, root: &str, members: &[&str], glow_speeds: Option<Vec<f32>>) -> TreeSpec {
    let side = tree.name();
    TreeSpec {
        tree,
        source: format!("{side}_generator"),
        root: root.to_string(),
        group: GroupSpec {
            name: format!("{side}_state_changer"),
            members: members.iter().map(|m| m.to_string()).collect(),
            glow_speeds,
        },
    }
}

/// Level 1: Hangar
/// Two three-segment conduits, plastic-cased, each ending at a ship engine.
/// Both must be switched to metal before ignition reaches the engines.
pub fn generate_hangar() -> LevelLayout {
    let mut nodes = Vec::new();
    let mut trees = Vec::new();
    let mut sinks = Vec::new();

    for (side, speeds) in [
        (TreeId::Left, vec![1.0, 0.8, 1.2]),
        (TreeId::Right, vec![1.1, 0.9, 1.0]),
    ] {
        let name = side.name();
        let feed = format!("{name}_feed");
        let bend = format!("{name}_bend");
        let link = format!("{name}_engine_link");
        let engine = format!("{name}_engine");

        nodes.push(node(&feed, MaterialState::Insulator, &[bend.as_str()]));
        nodes.push(node(&bend, MaterialState::Insulator, &[link.as_str()]));
        let mut last = node(&link, MaterialState::Insulator, &[]);
        last.sink = Some(engine.clone());
        nodes.push(last);
        sinks.push(engine);

        let members = [feed.as_str(), bend.as_str(), link.as_str()];
        trees.push(tree(side, &feed, &members, Some(speeds)));
    }

    LevelLayout {
        name: "hangar".to_string(),
        description: "Two insulated conduits feeding the ship engines".to_string(),
        nodes,
        sinks,
        trees,
    }
}

/// Level 2: Branching Conduit
/// Left root splits into two engine branches; right tree is a short chain
pub fn generate_branching() -> LevelLayout {
    let mut left_a = node("branch_a", MaterialState::Insulator, &[]);
    left_a.sink = Some("engine_a".to_string());
    let mut left_b = node("branch_b", MaterialState::Insulator, &[]);
    left_b.sink = Some("engine_b".to_string());
    let mut right_tail = node("right_tail", MaterialState::Insulator, &[]);
    right_tail.sink = Some("engine_c".to_string());

    LevelLayout {
        name: "branching".to_string(),
        description: "A splitter feeding two engines from one generator".to_string(),
        nodes: vec![
            node("splitter", MaterialState::Insulator, &["branch_a", "branch_b"]),
            left_a,
            left_b,
            node("right_head", MaterialState::Insulator, &["right_tail"]),
            right_tail,
        ],
        sinks: vec![
            "engine_a".to_string(),
            "engine_b".to_string(),
            "engine_c".to_string(),
        ],
        trees: vec![
            tree(
                TreeId::Left,
                "splitter",
                &["splitter", "branch_a", "branch_b"],
                None,
            ),
            tree(
                TreeId::Right,
                "right_head",
                &["right_head", "right_tail"],
                None,
            ),
        ],
    }
}

/// Level 3: Absorber Bench
/// A single water-soaked segment per side; ignition always fails until drained
pub fn generate_absorber_bench() -> LevelLayout {
    LevelLayout {
        name: "absorber_bench".to_string(),
        description: "Single absorbing segments for failure-path testing".to_string(),
        nodes: vec![
            node("left_soak", MaterialState::Absorber, &[]),
            node("right_soak", MaterialState::Absorber, &[]),
        ],
        sinks: Vec::new(),
        trees: vec![
            tree(TreeId::Left, "left_soak", &["left_soak"], None),
            tree(TreeId::Right, "right_soak", &["right_soak"], None),
        ],
    }
}
