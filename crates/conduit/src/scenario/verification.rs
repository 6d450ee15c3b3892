//! Verification conditions and state checks for scenarios

use conduit_core::levels::ConductionLevel;
use conduit_core::{ConductionEvent, HeatState, MaterialState, TreeId};
use serde::{Deserialize, Serialize};

/// Event categories that can be counted by [`VerificationCondition::EventCount`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EventKind {
    NodeHeated,
    NodeCooled,
    SinkActivated,
    SourceIgnited,
    HeatingStopped,
    TransitionRequested,
    TransitionCommitted,
    NodeMaterialChanged,
    TransitionSettled,
}

impl EventKind {
    pub fn matches(self, event: &ConductionEvent) -> bool {
        let kind = match event {
            ConductionEvent::NodeHeated { .. } => EventKind::NodeHeated,
            ConductionEvent::NodeCooled { .. } => EventKind::NodeCooled,
            ConductionEvent::SinkActivated { .. } => EventKind::SinkActivated,
            ConductionEvent::SourceIgnited { .. } => EventKind::SourceIgnited,
            ConductionEvent::HeatingStopped { .. } => EventKind::HeatingStopped,
            ConductionEvent::TransitionRequested { .. } => EventKind::TransitionRequested,
            ConductionEvent::TransitionCommitted { .. } => EventKind::TransitionCommitted,
            ConductionEvent::NodeMaterialChanged { .. } => EventKind::NodeMaterialChanged,
            ConductionEvent::TransitionSettled { .. } => EventKind::TransitionSettled,
        };
        kind == self
    }
}

/// Conditions that can be verified against level state
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum VerificationCondition {
    // === SOURCE / GROUP CHECKS ===
    /// Assert whether a tree's source is heating
    SourceHeating { tree: TreeId, expected: bool },

    /// Assert a tree group's committed material
    GroupState {
        tree: TreeId,
        expected: MaterialState,
    },

    // === NODE CHECKS ===
    /// Assert whether every node reachable from a tree's root is HOT
    AllNodesHot { tree: TreeId, expected: bool },

    /// Assert the heat state of a named node
    NodeHeat { node: String, expected: HeatState },

    /// Assert the material of a named node
    NodeMaterial {
        node: String,
        expected: MaterialState,
    },

    // === PUZZLE CHECKS ===
    /// Assert the aggregator's activation verdict
    CanActivate { expected: bool },

    /// Assert whether a named sink is activated
    SinkActivated { sink: String, expected: bool },

    /// Assert the outcome of the last `AttemptLaunch`
    Launched { expected: bool },

    /// Assert how many events of a kind were emitted
    EventCount {
        event: EventKind,
        expected: usize,
        #[serde(default)]
        tolerance: Option<usize>,
    },

    // === LOGICAL OPERATORS ===
    /// All conditions must pass
    All {
        conditions: Vec<VerificationCondition>,
    },

    /// Any condition must pass
    Any {
        conditions: Vec<VerificationCondition>,
    },

    /// Condition must NOT pass
    Not {
        condition: Box<VerificationCondition>,
    },
}

/// Result of a verification check
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VerificationResult {
    pub passed: bool,
    pub message: String,
    pub actual_value: Option<String>, // For debugging
}

fn expect_bool(label: String, expected: bool, actual: bool) -> VerificationResult {
    VerificationResult {
        passed: actual == expected,
        message: format!("{}: expected {}, got {}", label, expected, actual),
        actual_value: Some(actual.to_string()),
    }
}

impl VerificationCondition {
    /// Evaluate condition against level state
    ///
    /// `launched` is the outcome of the most recent launch attempt, if any.
    pub fn evaluate(&self, level: &ConductionLevel, launched: Option<bool>) -> VerificationResult {
        let world = &level.world;
        let puzzle = &level.aggregator;

        match self {
            VerificationCondition::SourceHeating { tree, expected } => {
                let source = puzzle.tree(*tree).source;
                expect_bool(
                    format!("Source of {} tree heating", tree),
                    *expected,
                    world.is_heating(source),
                )
            }

            VerificationCondition::GroupState { tree, expected } => {
                let actual = world.committed_state(puzzle.tree(*tree).group);
                VerificationResult {
                    passed: actual == Some(*expected),
                    message: format!(
                        "Group of {} tree: expected {}, got {:?}",
                        tree, expected, actual
                    ),
                    actual_value: actual.map(|s| s.to_string()),
                }
            }

            VerificationCondition::AllNodesHot { tree, expected } => expect_bool(
                format!("All nodes of {} tree hot", tree),
                *expected,
                puzzle.all_nodes_hot(*tree, world),
            ),

            VerificationCondition::NodeHeat { node, expected } => {
                let actual = world.find_node(node).and_then(|id| world.heat_state(id));
                VerificationResult {
                    passed: actual == Some(*expected),
                    message: format!(
                        "Node '{}' heat: expected {:?}, got {:?}",
                        node, expected, actual
                    ),
                    actual_value: actual.map(|s| format!("{:?}", s)),
                }
            }

            VerificationCondition::NodeMaterial { node, expected } => {
                let actual = world
                    .find_node(node)
                    .and_then(|id| world.node(id))
                    .map(|n| n.material());
                VerificationResult {
                    passed: actual == Some(*expected),
                    message: format!(
                        "Node '{}' material: expected {}, got {:?}",
                        node, expected, actual
                    ),
                    actual_value: actual.map(|s| s.to_string()),
                }
            }

            VerificationCondition::CanActivate { expected } => expect_bool(
                "Puzzle can activate".to_string(),
                *expected,
                puzzle.can_activate(world),
            ),

            VerificationCondition::SinkActivated { sink, expected } => {
                match world.sinks().find(|(_, s)| &s.name == sink) {
                    Some((_, found)) => expect_bool(
                        format!("Sink '{}' activated", sink),
                        *expected,
                        found.is_activated(),
                    ),
                    None => VerificationResult {
                        passed: false,
                        message: format!("Sink '{}' not found", sink),
                        actual_value: None,
                    },
                }
            }

            VerificationCondition::Launched { expected } => match launched {
                Some(actual) => expect_bool("Launch".to_string(), *expected, actual),
                None => VerificationResult {
                    passed: false,
                    message: "No launch was attempted".to_string(),
                    actual_value: None,
                },
            },

            VerificationCondition::EventCount {
                event,
                expected,
                tolerance,
            } => {
                let actual = world.events().count(|e| event.matches(e));
                let tol = tolerance.unwrap_or(0);
                let passed = actual >= expected.saturating_sub(tol) && actual <= expected + tol;

                VerificationResult {
                    passed,
                    message: format!(
                        "{:?} events: expected {}±{}, got {}",
                        event, expected, tol, actual
                    ),
                    actual_value: Some(actual.to_string()),
                }
            }

            VerificationCondition::All { conditions } => {
                let results: Vec<_> = conditions
                    .iter()
                    .map(|c| c.evaluate(level, launched))
                    .collect();
                let failed: Vec<_> = results.iter().filter(|r| !r.passed).collect();

                VerificationResult {
                    passed: failed.is_empty(),
                    message: format!(
                        "All conditions: {}/{} passed",
                        results.len() - failed.len(),
                        results.len()
                    ),
                    actual_value: if failed.is_empty() {
                        None
                    } else {
                        Some(
                            failed
                                .iter()
                                .map(|r| r.message.clone())
                                .collect::<Vec<_>>()
                                .join("; "),
                        )
                    },
                }
            }

            VerificationCondition::Any { conditions } => {
                let results: Vec<_> = conditions
                    .iter()
                    .map(|c| c.evaluate(level, launched))
                    .collect();
                let passed_count = results.iter().filter(|r| r.passed).count();

                VerificationResult {
                    passed: passed_count > 0,
                    message: format!(
                        "Any condition: {}/{} passed",
                        passed_count,
                        results.len()
                    ),
                    actual_value: Some(passed_count.to_string()),
                }
            }

            VerificationCondition::Not { condition } => {
                let result = condition.evaluate(level, launched);

                VerificationResult {
                    passed: !result.passed,
                    message: format!("NOT ({})", result.message),
                    actual_value: result.actual_value,
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use conduit_core::levels::demo_levels::generate_hangar;
    use conduit_core::ConductionConfig;

    fn hangar() -> ConductionLevel {
        generate_hangar()
            .build(&ConductionConfig::default())
            .unwrap()
    }

    #[test]
    fn test_initial_hangar_checks() {
        let level = hangar();
        let checks = [
            VerificationCondition::SourceHeating {
                tree: TreeId::Left,
                expected: false,
            },
            VerificationCondition::GroupState {
                tree: TreeId::Right,
                expected: MaterialState::Insulator,
            },
            VerificationCondition::NodeHeat {
                node: "left_feed".to_string(),
                expected: HeatState::Cool,
            },
            VerificationCondition::SinkActivated {
                sink: "right_engine".to_string(),
                expected: false,
            },
            VerificationCondition::CanActivate { expected: false },
            VerificationCondition::EventCount {
                event: EventKind::NodeHeated,
                expected: 0,
                tolerance: None,
            },
        ];
        for check in &checks {
            let result = check.evaluate(&level, None);
            assert!(result.passed, "{}", result.message);
        }
    }

    #[test]
    fn test_missing_names_fail() {
        let level = hangar();
        let node = VerificationCondition::NodeHeat {
            node: "nowhere".to_string(),
            expected: HeatState::Cool,
        };
        assert!(!node.evaluate(&level, None).passed);

        let sink = VerificationCondition::SinkActivated {
            sink: "nowhere".to_string(),
            expected: false,
        };
        assert!(!sink.evaluate(&level, None).passed);

        let launch = VerificationCondition::Launched { expected: false };
        assert!(!launch.evaluate(&level, None).passed);
        assert!(launch.evaluate(&level, Some(false)).passed);
    }

    #[test]
    fn test_logical_operators() {
        let level = hangar();
        let pass = VerificationCondition::CanActivate { expected: false };
        let fail = VerificationCondition::CanActivate { expected: true };

        let all = VerificationCondition::All {
            conditions: vec![pass.clone(), fail.clone()],
        };
        assert!(!all.evaluate(&level, None).passed);

        let any = VerificationCondition::Any {
            conditions: vec![pass, fail.clone()],
        };
        assert!(any.evaluate(&level, None).passed);

        let not = VerificationCondition::Not {
            condition: Box::new(fail),
        };
        assert!(not.evaluate(&level, None).passed);
    }

    #[test]
    fn test_parse_from_ron() {
        let src = r#"All(conditions: [
            SourceHeating(tree: LEFT, expected: true),
            NodeHeat(node: "left_feed", expected: HOT),
            EventCount(event: TransitionCommitted, expected: 2),
        ])"#;
        let condition: VerificationCondition = ron::from_str(src).unwrap();
        match condition {
            VerificationCondition::All { conditions } => assert_eq!(conditions.len(), 3),
            other => panic!("unexpected {:?}", other),
        }
    }
}
