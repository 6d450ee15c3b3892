//! Runs every bundled scenario file against its level

use conduit::levels::LevelManager;
use conduit::scenario::{ScenarioDefinition, ScenarioExecutor};
use conduit_core::ConductionConfig;
use std::path::{Path, PathBuf};

fn scenario_dir() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("scenarios")
}

fn run(file: &str) {
    let scenario = ScenarioDefinition::from_file(scenario_dir().join(file)).unwrap();
    let level_name = scenario.level.clone().unwrap_or_else(|| "hangar".to_string());
    let mut level = LevelManager::new()
        .load(&level_name, &ConductionConfig::default())
        .expect("scenario names a built-in level")
        .unwrap();

    let report = ScenarioExecutor::new()
        .execute_scenario(&scenario, &mut level)
        .unwrap();
    assert!(
        report.passed,
        "{} failed: {:#?}",
        file, report.verification_failures
    );
}

#[test]
fn test_hangar_solve() {
    run("hangar_solve.ron");
}

#[test]
fn test_hangar_insulated() {
    run("hangar_insulated.ron");
}

#[test]
fn test_absorber_bench() {
    run("absorber_bench.ron");
}

#[test]
fn test_transition_blocked() {
    run("transition_blocked.ron");
}

#[test]
fn test_every_scenario_file_parses() {
    let mut count = 0;
    for entry in std::fs::read_dir(scenario_dir()).unwrap() {
        let path = entry.unwrap().path();
        if path.extension().and_then(|e| e.to_str()) == Some("ron") {
            ScenarioDefinition::from_file(&path).unwrap();
            count += 1;
        }
    }
    assert!(count >= 4);
}

#[test]
fn test_layout_file_builds_and_solves() {
    use conduit::levels::LevelLayout;
    use conduit::scenario::{ScenarioAction, TargetRef, VerificationCondition};
    use conduit_core::{MaterialState, Stimulus, TreeId};

    let path = Path::new(env!("CARGO_MANIFEST_DIR")).join("layouts/twin_chains.ron");
    let mut level = LevelLayout::from_file(path)
        .unwrap()
        .build(&ConductionConfig::default())
        .unwrap();

    let scenario = ScenarioDefinition {
        name: "twin".to_string(),
        description: String::new(),
        level: None,
        setup: vec![],
        actions: vec![
            ScenarioAction::RequestTransition {
                tree: TreeId::Right,
                state: MaterialState::Conductor,
            },
            ScenarioAction::WaitUntilSettled { timeout: None },
            ScenarioAction::Stimulate {
                target: TargetRef::Source(TreeId::Left),
                stimulus: Stimulus::Fire,
            },
            ScenarioAction::Ignite { tree: TreeId::Right },
            ScenarioAction::AttemptLaunch { countdown_secs: 1.0 },
        ],
        verify: vec![
            VerificationCondition::Launched { expected: true },
            VerificationCondition::SinkActivated {
                sink: "starboard_engine".to_string(),
                expected: true,
            },
        ],
        cleanup: vec![],
    };
    let report = ScenarioExecutor::new()
        .execute_scenario(&scenario, &mut level)
        .unwrap();
    assert!(report.passed, "{:#?}", report.verification_failures);
}
