//! Scenario execution engine

use anyhow::{bail, Result};
use conduit_core::levels::ConductionLevel;
use conduit_core::{IgniteOutcome, StimulusTarget, TransitionOutcome, TreeId};

use super::actions::{ScenarioAction, TargetRef};
use super::definition::ScenarioDefinition;
use super::results::ExecutionReport;
use crate::config::RunnerConfig;

/// Configuration for scenario executor
#[derive(Debug, Clone, Default)]
pub struct ScenarioExecutorConfig {
    /// Tick rate and wait bounds
    pub runner: RunnerConfig,

    /// Verbose logging
    pub verbose: bool,
}

/// Executes scenario actions against a built level
pub struct ScenarioExecutor {
    /// Configuration
    config: ScenarioExecutorConfig,

    /// Outcome of the most recent launch attempt
    launched: Option<bool>,

    /// Action execution log
    log: Vec<String>,
}

impl ScenarioExecutor {
    /// Create new executor with default config
    pub fn new() -> Self {
        Self::with_config(ScenarioExecutorConfig::default())
    }

    /// Create new executor with custom config
    pub fn with_config(config: ScenarioExecutorConfig) -> Self {
        Self {
            config,
            launched: None,
            log: Vec::new(),
        }
    }

    /// Execute a complete scenario
    pub fn execute_scenario(
        &mut self,
        scenario: &ScenarioDefinition,
        level: &mut ConductionLevel,
    ) -> Result<ExecutionReport> {
        use std::time::Instant;

        let start_time = Instant::now();
        let mut report = ExecutionReport::new(scenario.name.clone(), level.name.clone());

        self.log.clear();
        self.launched = None;

        self.log(&format!("Starting scenario: {}", scenario.name));
        self.log(&format!("Description: {}", scenario.description));

        // Execute setup actions
        let setup_start = Instant::now();
        if !scenario.setup.is_empty() {
            self.log(&format!("Running {} setup actions", scenario.setup.len()));
            for (idx, action) in scenario.setup.iter().enumerate() {
                if let Err(e) = self.execute_action(action, level) {
                    let msg = format!("Setup action {} failed: {}", idx, e);
                    self.log(&msg);
                    return Err(anyhow::anyhow!(msg));
                }
            }
        }
        report.performance.setup_duration_ms = setup_start.elapsed().as_secs_f64() * 1000.0;

        // Execute main actions
        let action_start = Instant::now();
        self.log(&format!("Running {} main actions", scenario.actions.len()));
        for (idx, action) in scenario.actions.iter().enumerate() {
            if let Err(e) = self.execute_action(action, level) {
                let msg = format!("Action {} failed: {}", idx, e);
                self.log(&msg);
                return Err(anyhow::anyhow!(msg));
            }
        }
        report.performance.action_duration_ms = action_start.elapsed().as_secs_f64() * 1000.0;

        report.actions_executed = scenario.setup.len() + scenario.actions.len();

        // Run verifications
        let verify_start = Instant::now();
        if !scenario.verify.is_empty() {
            self.log(&format!("Running {} verifications", scenario.verify.len()));
            for condition in &scenario.verify {
                let result = condition.evaluate(level, self.launched);
                self.log(&format!(
                    "  {} {}",
                    if result.passed { "✓" } else { "✗" },
                    result.message
                ));

                if !result.passed {
                    report.verification_failures.push(result);
                }
            }
        }
        report.performance.verification_duration_ms =
            verify_start.elapsed().as_secs_f64() * 1000.0;
        report.final_status = Some(level.aggregator.status(&level.world));

        // Cleanup actions (always run)
        if !scenario.cleanup.is_empty() {
            self.log(&format!(
                "Running {} cleanup actions",
                scenario.cleanup.len()
            ));
            for (idx, action) in scenario.cleanup.iter().enumerate() {
                if let Err(e) = self.execute_action(action, level) {
                    self.log(&format!("Warning: Cleanup action {} failed: {}", idx, e));
                }
            }
        }

        // Finalize report
        report.launched = self.launched;
        report.passed = report.verification_failures.is_empty();
        report.performance.total_duration_ms = start_time.elapsed().as_secs_f64() * 1000.0;
        report.performance.tick_count = level.world.scheduler().ticks();
        report.performance.simulated_secs = level.world.scheduler().elapsed();

        self.log(&format!(
            "Scenario complete: {} ({:.2}s simulated, {:.1}ms)",
            if report.passed { "PASSED" } else { "FAILED" },
            report.performance.simulated_secs,
            report.performance.total_duration_ms
        ));
        self.log(&format!("  Performance: {}", report.performance.summary()));
        report.log = self.log.clone();

        Ok(report)
    }

    /// Execute a single action
    fn execute_action(&mut self, action: &ScenarioAction, level: &mut ConductionLevel) -> Result<()> {
        if self.config.verbose {
            self.log(&format!(
                "[{:.2}s] {:?}",
                level.world.scheduler().elapsed(),
                action
            ));
        }

        match action {
            ScenarioAction::Stimulate { target, stimulus } => {
                let resolved = match target {
                    TargetRef::Source(tree) => {
                        StimulusTarget::Source(level.aggregator.tree(*tree).source)
                    }
                    TargetRef::Group(tree) => {
                        StimulusTarget::Group(level.aggregator.tree(*tree).group)
                    }
                };
                let response = level.world.apply_stimulus(resolved, *stimulus)?;
                self.log(&format!("  {:?} on {:?}: {:?}", stimulus, target, response));
            }

            ScenarioAction::Ignite { tree } => {
                let source = level.aggregator.tree(*tree).source;
                let outcome = level.world.ignite(source)?;
                if outcome != IgniteOutcome::Ignited {
                    log::warn!("Ignition of {} tree rejected: {:?}", tree, outcome);
                }
                self.log(&format!("  Ignite {} tree: {:?}", tree, outcome));
            }

            ScenarioAction::RequestTransition { tree, state } => {
                let group = level.aggregator.tree(*tree).group;
                let outcome = level.world.request_transition(group, *state)?;
                if outcome != TransitionOutcome::Started {
                    log::warn!("Transition of {} tree rejected: {:?}", tree, outcome);
                }
                self.log(&format!("  {} tree -> {}: {:?}", tree, state, outcome));
            }

            ScenarioAction::WaitSeconds { seconds } => {
                level.world.run_for(*seconds, self.config.runner.dt());
                self.log(&format!("  Waited {:.2}s", seconds));
            }

            ScenarioAction::WaitUntilAllHot { timeout } => {
                let limit = timeout.unwrap_or(self.config.runner.max_wait_secs);
                let waited = self.wait_until(level, limit, |level| {
                    TreeId::BOTH
                        .iter()
                        .all(|tree| level.aggregator.all_nodes_hot(*tree, &level.world))
                });
                match waited {
                    Some(secs) => self.log(&format!("  All nodes hot after {:.2}s", secs)),
                    None => bail!("Nodes not all hot after {:.1}s", limit),
                }
            }

            ScenarioAction::WaitUntilSettled { timeout } => {
                let limit = timeout.unwrap_or(self.config.runner.max_wait_secs);
                let waited = self.wait_until(level, limit, |level| {
                    level.world.groups().all(|(_, group)| !group.is_changing())
                });
                match waited {
                    Some(secs) => self.log(&format!("  Groups settled after {:.2}s", secs)),
                    None => bail!("Groups still changing after {:.1}s", limit),
                }
            }

            ScenarioAction::AttemptLaunch { countdown_secs } => {
                let launched = self.attempt_launch(level, *countdown_secs)?;
                self.launched = Some(launched);
            }

            ScenarioAction::Log { message } => {
                self.log(&format!("  [LOG] {}", message));
            }
        }

        Ok(())
    }

    /// Tick until `done` holds; returns the simulated seconds it took
    fn wait_until(
        &self,
        level: &mut ConductionLevel,
        limit: f32,
        done: impl Fn(&ConductionLevel) -> bool,
    ) -> Option<f32> {
        let dt = self.config.runner.dt();
        let mut waited = 0.0;
        while !done(level) {
            if waited >= limit {
                return None;
            }
            level.world.tick(dt);
            waited += dt;
        }
        Some(waited)
    }

    /// Count down, then lift off if the puzzle is solved
    ///
    /// A solved puzzle waits for both trees to finish heating before liftoff.
    /// An unsolved one switches every engine back off.
    fn attempt_launch(&mut self, level: &mut ConductionLevel, countdown_secs: f32) -> Result<bool> {
        self.log("  Priming launch...");
        level.world.run_for(countdown_secs, self.config.runner.dt());

        if level.aggregator.can_activate(&level.world) {
            let limit = self.config.runner.max_wait_secs;
            let waited = self.wait_until(level, limit, |level| {
                TreeId::BOTH
                    .iter()
                    .all(|tree| level.aggregator.all_nodes_hot(*tree, &level.world))
            });
            if waited.is_none() {
                bail!("Launch approved but trees never finished heating");
            }
            self.log("  LIFTOFF");
            return Ok(true);
        }

        let sinks: Vec<_> = level.world.sinks().map(|(id, _)| id).collect();
        for sink in sinks {
            level.world.deactivate_sink(sink)?;
        }
        let status = level.aggregator.status(&level.world);
        self.log(&format!(
            "  Launch failed (left: heating={} state={:?}, right: heating={} state={:?})",
            status.left.heating, status.left.state, status.right.heating, status.right.state
        ));
        Ok(false)
    }

    /// Log a message
    fn log(&mut self, message: &str) {
        log::info!("{}", message);
        self.log.push(message.to_string());
    }
}

impl Default for ScenarioExecutor {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scenario::verification::VerificationCondition;
    use conduit_core::levels::demo_levels::{generate_absorber_bench, generate_hangar};
    use conduit_core::{ConductionConfig, MaterialState, Stimulus};

    fn scenario(actions: Vec<ScenarioAction>, verify: Vec<VerificationCondition>) -> ScenarioDefinition {
        ScenarioDefinition {
            name: "test".to_string(),
            description: String::new(),
            level: None,
            setup: vec![],
            actions,
            verify,
            cleanup: vec![],
        }
    }

    fn metal_then_fire() -> Vec<ScenarioAction> {
        let mut actions = Vec::new();
        for tree in TreeId::BOTH {
            actions.push(ScenarioAction::Stimulate {
                target: TargetRef::Group(tree),
                stimulus: Stimulus::Metal,
            });
        }
        actions.push(ScenarioAction::WaitUntilSettled { timeout: None });
        for tree in TreeId::BOTH {
            actions.push(ScenarioAction::Stimulate {
                target: TargetRef::Source(tree),
                stimulus: Stimulus::Fire,
            });
        }
        actions
    }

    #[test]
    fn test_hangar_launch_succeeds() {
        let mut level = generate_hangar()
            .build(&ConductionConfig::default())
            .unwrap();
        let mut actions = metal_then_fire();
        actions.push(ScenarioAction::AttemptLaunch { countdown_secs: 3.0 });

        let verify = vec![
            VerificationCondition::Launched { expected: true },
            VerificationCondition::GroupState {
                tree: TreeId::Left,
                expected: MaterialState::Conductor,
            },
            VerificationCondition::AllNodesHot {
                tree: TreeId::Right,
                expected: true,
            },
            VerificationCondition::SinkActivated {
                sink: "left_engine".to_string(),
                expected: true,
            },
        ];

        let mut executor = ScenarioExecutor::new();
        let report = executor
            .execute_scenario(&scenario(actions, verify), &mut level)
            .unwrap();
        assert!(report.passed, "{:?}", report.verification_failures);
        assert_eq!(report.launched, Some(true));
        assert!(report.final_status.map_or(false, |s| s.can_activate));
    }

    #[test]
    fn test_launch_fails_without_heating() {
        let mut level = generate_hangar()
            .build(&ConductionConfig::default())
            .unwrap();
        let actions = vec![ScenarioAction::AttemptLaunch { countdown_secs: 1.0 }];
        let verify = vec![VerificationCondition::Launched { expected: false }];

        let mut executor = ScenarioExecutor::new();
        let report = executor
            .execute_scenario(&scenario(actions, verify), &mut level)
            .unwrap();
        assert!(report.passed);
    }

    #[test]
    fn test_wait_timeout_is_an_error() {
        let mut level = generate_absorber_bench()
            .build(&ConductionConfig::default())
            .unwrap();
        let actions = vec![
            ScenarioAction::Ignite { tree: TreeId::Left },
            ScenarioAction::WaitUntilAllHot { timeout: Some(1.0) },
        ];

        let mut executor = ScenarioExecutor::new();
        let result = executor.execute_scenario(&scenario(actions, vec![]), &mut level);
        assert!(result.is_err());
    }
}
