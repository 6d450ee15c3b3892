use anyhow::{bail, Context};
use clap::Parser;
use conduit::config::AppConfig;
use conduit::levels::{ConductionLevel, LevelLayout, LevelManager};
use conduit::scenario::{
    ScenarioAction, ScenarioDefinition, ScenarioExecutor, ScenarioExecutorConfig, TargetRef,
    VerificationCondition,
};
use conduit_core::{Stimulus, TaskOrder, TreeId};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Built-in level to load (see --list-levels)
    #[arg(long)]
    level: Option<String>,

    /// Load the level from a RON layout file instead
    #[arg(long, conflicts_with = "level")]
    layout: Option<PathBuf>,

    /// Scenario file to run (default: solve the puzzle and launch)
    #[arg(long)]
    scenario: Option<PathBuf>,

    /// List available demo levels
    #[arg(long)]
    list_levels: bool,

    /// Step tasks in a shuffled order drawn from this seed
    #[arg(long)]
    seed: Option<u64>,

    /// Verbose logging
    #[arg(short, long)]
    verbose: bool,

    /// Write the execution report as JSON
    #[arg(long)]
    report: Option<PathBuf>,
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let default_filter = if args.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_filter))
        .init();

    let manager = LevelManager::new();

    // Handle --list-levels flag
    if args.list_levels {
        println!("Available levels:");
        for level in manager.levels() {
            println!("  {:<16} {}", level.name, level.description);
        }
        return Ok(());
    }

    let mut config = AppConfig::load()?;
    if let Some(seed) = args.seed {
        apply_seed(&mut config, seed);
    }

    let scenario = match &args.scenario {
        Some(path) => ScenarioDefinition::from_file(path)?,
        None => default_scenario(),
    };

    let mut level = load_level(&args, &scenario, &manager, &config)?;
    log::info!(
        "Running scenario '{}' on level '{}'",
        scenario.name,
        level.name
    );

    let mut executor = ScenarioExecutor::with_config(ScenarioExecutorConfig {
        runner: config.runner.clone(),
        verbose: args.verbose,
    });
    let report = executor.execute_scenario(&scenario, &mut level)?;

    if let Some(path) = &args.report {
        report.save_json(path)?;
        log::info!("Report written to {}", path.display());
    }

    if !report.passed {
        for failure in &report.verification_failures {
            eprintln!("FAILED: {}", failure.message);
        }
        std::process::exit(1);
    }

    println!("Scenario '{}' passed", report.scenario_name);
    Ok(())
}

fn load_level(
    args: &Args,
    scenario: &ScenarioDefinition,
    manager: &LevelManager,
    config: &AppConfig,
) -> anyhow::Result<ConductionLevel> {
    if let Some(path) = &args.layout {
        let layout = LevelLayout::from_file(path)?;
        return layout
            .build(&config.conduction)
            .with_context(|| format!("Invalid layout: {}", path.display()));
    }

    let name = args
        .level
        .as_deref()
        .or(scenario.level.as_deref())
        .unwrap_or("hangar");
    match manager.load(name, &config.conduction) {
        Some(level) => Ok(level?),
        None => bail!("Unknown level '{}' (try --list-levels)", name),
    }
}

fn apply_seed(config: &mut AppConfig, seed: u64) {
    config.conduction.scheduler.order = TaskOrder::Shuffled;
    config.conduction.scheduler.seed = seed;
}

/// Switch both trees to metal, light both generators and try to launch
fn default_scenario() -> ScenarioDefinition {
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
    actions.push(ScenarioAction::AttemptLaunch {
        countdown_secs: 3.0,
    });

    ScenarioDefinition {
        name: "solve".to_string(),
        description: "Conduct heat through both trees and launch".to_string(),
        level: None,
        setup: Vec::new(),
        actions,
        verify: vec![VerificationCondition::Launched { expected: true }],
        cleanup: Vec::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_seed_switches_to_shuffled_order() {
        let mut config = AppConfig::default();
        assert_eq!(config.conduction.scheduler.order, TaskOrder::Fifo);
        apply_seed(&mut config, 42);
        assert_eq!(config.conduction.scheduler.order, TaskOrder::Shuffled);
        assert_eq!(config.conduction.scheduler.seed, 42);
    }

    #[test]
    fn test_default_scenario_expects_launch() {
        let scenario = default_scenario();
        assert!(matches!(
            scenario.actions.last(),
            Some(ScenarioAction::AttemptLaunch { .. })
        ));
    }
}
