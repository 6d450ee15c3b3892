//! Scripted scenarios: RON-defined action lists run against a level
//!
//! A scenario drives a built level through stimuli and waits, then checks
//! verification conditions and produces an [`ExecutionReport`].

mod actions;
mod definition;
mod executor;
mod results;
mod verification;

pub use actions::{ScenarioAction, TargetRef};
pub use definition::ScenarioDefinition;
pub use executor::{ScenarioExecutor, ScenarioExecutorConfig};
pub use results::{ExecutionReport, PerformanceMetrics};
pub use verification::{EventKind, VerificationCondition, VerificationResult};
