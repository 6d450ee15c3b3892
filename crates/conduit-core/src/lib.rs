//! Heat and material propagation engine for Conduit
//!
//! Energy flows from sources through a directed network of conduit nodes,
//! losing a material-dependent share at every hop. Transition groups swap
//! node materials with a staggered glow. Everything runs on a cooperative
//! scheduler advanced with [`ConductionWorld::tick`].

pub mod aggregator;
pub mod config;
pub mod convergence;
pub mod error;
pub mod events;
pub mod glow;
pub mod ids;
pub mod levels;
pub mod network;
pub mod scheduler;
pub mod sink;
pub mod source;
pub mod stimulus;
mod tasks;
pub mod transition;
pub mod world;

pub use aggregator::{PuzzleAggregator, PuzzleStatus, TreeHandle, TreeStatus};
pub use config::ConductionConfig;
pub use error::ConductionError;
pub use events::ConductionEvent;
pub use ids::{GroupId, SinkId, SourceId, TreeId};
pub use network::{HeatState, NodeId};
pub use scheduler::TaskOrder;
pub use source::{FailureHook, IgniteOutcome};
pub use stimulus::{Stimulus, StimulusResponse, StimulusTarget};
pub use tasks::TaskKind;
pub use transition::{GlowChannel, TransitionOutcome};
pub use world::ConductionWorld;

pub use conduit_simulation::{EnergyBudget, MaterialState};
