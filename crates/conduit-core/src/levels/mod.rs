//! Level definitions and management

pub mod demo_levels;
mod layout;

pub use layout::{ConductionLevel, GroupSpec, LevelLayout, NodeSpec, TreeSpec};

use crate::config::ConductionConfig;
use crate::error::Result;

/// A level definition with metadata and generator function
pub struct LevelDef {
    pub id: usize,
    pub name: &'static str,
    pub description: &'static str,
    pub generator: fn() -> LevelLayout,
}

/// Catalogue of built-in levels
pub struct LevelManager {
    levels: Vec<LevelDef>,
}

impl LevelManager {
    /// Create a new level manager with all demo levels
    pub fn new() -> Self {
        use demo_levels::*;

        let levels = vec![
            LevelDef {
                id: 0,
                name: "hangar",
                description: "Two insulated conduits feeding the ship engines",
                generator: generate_hangar,
            },
            LevelDef {
                id: 1,
                name: "branching",
                description: "A splitter feeding two engines from one generator",
                generator: generate_branching,
            },
            LevelDef {
                id: 2,
                name: "absorber_bench",
                description: "Single absorbing segments for failure-path testing",
                generator: generate_absorber_bench,
            },
        ];

        Self { levels }
    }

    /// Get all level definitions
    pub fn levels(&self) -> &[LevelDef] {
        &self.levels
    }

    pub fn find(&self, name: &str) -> Option<&LevelDef> {
        self.levels.iter().find(|level| level.name == name)
    }

    /// Generate and build a level by name
    pub fn load(&self, name: &str, config: &ConductionConfig) -> Option<Result<ConductionLevel>> {
        let def = self.find(name)?;
        log::info!("Loading level {}: {}", def.id, def.name);
        Some((def.generator)().build(config))
    }
}

impl Default for LevelManager {
    fn default() -> Self {
        Self::new()
    }
}
