//! Systems - logic that operates on components
//!
//! Tick order (driven by `Simulation::tick`):
//! 1. `resource_upkeep_system` - regrow bushes, remove depleted nodes
//! 2. `citizen_system` - needs, decisions, behaviors, movement
//! 3. `organism_system` - grid foraging
//! 4. `replenish_system` - keep food/wood at their targets, sprout bushes

mod behaviors;
mod citizen;
mod decision;
mod forage;
mod lifecycle;
mod metabolism;
mod resources;

pub use citizen::*;
pub use decision::*;
pub use forage::*;
pub use lifecycle::*;
pub use metabolism::*;
pub use resources::*;

use hamlet_logic::steering::Bounds;
use hamlet_logic::terrain::TerrainGrid;

use crate::config::SimConfig;

/// Read-only world state shared by the systems for one tick.
#[derive(Debug, Clone, Copy)]
pub struct SimContext<'a> {
    pub terrain: &'a TerrainGrid,
    pub bounds: Bounds,
    pub config: &'a SimConfig,
    pub tick: u64,
}

impl<'a> SimContext<'a> {
    pub fn new(terrain: &'a TerrainGrid, config: &'a SimConfig, tick: u64) -> Self {
        Self {
            terrain,
            bounds: config.world,
            config,
            tick,
        }
    }

    /// Extent covered by the terrain grid, used for toroidal wrap.
    pub fn terrain_bounds(&self) -> Bounds {
        Bounds::new(self.terrain.width(), self.terrain.height())
    }
}
