//! Generation - spawning of agents and resources onto the terrain.

mod agents;
mod resources;

pub use agents::*;
pub use resources::*;
