//! Hamlet Core - Village Simulation Engine
//!
//! An ECS-based simulation of a small village on procedurally generated
//! terrain: citizens balancing energy, fullness and boredom while they eat,
//! gather wood and build houses, and grid-stepping organisms foraging for
//! berries.
//!
//! # Architecture
//!
//! The simulation uses an Entity Component System (ECS) architecture via `hecs`:
//! - **Entities**: Citizens, organisms, food, wood piles, berry bushes, houses
//! - **Components**: Pure data attached to entities (Position, Needs, Behavior, Wood, etc.)
//! - **Systems**: Logic that queries and updates components, one tick at a time
//!
//! Pure math (terrain, steering, scoring, foraging) lives in `hamlet-logic`.
//!
//! # Example
//!
//! ```rust,no_run
//! use hamlet_core::prelude::*;
//!
//! # fn main() -> Result<(), ConfigError> {
//! let mut sim = Simulation::new(SimConfig::default())?;
//! sim.generate();
//!
//! loop {
//!     sim.tick();
//!     for citizen in sim.citizens() {
//!         // draw citizen.position, citizen.behavior, citizen.trail ...
//!         let _ = citizen;
//!     }
//!     sim.reap_dead();
//! }
//! # }
//! ```

pub mod components;
pub mod config;
pub mod engine;
pub mod generation;
pub mod systems;

/// Commonly used types for convenient importing
pub mod prelude {
    pub use crate::components::*;
    pub use crate::config::{ConfigError, SimConfig};
    pub use crate::engine::{CitizenView, HouseView, OrganismView, Simulation, WorldCommand};
}
