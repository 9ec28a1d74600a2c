//! Component definitions for the ECS simulation.
//!
//! Components are pure data structs attached to entities. Apart from the
//! small state-transition helpers on resources they carry no behavior;
//! that lives in systems.

mod common;
mod people;
mod resources;

pub use common::*;
pub use people::*;
pub use resources::*;
